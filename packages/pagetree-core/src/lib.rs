#![forbid(unsafe_code)]
//! Core engine for a page/section/element content structure tree: typed,
//! positioned nodes with declaratively-specified layout children, gap-free
//! sibling ordering, and deep-clone operations. The crate stays independent
//! of concrete storage engines so it can sit behind any host that can
//! satisfy the [`store::ContentStore`] trait.

pub mod answers;
mod clone;
pub mod engine;
pub mod error;
pub mod ids;
pub mod model;
pub mod reconcile;
pub mod sequence;
pub mod store;
pub mod tree;

pub use answers::{Answers, CarouselAnswers, ColumnAnswers, RowAnswers, SlideAnswers};
pub use engine::{ContentEngine, EngineConfig, LayoutPolicy, PageTree, SectionTree};
pub use error::{Error, Result};
pub use ids::{BlockId, ElementId, PageId, SectionId, TenantId};
pub use model::{
    Block, Element, ElementInput, ElementKind, ElementOwner, Page, Section, SectionOwner,
};
pub use reconcile::{reconcile_layout, ReconcileOutcome};
pub use sequence::{resequence, resequence_sections};
pub use store::{AllowAll, ContentStore, MemoryStore, PermissionGate};
pub use tree::{build_tree, flatten, ElementNode};
