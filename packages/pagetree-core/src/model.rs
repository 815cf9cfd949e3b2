use crate::answers::Answers;
use crate::ids::{BlockId, ElementId, PageId, SectionId, TenantId};

/// A routable page. Owns sections, partitioned by zone.
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    pub id: PageId,
    pub tenant: TenantId,
    pub url: String,
    pub title: String,
    pub layout: String,
}

/// A reusable container of sections or block-native element trees.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub id: BlockId,
    pub tenant: TenantId,
    pub block_type: String,
    pub name: String,
}

/// Exactly one of page or block owns a section; the flat schema's
/// `page_id` XOR `block_id` pair, expressed as a sum.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SectionOwner {
    Page(PageId),
    Block(BlockId),
}

/// A horizontal band of a page or block, ordered by `sort` within its zone.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    pub id: SectionId,
    pub tenant: TenantId,
    pub owner: SectionOwner,
    pub zone: String,
    pub sort: i32,
    pub background: Option<String>,
    pub styles: Option<String>,
    /// When set, this section renders a reusable block instead of owning
    /// elements. Resolved shallowly by tree loads.
    pub target_block_id: Option<BlockId>,
}

/// Element trees hang off a section, or directly off a block for
/// block-native rows.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ElementOwner {
    Section(SectionId),
    Block(BlockId),
}

/// Closed set of element kinds the engine branches on. Content kinds the
/// engine treats as opaque payload stay behind `Leaf`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum ElementKind {
    Row,
    Column,
    Carousel,
    Slide,
    Leaf(String),
}

impl ElementKind {
    /// Stored type tag.
    pub fn name(&self) -> &str {
        match self {
            ElementKind::Row => "row",
            ElementKind::Column => "column",
            ElementKind::Carousel => "carousel",
            ElementKind::Slide => "carousel-slide",
            ElementKind::Leaf(kind) => kind,
        }
    }

    /// Inverse of [`ElementKind::name`]; unknown tags become leaves.
    pub fn from_name(name: &str) -> Self {
        match name {
            "row" => ElementKind::Row,
            "column" => ElementKind::Column,
            "carousel" => ElementKind::Carousel,
            "carousel-slide" => ElementKind::Slide,
            other => ElementKind::Leaf(other.to_string()),
        }
    }

    /// Layout kinds derive their children from a declared specification.
    pub fn is_layout(&self) -> bool {
        matches!(self, ElementKind::Row | ElementKind::Carousel)
    }
}

/// A positioned, typed node of a content tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub id: ElementId,
    pub tenant: TenantId,
    pub owner: ElementOwner,
    /// `None` for roots of the owning section/block.
    pub parent_id: Option<ElementId>,
    pub kind: ElementKind,
    /// 1-based, dense within the sibling group.
    pub sort: i32,
    pub answers: Answers,
    pub styles: Option<String>,
    pub animations: Option<String>,
}

impl Element {
    /// The sibling group an element is ordered within.
    pub fn sibling_group(&self) -> (ElementOwner, Option<ElementId>) {
        (self.owner, self.parent_id)
    }
}

/// An author-facing save payload. `answers` arrives in its serialized text
/// form; the engine owns the parse.
#[derive(Clone, Debug)]
pub struct ElementInput {
    /// Absent for creates.
    pub id: Option<ElementId>,
    pub tenant: TenantId,
    pub owner: ElementOwner,
    pub parent_id: Option<ElementId>,
    pub kind: ElementKind,
    pub sort: i32,
    pub answers: Option<String>,
    pub styles: Option<String>,
    pub animations: Option<String>,
}
