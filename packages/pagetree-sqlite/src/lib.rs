#![forbid(unsafe_code)]
//! SQLite-backed [`pagetree_core::ContentStore`] adapter. Rows mirror the
//! engine's flat shape: pages, blocks, sections, and elements keyed by text
//! ids, with `answers`/`styles` payloads stored as text blobs the core
//! serializes.

mod store;

pub use store::SqliteStore;
