//! Deep copies of element subtrees and sections under a new owner.
//!
//! Every cloned row gets a fresh id, and owner/parent references are
//! rewritten while the copy is built, so a clone never points outside
//! itself. Parents are persisted before their children.

use tracing::debug;

use crate::error::{Error, Result};
use crate::ids::{ElementId, SectionId};
use crate::model::{Element, ElementOwner, Section, SectionOwner};
use crate::store::ContentStore;
use crate::tree::ElementNode;

/// Clone `source` and everything beneath it under the given owner and
/// parent, returning the new subtree fully populated.
pub(crate) fn clone_subtree<S: ContentStore>(
    store: &mut S,
    source: &Element,
    owner: ElementOwner,
    parent_id: Option<ElementId>,
    sort: i32,
) -> Result<ElementNode> {
    let mut copy = source.clone();
    copy.id = ElementId::generate();
    copy.owner = owner;
    copy.parent_id = parent_id;
    copy.sort = sort;
    store.save_element(&copy)?;

    let mut children = Vec::new();
    for child in store.children_of(source.id)? {
        children.push(clone_subtree(store, &child, owner, Some(copy.id), child.sort)?);
    }

    Ok(ElementNode {
        element: copy,
        children,
    })
}

/// Clone an element subtree in place: the copy lands in the same sibling
/// group as the source, appended after the existing members.
pub(crate) fn duplicate_element<S: ContentStore>(
    store: &mut S,
    source_id: ElementId,
) -> Result<ElementNode> {
    let source = store
        .load_element(source_id)?
        .ok_or_else(|| Error::NotFound(format!("element {source_id}")))?;

    let siblings = match source.parent_id {
        Some(parent) => store.children_of(parent)?,
        None => store.roots_of(source.owner)?,
    };
    let appended_sort = siblings.len() as i32 + 1;

    let node = clone_subtree(store, &source, source.owner, source.parent_id, appended_sort)?;
    debug!(source = %source_id, clone = %node.element.id, nodes = node.node_count(), "duplicated element");
    Ok(node)
}

/// Clone a section row plus its whole element tree under the given owner
/// and sort. Shared by section duplication and page duplication.
pub(crate) fn clone_section<S: ContentStore>(
    store: &mut S,
    source: &Section,
    owner: SectionOwner,
    sort: i32,
) -> Result<Section> {
    let mut copy = source.clone();
    copy.id = SectionId::generate();
    copy.owner = owner;
    copy.sort = sort;
    store.save_section(&copy)?;

    for root in store.roots_of(ElementOwner::Section(source.id))? {
        clone_subtree(store, &root, ElementOwner::Section(copy.id), None, root.sort)?;
    }

    debug!(source = %source.id, clone = %copy.id, "duplicated section");
    Ok(copy)
}
