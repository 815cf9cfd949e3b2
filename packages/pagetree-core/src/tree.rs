//! Tree assembly: flat, `parent_id`-linked rows to nested trees and back.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::ids::ElementId;
use crate::model::Element;
use crate::store::ContentStore;

/// An element with its children materialized.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementNode {
    pub element: Element,
    pub children: Vec<ElementNode>,
}

impl ElementNode {
    pub fn leaf(element: Element) -> Self {
        Self {
            element,
            children: Vec::new(),
        }
    }

    /// Total node count of this subtree, root included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ElementNode::node_count).sum::<usize>()
    }
}

/// Nest `descendants` under `roots` by matching `parent_id`, preserving the
/// given order at every level.
///
/// The flat shape could in principle encode a parent loop, so ancestor
/// chains are validated first and a revisit fails with
/// [`Error::CycleDetected`] instead of being assumed away.
pub fn build_tree(roots: Vec<Element>, descendants: Vec<Element>) -> Result<Vec<ElementNode>> {
    validate_acyclic(roots.iter().chain(descendants.iter()))?;

    let mut by_parent: HashMap<ElementId, Vec<Element>> = HashMap::new();
    for element in descendants {
        if let Some(parent) = element.parent_id {
            by_parent.entry(parent).or_default().push(element);
        }
    }

    Ok(roots
        .into_iter()
        .map(|root| attach_children(root, &mut by_parent))
        .collect())
}

fn attach_children(element: Element, by_parent: &mut HashMap<ElementId, Vec<Element>>) -> ElementNode {
    let children = by_parent
        .remove(&element.id)
        .unwrap_or_default()
        .into_iter()
        .map(|child| attach_children(child, by_parent))
        .collect();
    ElementNode { element, children }
}

/// Exact inverse of [`build_tree`]: preorder flatten back to rows.
pub fn flatten(nodes: &[ElementNode]) -> Vec<Element> {
    let mut out = Vec::new();
    collect(nodes, &mut out);
    out
}

fn collect(nodes: &[ElementNode], out: &mut Vec<Element>) {
    for node in nodes {
        out.push(node.element.clone());
        collect(&node.children, out);
    }
}

fn validate_acyclic<'a>(elements: impl Iterator<Item = &'a Element>) -> Result<()> {
    let rows: Vec<&Element> = elements.collect();
    let parents: HashMap<ElementId, Option<ElementId>> =
        rows.iter().map(|e| (e.id, e.parent_id)).collect();

    for element in rows {
        let mut visited = HashSet::new();
        let mut current = Some(element.id);
        while let Some(id) = current {
            if !visited.insert(id) {
                return Err(Error::CycleDetected(id));
            }
            current = parents.get(&id).copied().flatten();
        }
    }
    Ok(())
}

/// Delete an element and everything beneath it, leaf-first, so a failure
/// part-way never leaves orphaned rows. Returns the number of rows deleted.
pub(crate) fn delete_subtree<S: ContentStore>(store: &mut S, id: ElementId) -> Result<usize> {
    let mut deleted = 0;
    for child in store.children_of(id)? {
        deleted += delete_subtree(store, child.id)?;
    }
    store.delete_element(id)?;
    Ok(deleted + 1)
}
