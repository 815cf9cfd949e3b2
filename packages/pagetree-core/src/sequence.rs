//! Dense 1..n ordering for sibling groups.

use crate::ids::{ElementId, SectionId};
use crate::model::{Element, Section};

/// Compute the writes that make an element sibling group densely ordered.
///
/// The input is the full group in the order the caller intends; only members
/// whose stored `sort` differs from their 1-based position are returned, so
/// an already-dense group produces zero writes.
pub fn resequence(group: &[Element]) -> Vec<(ElementId, i32)> {
    group
        .iter()
        .enumerate()
        .filter_map(|(index, element)| {
            let position = (index + 1) as i32;
            (element.sort != position).then_some((element.id, position))
        })
        .collect()
}

/// Same contract as [`resequence`], for sections within one zone.
pub fn resequence_sections(group: &[Section]) -> Vec<(SectionId, i32)> {
    group
        .iter()
        .enumerate()
        .filter_map(|(index, section)| {
            let position = (index + 1) as i32;
            (section.sort != position).then_some((section.id, position))
        })
        .collect()
}
