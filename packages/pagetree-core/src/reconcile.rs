//! Layout reconciliation: converge a row's or carousel's persisted children
//! to its declared child specification.

use tracing::debug;

use crate::answers::{Answers, CarouselAnswers, ColumnAnswers, RowAnswers, SlideAnswers};
use crate::error::Result;
use crate::ids::ElementId;
use crate::model::{Element, ElementKind};
use crate::store::ContentStore;
use crate::tree::delete_subtree;

/// Write counts of one reconciliation pass. All zero means the children
/// already matched the specification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl ReconcileOutcome {
    pub fn write_count(&self) -> usize {
        self.created + self.updated + self.deleted
    }
}

/// Reconcile a just-saved layout element against its persisted children.
///
/// Non-layout kinds are left untouched. Children are matched to target slots
/// strictly by current sort order; existing children are resized and
/// renumbered in place, surplus children are deleted subtree-and-all, and
/// missing slots are filled with freshly created children. The layout element
/// itself must already be persisted, so created children never reference a
/// dangling parent.
pub fn reconcile_layout<S: ContentStore>(store: &mut S, layout: &Element) -> Result<ReconcileOutcome> {
    match (&layout.kind, &layout.answers) {
        (ElementKind::Row, Answers::Row(spec)) => reconcile_row(store, layout, spec),
        (ElementKind::Carousel, Answers::Carousel(spec)) => reconcile_carousel(store, layout, spec),
        _ => Ok(ReconcileOutcome::default()),
    }
}

fn reconcile_row<S: ContentStore>(
    store: &mut S,
    row: &Element,
    spec: &RowAnswers,
) -> Result<ReconcileOutcome> {
    let targets: Vec<ColumnAnswers> = column_targets(spec);
    let existing: Vec<Element> = store
        .children_of(row.id)?
        .into_iter()
        .filter(|child| child.kind == ElementKind::Column)
        .collect();

    let outcome = converge(store, row, &ElementKind::Column, existing, |index| {
        Answers::Column(targets[index].clone())
    }, targets.len())?;

    debug!(
        row = %row.id,
        columns = targets.len(),
        created = outcome.created,
        updated = outcome.updated,
        deleted = outcome.deleted,
        "reconciled row"
    );
    Ok(outcome)
}

fn reconcile_carousel<S: ContentStore>(
    store: &mut S,
    carousel: &Element,
    spec: &CarouselAnswers,
) -> Result<ReconcileOutcome> {
    let count = spec.slides.max(0) as usize;
    let existing: Vec<Element> = store
        .children_of(carousel.id)?
        .into_iter()
        .filter(|child| child.kind == ElementKind::Slide)
        .collect();

    let outcome = converge(store, carousel, &ElementKind::Slide, existing, |index| {
        Answers::Slide(SlideAnswers {
            slide: index as i32,
        })
    }, count)?;

    debug!(
        carousel = %carousel.id,
        slides = count,
        created = outcome.created,
        updated = outcome.updated,
        deleted = outcome.deleted,
        "reconciled carousel"
    );
    Ok(outcome)
}

/// Per-index column payloads; mobile override lists only apply when their
/// length matches the column list, otherwise they read as absent.
fn column_targets(spec: &RowAnswers) -> Vec<ColumnAnswers> {
    let n = spec.columns.len();
    let mobile_sizes: &[i32] = if spec.mobile_sizes.len() == n {
        &spec.mobile_sizes
    } else {
        &[]
    };
    let mobile_order: &[i32] = if spec.mobile_order.len() == n {
        &spec.mobile_order
    } else {
        &[]
    };

    spec.columns
        .iter()
        .enumerate()
        .map(|(i, &size)| ColumnAnswers {
            size,
            mobile_size: mobile_sizes.get(i).copied(),
            mobile_order: mobile_order.get(i).copied(),
        })
        .collect()
}

/// Shared shrink/update/extend pass. Slots are keyed purely by position:
/// `existing` arrives in sort order and `target_answers(i)` describes slot
/// `i`. Only rows whose payload or sort actually changed are written.
fn converge<S: ContentStore>(
    store: &mut S,
    layout: &Element,
    child_kind: &ElementKind,
    existing: Vec<Element>,
    target_answers: impl Fn(usize) -> Answers,
    target_count: usize,
) -> Result<ReconcileOutcome> {
    let mut outcome = ReconcileOutcome::default();
    let existing_count = existing.len();

    // Shrink: children past the declared range go away, subtree and all.
    for surplus in existing.iter().skip(target_count) {
        outcome.deleted += delete_subtree(store, surplus.id)?;
    }

    // Update in place: a child already carrying its slot's payload and
    // position costs nothing.
    for (index, child) in existing.into_iter().take(target_count).enumerate() {
        let desired_answers = target_answers(index);
        let desired_sort = (index + 1) as i32;
        if child.answers != desired_answers || child.sort != desired_sort {
            let mut updated = child;
            updated.answers = desired_answers;
            updated.sort = desired_sort;
            store.save_element(&updated)?;
            outcome.updated += 1;
        }
    }

    // Extend: fill the remaining slots with fresh children of the layout.
    for index in existing_count..target_count {
        let child = Element {
            id: ElementId::generate(),
            tenant: layout.tenant,
            owner: layout.owner,
            parent_id: Some(layout.id),
            kind: child_kind.clone(),
            sort: (index + 1) as i32,
            answers: target_answers(index),
            styles: None,
            animations: None,
        };
        store.save_element(&child)?;
        outcome.created += 1;
    }

    Ok(outcome)
}
