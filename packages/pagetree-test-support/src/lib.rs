#![forbid(unsafe_code)]
//! Shared fixtures and a [`ContentStore`] conformance suite, so every
//! backend adapter is exercised against the same expectations.

use pagetree_core::{
    Answers, Block, BlockId, ContentStore, Element, ElementId, ElementKind, ElementOwner, Page,
    PageId, RowAnswers, Section, SectionId, SectionOwner, TenantId,
};

pub fn page(tenant: TenantId) -> Page {
    Page {
        id: PageId::generate(),
        tenant,
        url: "/home".into(),
        title: "Home".into(),
        layout: "headerFooter".into(),
    }
}

pub fn block(tenant: TenantId) -> Block {
    Block {
        id: BlockId::generate(),
        tenant,
        block_type: "elementBlock".into(),
        name: "Shared footer".into(),
    }
}

pub fn section(tenant: TenantId, owner: SectionOwner, zone: &str, sort: i32) -> Section {
    Section {
        id: SectionId::generate(),
        tenant,
        owner,
        zone: zone.into(),
        sort,
        background: None,
        styles: None,
        target_block_id: None,
    }
}

pub fn element(
    tenant: TenantId,
    owner: ElementOwner,
    parent_id: Option<ElementId>,
    kind: ElementKind,
    sort: i32,
) -> Element {
    Element {
        id: ElementId::generate(),
        tenant,
        owner,
        parent_id,
        answers: Answers::default_for(&kind),
        kind,
        sort,
        styles: None,
        animations: None,
    }
}

pub fn row_element(
    tenant: TenantId,
    owner: ElementOwner,
    parent_id: Option<ElementId>,
    sort: i32,
    columns: &[i32],
) -> Element {
    let mut row = element(tenant, owner, parent_id, ElementKind::Row, sort);
    row.answers = Answers::Row(RowAnswers {
        columns: columns.to_vec(),
        ..Default::default()
    });
    row
}

pub fn text_element(
    tenant: TenantId,
    owner: ElementOwner,
    parent_id: Option<ElementId>,
    sort: i32,
) -> Element {
    element(tenant, owner, parent_id, ElementKind::Leaf("text".into()), sort)
}

/// Run the shared expectations against a fresh store per scenario.
pub fn run_store_conformance<S: ContentStore>(mut make_store: impl FnMut() -> S) {
    page_round_trip(&mut make_store());
    block_round_trip(&mut make_store());
    section_listing_orders_by_zone_then_sort(&mut make_store());
    element_listing_partitions_sibling_groups(&mut make_store());
    element_update_overwrites(&mut make_store());
    deletes_are_idempotent(&mut make_store());
}

fn page_round_trip<S: ContentStore>(store: &mut S) {
    let tenant = TenantId::generate();
    let page = page(tenant);
    store.save_page(&page).unwrap();
    assert_eq!(store.load_page(page.id).unwrap(), Some(page));
    assert_eq!(store.load_page(PageId::generate()).unwrap(), None);
}

fn block_round_trip<S: ContentStore>(store: &mut S) {
    let tenant = TenantId::generate();
    let block = block(tenant);
    store.save_block(&block).unwrap();
    assert_eq!(store.load_block(block.id).unwrap(), Some(block));
    assert_eq!(store.load_block(BlockId::generate()).unwrap(), None);
}

fn section_listing_orders_by_zone_then_sort<S: ContentStore>(store: &mut S) {
    let tenant = TenantId::generate();
    let page = page(tenant);
    store.save_page(&page).unwrap();
    let owner = SectionOwner::Page(page.id);

    let body_second = section(tenant, owner, "body", 2);
    let body_first = section(tenant, owner, "body", 1);
    let footer = section(tenant, owner, "footer", 1);
    for s in [&body_second, &body_first, &footer] {
        store.save_section(s).unwrap();
    }

    let listed = store.sections_of(owner).unwrap();
    let ids: Vec<_> = listed.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![body_first.id, body_second.id, footer.id]);

    store.delete_section(body_first.id).unwrap();
    assert_eq!(store.load_section(body_first.id).unwrap(), None);
    assert_eq!(store.sections_of(owner).unwrap().len(), 2);
}

fn element_listing_partitions_sibling_groups<S: ContentStore>(store: &mut S) {
    let tenant = TenantId::generate();
    let page = page(tenant);
    store.save_page(&page).unwrap();
    let section = section(tenant, SectionOwner::Page(page.id), "body", 1);
    store.save_section(&section).unwrap();
    let owner = ElementOwner::Section(section.id);

    let root_b = text_element(tenant, owner, None, 2);
    let root_a = text_element(tenant, owner, None, 1);
    let child_second = text_element(tenant, owner, Some(root_a.id), 2);
    let child_first = text_element(tenant, owner, Some(root_a.id), 1);
    for e in [&root_b, &root_a, &child_second, &child_first] {
        store.save_element(e).unwrap();
    }

    let roots: Vec<_> = store.roots_of(owner).unwrap().iter().map(|e| e.id).collect();
    assert_eq!(roots, vec![root_a.id, root_b.id]);

    let children: Vec<_> = store
        .children_of(root_a.id)
        .unwrap()
        .iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(children, vec![child_first.id, child_second.id]);
    assert!(store.children_of(root_b.id).unwrap().is_empty());

    assert_eq!(store.elements_of(owner).unwrap().len(), 4);
}

fn element_update_overwrites<S: ContentStore>(store: &mut S) {
    let tenant = TenantId::generate();
    let page = page(tenant);
    store.save_page(&page).unwrap();
    let section = section(tenant, SectionOwner::Page(page.id), "body", 1);
    store.save_section(&section).unwrap();

    let mut row = row_element(tenant, ElementOwner::Section(section.id), None, 1, &[4, 8]);
    store.save_element(&row).unwrap();

    row.answers = Answers::Row(RowAnswers {
        columns: vec![6, 6],
        ..Default::default()
    });
    row.sort = 3;
    store.save_element(&row).unwrap();

    assert_eq!(store.load_element(row.id).unwrap(), Some(row));
}

fn deletes_are_idempotent<S: ContentStore>(store: &mut S) {
    let tenant = TenantId::generate();
    let page = page(tenant);
    store.save_page(&page).unwrap();
    let section = section(tenant, SectionOwner::Page(page.id), "body", 1);
    store.save_section(&section).unwrap();
    let leaf = text_element(tenant, ElementOwner::Section(section.id), None, 1);
    store.save_element(&leaf).unwrap();

    store.delete_element(leaf.id).unwrap();
    store.delete_element(leaf.id).unwrap();
    assert_eq!(store.load_element(leaf.id).unwrap(), None);

    store.delete_section(section.id).unwrap();
    store.delete_section(section.id).unwrap();
}
