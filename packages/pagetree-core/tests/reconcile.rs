use pagetree_core::{
    reconcile_layout, Answers, CarouselAnswers, ColumnAnswers, ContentEngine, ContentStore,
    Element, ElementId, ElementInput, ElementKind, ElementOwner, EngineConfig, Error,
    LayoutPolicy, MemoryStore, Page, PageId, RowAnswers, Section, SectionId, SectionOwner,
    SlideAnswers, AllowAll, TenantId,
};

fn seeded_section(store: &mut MemoryStore) -> (TenantId, SectionId) {
    let tenant = TenantId::generate();
    let page = Page {
        id: PageId::generate(),
        tenant,
        url: "/home".into(),
        title: "Home".into(),
        layout: "headerFooter".into(),
    };
    store.save_page(&page).unwrap();
    let section = Section {
        id: SectionId::generate(),
        tenant,
        owner: SectionOwner::Page(page.id),
        zone: "body".into(),
        sort: 1,
        background: None,
        styles: None,
        target_block_id: None,
    };
    store.save_section(&section).unwrap();
    (tenant, section.id)
}

fn saved_row(
    store: &mut MemoryStore,
    tenant: TenantId,
    section: SectionId,
    answers: RowAnswers,
) -> Element {
    let row = Element {
        id: ElementId::generate(),
        tenant,
        owner: ElementOwner::Section(section),
        parent_id: None,
        kind: ElementKind::Row,
        sort: 1,
        answers: Answers::Row(answers),
        styles: None,
        animations: None,
    };
    store.save_element(&row).unwrap();
    row
}

fn saved_carousel(
    store: &mut MemoryStore,
    tenant: TenantId,
    section: SectionId,
    slides: i32,
) -> Element {
    let carousel = Element {
        id: ElementId::generate(),
        tenant,
        owner: ElementOwner::Section(section),
        parent_id: None,
        kind: ElementKind::Carousel,
        sort: 1,
        answers: Answers::Carousel(CarouselAnswers { slides }),
        styles: None,
        animations: None,
    };
    store.save_element(&carousel).unwrap();
    carousel
}

fn column_sizes(store: &MemoryStore, row: ElementId) -> Vec<i32> {
    store
        .children_of(row)
        .unwrap()
        .iter()
        .map(|child| match &child.answers {
            Answers::Column(col) => col.size,
            other => panic!("expected column answers, got {other:?}"),
        })
        .collect()
}

#[test]
fn empty_row_gains_declared_columns() {
    let mut store = MemoryStore::default();
    let (tenant, section) = seeded_section(&mut store);
    let row = saved_row(
        &mut store,
        tenant,
        section,
        RowAnswers {
            columns: vec![4, 4, 4],
            ..Default::default()
        },
    );

    let outcome = reconcile_layout(&mut store, &row).unwrap();
    assert_eq!(outcome.created, 3);
    assert_eq!(outcome.write_count(), 3);

    let children = store.children_of(row.id).unwrap();
    assert_eq!(children.len(), 3);
    for (index, child) in children.iter().enumerate() {
        assert_eq!(child.kind, ElementKind::Column);
        assert_eq!(child.sort, index as i32 + 1);
        assert_eq!(child.parent_id, Some(row.id));
        assert_eq!(child.owner, ElementOwner::Section(section));
    }
    assert_eq!(column_sizes(&store, row.id), vec![4, 4, 4]);
}

#[test]
fn rerunning_an_unchanged_spec_writes_nothing() {
    let mut store = MemoryStore::default();
    let (tenant, section) = seeded_section(&mut store);
    let row = saved_row(
        &mut store,
        tenant,
        section,
        RowAnswers {
            columns: vec![4, 8],
            ..Default::default()
        },
    );

    reconcile_layout(&mut store, &row).unwrap();
    let second = reconcile_layout(&mut store, &row).unwrap();
    assert_eq!(second.write_count(), 0);
}

#[test]
fn shrinking_a_row_resizes_and_deletes() {
    let mut store = MemoryStore::default();
    let (tenant, section) = seeded_section(&mut store);
    let mut row = saved_row(
        &mut store,
        tenant,
        section,
        RowAnswers {
            columns: vec![4, 4, 4],
            ..Default::default()
        },
    );
    reconcile_layout(&mut store, &row).unwrap();

    row.answers = Answers::Row(RowAnswers {
        columns: vec![6, 6],
        ..Default::default()
    });
    store.save_element(&row).unwrap();
    let outcome = reconcile_layout(&mut store, &row).unwrap();

    assert_eq!(outcome.deleted, 1);
    assert_eq!(outcome.updated, 2);
    assert_eq!(column_sizes(&store, row.id), vec![6, 6]);
}

#[test]
fn surplus_columns_go_away_with_their_subtrees() {
    let mut store = MemoryStore::default();
    let (tenant, section) = seeded_section(&mut store);
    let mut row = saved_row(
        &mut store,
        tenant,
        section,
        RowAnswers {
            columns: vec![6, 6],
            ..Default::default()
        },
    );
    reconcile_layout(&mut store, &row).unwrap();

    // Author content inside the second column, then shrink it away.
    let second_column = store.children_of(row.id).unwrap()[1].clone();
    let kind = ElementKind::Leaf("text".into());
    let content = Element {
        id: ElementId::generate(),
        tenant,
        owner: ElementOwner::Section(section),
        parent_id: Some(second_column.id),
        answers: Answers::default_for(&kind),
        kind,
        sort: 1,
        styles: None,
        animations: None,
    };
    store.save_element(&content).unwrap();

    row.answers = Answers::Row(RowAnswers {
        columns: vec![12],
        ..Default::default()
    });
    store.save_element(&row).unwrap();
    let outcome = reconcile_layout(&mut store, &row).unwrap();

    assert_eq!(outcome.deleted, 2);
    assert_eq!(store.load_element(second_column.id).unwrap(), None);
    assert_eq!(store.load_element(content.id).unwrap(), None);
}

#[test]
fn mobile_overrides_set_and_clear() {
    let mut store = MemoryStore::default();
    let (tenant, section) = seeded_section(&mut store);
    let mut row = saved_row(
        &mut store,
        tenant,
        section,
        RowAnswers {
            columns: vec![6, 6],
            mobile_sizes: vec![12, 12],
            mobile_order: vec![2, 1],
        },
    );
    reconcile_layout(&mut store, &row).unwrap();

    let children = store.children_of(row.id).unwrap();
    assert_eq!(
        children[0].answers,
        Answers::Column(ColumnAnswers {
            size: 6,
            mobile_size: Some(12),
            mobile_order: Some(2),
        })
    );

    // Dropping the overrides clears them on the next pass.
    row.answers = Answers::Row(RowAnswers {
        columns: vec![6, 6],
        ..Default::default()
    });
    store.save_element(&row).unwrap();
    let outcome = reconcile_layout(&mut store, &row).unwrap();
    assert_eq!(outcome.updated, 2);

    let children = store.children_of(row.id).unwrap();
    assert_eq!(
        children[0].answers,
        Answers::Column(ColumnAnswers {
            size: 6,
            mobile_size: None,
            mobile_order: None,
        })
    );
}

#[test]
fn length_mismatched_mobile_lists_read_as_absent() {
    let mut store = MemoryStore::default();
    let (tenant, section) = seeded_section(&mut store);
    let row = saved_row(
        &mut store,
        tenant,
        section,
        RowAnswers {
            columns: vec![4, 4, 4],
            mobile_sizes: vec![12],
            mobile_order: vec![],
        },
    );
    reconcile_layout(&mut store, &row).unwrap();

    for child in store.children_of(row.id).unwrap() {
        match child.answers {
            Answers::Column(col) => assert_eq!(col.mobile_size, None),
            other => panic!("expected column answers, got {other:?}"),
        }
    }
}

#[test]
fn empty_carousel_gains_index_tagged_slides() {
    let mut store = MemoryStore::default();
    let (tenant, section) = seeded_section(&mut store);
    let carousel = saved_carousel(&mut store, tenant, section, 3);

    let outcome = reconcile_layout(&mut store, &carousel).unwrap();
    assert_eq!(outcome.created, 3);

    let children = store.children_of(carousel.id).unwrap();
    assert_eq!(children.len(), 3);
    for (index, child) in children.iter().enumerate() {
        assert_eq!(child.kind, ElementKind::Slide);
        assert_eq!(child.sort, index as i32 + 1);
        assert_eq!(
            child.answers,
            Answers::Slide(SlideAnswers {
                slide: index as i32
            })
        );
    }
}

#[test]
fn carousel_shrinks_to_declared_count() {
    let mut store = MemoryStore::default();
    let (tenant, section) = seeded_section(&mut store);
    let mut carousel = saved_carousel(&mut store, tenant, section, 3);
    reconcile_layout(&mut store, &carousel).unwrap();

    carousel.answers = Answers::Carousel(CarouselAnswers { slides: 1 });
    store.save_element(&carousel).unwrap();
    let outcome = reconcile_layout(&mut store, &carousel).unwrap();

    assert_eq!(outcome.deleted, 2);
    let children = store.children_of(carousel.id).unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].answers, Answers::Slide(SlideAnswers { slide: 0 }));
}

#[test]
fn negative_slide_count_reads_as_zero() {
    let mut store = MemoryStore::default();
    let (tenant, section) = seeded_section(&mut store);
    let mut carousel = saved_carousel(&mut store, tenant, section, 2);
    reconcile_layout(&mut store, &carousel).unwrap();

    carousel.answers = Answers::Carousel(CarouselAnswers { slides: -1 });
    store.save_element(&carousel).unwrap();
    reconcile_layout(&mut store, &carousel).unwrap();
    assert!(store.children_of(carousel.id).unwrap().is_empty());
}

#[test]
fn leaves_are_never_reconciled() {
    let mut store = MemoryStore::default();
    let (tenant, section) = seeded_section(&mut store);
    let kind = ElementKind::Leaf("text".into());
    let leaf = Element {
        id: ElementId::generate(),
        tenant,
        owner: ElementOwner::Section(section),
        parent_id: None,
        answers: Answers::default_for(&kind),
        kind,
        sort: 1,
        styles: None,
        animations: None,
    };
    store.save_element(&leaf).unwrap();

    let outcome = reconcile_layout(&mut store, &leaf).unwrap();
    assert_eq!(outcome.write_count(), 0);
    assert!(store.children_of(leaf.id).unwrap().is_empty());
}

#[test]
fn lenient_engine_degrades_malformed_spec_to_zero_children() {
    let mut store = MemoryStore::default();
    let (tenant, section) = seeded_section(&mut store);
    let mut engine = ContentEngine::new(store, AllowAll);

    let saved = engine
        .save_elements(vec![ElementInput {
            id: None,
            tenant,
            owner: ElementOwner::Section(section),
            parent_id: None,
            kind: ElementKind::Row,
            sort: 1,
            answers: Some(r#"{"columns":"4,8"}"#.into()),
            styles: None,
            animations: None,
        }])
        .unwrap();
    let row_id = saved[0].id;
    assert_eq!(engine.store().children_of(row_id).unwrap().len(), 2);

    // Re-saving with an unusable spec converges on zero children.
    engine
        .save_elements(vec![ElementInput {
            id: Some(row_id),
            tenant,
            owner: ElementOwner::Section(section),
            parent_id: None,
            kind: ElementKind::Row,
            sort: 1,
            answers: Some("{}".into()),
            styles: None,
            animations: None,
        }])
        .unwrap();
    assert!(engine.store().children_of(row_id).unwrap().is_empty());
}

#[test]
fn strict_engine_rejects_malformed_spec_before_writing() {
    let mut store = MemoryStore::default();
    let (tenant, section) = seeded_section(&mut store);
    let mut engine = ContentEngine::with_config(
        store,
        AllowAll,
        EngineConfig {
            layout_policy: LayoutPolicy::Strict,
        },
    );

    let saved = engine
        .save_elements(vec![ElementInput {
            id: None,
            tenant,
            owner: ElementOwner::Section(section),
            parent_id: None,
            kind: ElementKind::Row,
            sort: 1,
            answers: Some(r#"{"columns":"4,8"}"#.into()),
            styles: None,
            animations: None,
        }])
        .unwrap();
    let row_id = saved[0].id;

    let err = engine
        .save_elements(vec![ElementInput {
            id: Some(row_id),
            tenant,
            owner: ElementOwner::Section(section),
            parent_id: None,
            kind: ElementKind::Row,
            sort: 1,
            answers: Some(r#"{"columns":"a,b"}"#.into()),
            styles: None,
            animations: None,
        }])
        .unwrap_err();
    assert!(matches!(err, Error::MalformedAnswers(_)));

    // Nothing moved: the row still declares 4,8 and keeps both children.
    let row = engine.store().load_element(row_id).unwrap().unwrap();
    assert_eq!(
        row.answers,
        Answers::Row(RowAnswers {
            columns: vec![4, 8],
            ..Default::default()
        })
    );
    assert_eq!(engine.store().children_of(row_id).unwrap().len(), 2);
}
