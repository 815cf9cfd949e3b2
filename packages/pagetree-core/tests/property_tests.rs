use pagetree_core::{
    build_tree, flatten, AllowAll, Answers, ContentEngine, ContentStore, Element, ElementId,
    ElementInput, ElementKind, ElementOwner, MemoryStore, Page, PageId, Section, SectionId,
    SectionOwner, TenantId,
};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum GroupOp {
    Insert { sort_hint: usize },
    Delete { index_hint: usize },
}

fn group_ops() -> impl Strategy<Value = Vec<GroupOp>> {
    prop::collection::vec(
        prop_oneof![
            (0usize..10).prop_map(|sort_hint| GroupOp::Insert { sort_hint }),
            (0usize..10).prop_map(|index_hint| GroupOp::Delete { index_hint }),
        ],
        1..20,
    )
}

fn engine_with_section() -> (ContentEngine<MemoryStore, AllowAll>, TenantId, SectionId) {
    let mut store = MemoryStore::default();
    let tenant = TenantId::generate();
    let page = Page {
        id: PageId::generate(),
        tenant,
        url: "/p".into(),
        title: "P".into(),
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
    (ContentEngine::new(store, AllowAll), tenant, section.id)
}

proptest! {
    /// After any insert/delete sequence with a sequencer pass per step, the
    /// group's sorts are exactly {1..n}.
    #[test]
    fn sibling_sorts_stay_dense(ops in group_ops()) {
        let (mut engine, tenant, section) = engine_with_section();
        let owner = ElementOwner::Section(section);

        for op in ops {
            match op {
                GroupOp::Insert { sort_hint } => {
                    let len = engine.store().roots_of(owner).unwrap().len();
                    engine
                        .save_elements(vec![ElementInput {
                            id: None,
                            tenant,
                            owner,
                            parent_id: None,
                            kind: ElementKind::Leaf("text".into()),
                            sort: (sort_hint % (len + 2)) as i32,
                            answers: None,
                            styles: None,
                            animations: None,
                        }])
                        .unwrap();
                }
                GroupOp::Delete { index_hint } => {
                    let roots = engine.store().roots_of(owner).unwrap();
                    if let Some(victim) = roots.get(index_hint % roots.len().max(1)) {
                        engine.delete_element(victim.id).unwrap();
                    }
                }
            }
            engine.resequence_siblings(owner, None).unwrap();
        }

        let sorts: Vec<i32> = engine
            .store()
            .roots_of(owner)
            .unwrap()
            .iter()
            .map(|e| e.sort)
            .collect();
        let expected: Vec<i32> = (1..=sorts.len() as i32).collect();
        prop_assert_eq!(sorts, expected);
    }

    /// `flatten(build_tree(roots, all))` reproduces the input multiset for
    /// arbitrary acyclic parent assignments.
    #[test]
    fn assemble_flatten_round_trips(parent_picks in prop::collection::vec(any::<prop::sample::Index>(), 0..30)) {
        let tenant = TenantId::generate();
        let owner = ElementOwner::Section(SectionId::generate());

        let mut elements: Vec<Element> = Vec::new();
        for (i, pick) in parent_picks.iter().enumerate() {
            // Each node either becomes a root or hangs off an earlier node,
            // so the flat shape is acyclic by construction.
            let choice = pick.index(i + 1);
            let parent_id = if choice == 0 {
                None
            } else {
                Some(elements[choice - 1].id)
            };
            let kind = ElementKind::Leaf("text".into());
            elements.push(Element {
                id: ElementId::generate(),
                tenant,
                owner,
                parent_id,
                answers: Answers::default_for(&kind),
                kind,
                sort: i as i32 + 1,
                styles: None,
                animations: None,
            });
        }

        let roots: Vec<Element> = elements.iter().filter(|e| e.parent_id.is_none()).cloned().collect();
        let descendants: Vec<Element> = elements.iter().filter(|e| e.parent_id.is_some()).cloned().collect();

        let tree = build_tree(roots, descendants).unwrap();
        let mut flat: Vec<ElementId> = flatten(&tree).iter().map(|e| e.id).collect();
        let mut expected: Vec<ElementId> = elements.iter().map(|e| e.id).collect();
        flat.sort();
        expected.sort();
        prop_assert_eq!(flat, expected);
    }
}
