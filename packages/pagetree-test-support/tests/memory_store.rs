use pagetree_core::MemoryStore;
use pagetree_test_support::run_store_conformance;

#[test]
fn memory_store_passes_the_conformance_suite() {
    run_store_conformance(MemoryStore::default);
}
