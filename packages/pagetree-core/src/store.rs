use std::collections::HashMap;

use crate::error::Result;
use crate::ids::{BlockId, ElementId, PageId, SectionId, TenantId};
use crate::model::{Block, Element, ElementOwner, Page, Section, SectionOwner};

/// Persistence boundary of the engine: typed load/save/delete plus the
/// list-by-parent lookups tree assembly and reconciliation are built on.
///
/// All list operations return rows in `sort` order. Adapters own their I/O;
/// the engine issues calls sequentially, parent before child, so a failed
/// write never leaves a dangling reference.
pub trait ContentStore {
    fn load_page(&self, id: PageId) -> Result<Option<Page>>;
    fn save_page(&mut self, page: &Page) -> Result<()>;

    fn load_block(&self, id: BlockId) -> Result<Option<Block>>;
    fn save_block(&mut self, block: &Block) -> Result<()>;

    fn load_section(&self, id: SectionId) -> Result<Option<Section>>;
    fn save_section(&mut self, section: &Section) -> Result<()>;
    fn delete_section(&mut self, id: SectionId) -> Result<()>;
    /// All sections of a page or block, ordered by zone then sort.
    fn sections_of(&self, owner: SectionOwner) -> Result<Vec<Section>>;

    fn load_element(&self, id: ElementId) -> Result<Option<Element>>;
    fn save_element(&mut self, element: &Element) -> Result<()>;
    fn delete_element(&mut self, id: ElementId) -> Result<()>;
    /// Direct children of an element, in sort order.
    fn children_of(&self, parent: ElementId) -> Result<Vec<Element>>;
    /// Root elements (`parent_id` null) of a section or block, in sort order.
    fn roots_of(&self, owner: ElementOwner) -> Result<Vec<Element>>;
    /// Every element of a section or block, for tree assembly.
    fn elements_of(&self, owner: ElementOwner) -> Result<Vec<Element>>;
}

/// Authorization hook supplied by the surrounding service.
pub trait PermissionGate {
    fn can_edit_content(&self, tenant: TenantId) -> Result<()>;
}

/// Grants everything; for tests and embedding without a permission layer.
pub struct AllowAll;

impl PermissionGate for AllowAll {
    fn can_edit_content(&self, _tenant: TenantId) -> Result<()> {
        Ok(())
    }
}

/// In-memory map-backed store for tests and prototyping.
#[derive(Default)]
pub struct MemoryStore {
    pages: HashMap<PageId, Page>,
    blocks: HashMap<BlockId, Block>,
    sections: HashMap<SectionId, Section>,
    elements: HashMap<ElementId, Element>,
}

impl MemoryStore {
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    fn sorted_elements(&self, mut keep: impl FnMut(&Element) -> bool) -> Vec<Element> {
        let mut rows: Vec<Element> = self.elements.values().filter(|e| keep(e)).cloned().collect();
        rows.sort_by_key(|e| (e.sort, e.id));
        rows
    }
}

impl ContentStore for MemoryStore {
    fn load_page(&self, id: PageId) -> Result<Option<Page>> {
        Ok(self.pages.get(&id).cloned())
    }

    fn save_page(&mut self, page: &Page) -> Result<()> {
        self.pages.insert(page.id, page.clone());
        Ok(())
    }

    fn load_block(&self, id: BlockId) -> Result<Option<Block>> {
        Ok(self.blocks.get(&id).cloned())
    }

    fn save_block(&mut self, block: &Block) -> Result<()> {
        self.blocks.insert(block.id, block.clone());
        Ok(())
    }

    fn load_section(&self, id: SectionId) -> Result<Option<Section>> {
        Ok(self.sections.get(&id).cloned())
    }

    fn save_section(&mut self, section: &Section) -> Result<()> {
        self.sections.insert(section.id, section.clone());
        Ok(())
    }

    fn delete_section(&mut self, id: SectionId) -> Result<()> {
        self.sections.remove(&id);
        Ok(())
    }

    fn sections_of(&self, owner: SectionOwner) -> Result<Vec<Section>> {
        let mut rows: Vec<Section> = self
            .sections
            .values()
            .filter(|s| s.owner == owner)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (&a.zone, a.sort, a.id).cmp(&(&b.zone, b.sort, b.id)));
        Ok(rows)
    }

    fn load_element(&self, id: ElementId) -> Result<Option<Element>> {
        Ok(self.elements.get(&id).cloned())
    }

    fn save_element(&mut self, element: &Element) -> Result<()> {
        self.elements.insert(element.id, element.clone());
        Ok(())
    }

    fn delete_element(&mut self, id: ElementId) -> Result<()> {
        self.elements.remove(&id);
        Ok(())
    }

    fn children_of(&self, parent: ElementId) -> Result<Vec<Element>> {
        Ok(self.sorted_elements(|e| e.parent_id == Some(parent)))
    }

    fn roots_of(&self, owner: ElementOwner) -> Result<Vec<Element>> {
        Ok(self.sorted_elements(|e| e.owner == owner && e.parent_id.is_none()))
    }

    fn elements_of(&self, owner: ElementOwner) -> Result<Vec<Element>> {
        Ok(self.sorted_elements(|e| e.owner == owner))
    }
}
