//! Engine facade that wires the store, permission gate, reconciler,
//! sequencer, and cloner together, one operation per inbound call.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::answers::Answers;
use crate::clone::{clone_section, clone_subtree, duplicate_element};
use crate::error::{Error, Result};
use crate::ids::{BlockId, ElementId, PageId, SectionId};
use crate::model::{
    Block, Element, ElementInput, ElementKind, ElementOwner, Page, Section, SectionOwner,
};
use crate::reconcile::reconcile_layout;
use crate::sequence;
use crate::store::{ContentStore, PermissionGate};
use crate::tree::{build_tree, delete_subtree, ElementNode};

/// What to do when a saved row/carousel carries an unusable child
/// specification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutPolicy {
    /// Treat the specification as declaring zero children. This matches the
    /// historical behavior, and it deletes every existing child of the
    /// layout node on the next reconciliation.
    #[default]
    Lenient,
    /// Reject the save before anything is written.
    Strict,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct EngineConfig {
    pub layout_policy: LayoutPolicy,
}

/// A section with its element trees materialized.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionTree {
    pub section: Section,
    pub elements: Vec<ElementNode>,
}

/// A page with every zone's sections and their element trees materialized.
#[derive(Clone, Debug, PartialEq)]
pub struct PageTree {
    pub page: Page,
    pub sections: Vec<SectionTree>,
}

/// Content structure engine over a store and a permission gate.
pub struct ContentEngine<S, G>
where
    S: ContentStore,
    G: PermissionGate,
{
    store: S,
    gate: G,
    config: EngineConfig,
}

impl<S, G> ContentEngine<S, G>
where
    S: ContentStore,
    G: PermissionGate,
{
    pub fn new(store: S, gate: G) -> Self {
        Self::with_config(store, gate, EngineConfig::default())
    }

    pub fn with_config(store: S, gate: G, config: EngineConfig) -> Self {
        Self {
            store,
            gate,
            config,
        }
    }

    /// Direct store access, primarily for tests and embedding hosts.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Persist each input (create on absent id, else update), then run
    /// layout reconciliation and a sequencer pass for the first row or
    /// carousel in the batch.
    ///
    /// Returns the persisted nodes in their pre-reconciliation shape;
    /// callers wanting the reconciled children re-fetch.
    pub fn save_elements(&mut self, inputs: Vec<ElementInput>) -> Result<Vec<Element>> {
        let mut saved = Vec::with_capacity(inputs.len());
        for input in inputs {
            saved.push(self.persist_input(input)?);
        }

        if let Some(layout) = saved.iter().find(|e| e.kind.is_layout()).cloned() {
            reconcile_layout(&mut self.store, &layout)?;
            self.resequence_siblings(layout.owner, layout.parent_id)?;
        }
        Ok(saved)
    }

    /// Delete an element and its subtree, leaf-first. The caller runs
    /// [`ContentEngine::resequence_siblings`] for the affected group
    /// afterward.
    pub fn delete_element(&mut self, id: ElementId) -> Result<()> {
        let element = self
            .store
            .load_element(id)?
            .ok_or_else(|| Error::NotFound(format!("element {id}")))?;
        self.gate.can_edit_content(element.tenant)?;

        let removed = delete_subtree(&mut self.store, id)?;
        debug!(%id, removed, "deleted element subtree");
        Ok(())
    }

    /// Renumber one sibling group to dense 1..n order, writing only rows
    /// whose position changed. Roots (`parent_id` null) and each non-null
    /// parent group are independent.
    pub fn resequence_siblings(
        &mut self,
        owner: ElementOwner,
        parent_id: Option<ElementId>,
    ) -> Result<usize> {
        let group = match parent_id {
            Some(parent) => self.store.children_of(parent)?,
            None => self.store.roots_of(owner)?,
        };
        let updates = sequence::resequence(&group);
        let mut by_id: HashMap<ElementId, Element> =
            group.into_iter().map(|e| (e.id, e)).collect();
        let count = updates.len();
        for (id, sort) in updates {
            if let Some(mut element) = by_id.remove(&id) {
                element.sort = sort;
                self.store.save_element(&element)?;
            }
        }
        Ok(count)
    }

    /// Deep-copy an element subtree into its own sibling group, appended at
    /// the end, and return the clone fully populated.
    pub fn duplicate_element(&mut self, id: ElementId) -> Result<ElementNode> {
        let source = self
            .store
            .load_element(id)?
            .ok_or_else(|| Error::NotFound(format!("element {id}")))?;
        self.gate.can_edit_content(source.tenant)?;

        let node = duplicate_element(&mut self.store, id)?;
        self.resequence_siblings(source.owner, source.parent_id)?;
        Ok(node)
    }

    /// Deep-copy a section (and its element trees) into the same zone,
    /// appended after the existing sections.
    pub fn duplicate_section(&mut self, id: SectionId) -> Result<Section> {
        let source = self
            .store
            .load_section(id)?
            .ok_or_else(|| Error::NotFound(format!("section {id}")))?;
        self.gate.can_edit_content(source.tenant)?;

        let zone_len = self.zone_sections(source.owner, &source.zone)?.len();
        let copy = clone_section(
            &mut self.store,
            &source,
            source.owner,
            zone_len as i32 + 1,
        )?;
        self.resequence_zone(source.owner, &source.zone)?;
        Ok(copy)
    }

    /// Copy a section's element trees directly under a block (no section
    /// layer), creating the block unless a target is given. The source
    /// section is left untouched.
    pub fn convert_section_to_block(
        &mut self,
        section_id: SectionId,
        target_block_id: Option<BlockId>,
        name: Option<String>,
    ) -> Result<Block> {
        let source = self
            .store
            .load_section(section_id)?
            .ok_or_else(|| Error::NotFound(format!("section {section_id}")))?;
        self.gate.can_edit_content(source.tenant)?;

        let block = match target_block_id {
            Some(id) => self
                .store
                .load_block(id)?
                .ok_or_else(|| Error::NotFound(format!("block {id}")))?,
            None => {
                let block = Block {
                    id: BlockId::generate(),
                    tenant: source.tenant,
                    block_type: "elementBlock".into(),
                    name: name.unwrap_or_else(|| "Converted section".into()),
                };
                self.store.save_block(&block)?;
                block
            }
        };

        let offset = self.store.roots_of(ElementOwner::Block(block.id))?.len() as i32;
        for (index, root) in self
            .store
            .roots_of(ElementOwner::Section(source.id))?
            .into_iter()
            .enumerate()
        {
            clone_subtree(
                &mut self.store,
                &root,
                ElementOwner::Block(block.id),
                None,
                offset + index as i32 + 1,
            )?;
        }

        debug!(section = %section_id, block = %block.id, "converted section to block");
        Ok(block)
    }

    /// Deep-copy a page: the page row plus every section in every zone.
    pub fn duplicate_page(&mut self, id: PageId) -> Result<Page> {
        let source = self
            .store
            .load_page(id)?
            .ok_or_else(|| Error::NotFound(format!("page {id}")))?;
        self.gate.can_edit_content(source.tenant)?;

        let mut copy = source.clone();
        copy.id = PageId::generate();
        copy.title = format!("{} (copy)", source.title);
        copy.url = format!("{}-copy", source.url);
        self.store.save_page(&copy)?;

        for section in self.store.sections_of(SectionOwner::Page(source.id))? {
            clone_section(
                &mut self.store,
                &section,
                SectionOwner::Page(copy.id),
                section.sort,
            )?;
        }
        Ok(copy)
    }

    /// Materialize a section with its nested elements.
    pub fn load_section_tree(&self, id: SectionId) -> Result<SectionTree> {
        let section = self
            .store
            .load_section(id)?
            .ok_or_else(|| Error::NotFound(format!("section {id}")))?;
        let owner = ElementOwner::Section(id);
        let roots = self.store.roots_of(owner)?;
        let descendants = self
            .store
            .elements_of(owner)?
            .into_iter()
            .filter(|e| e.parent_id.is_some())
            .collect();
        Ok(SectionTree {
            section,
            elements: build_tree(roots, descendants)?,
        })
    }

    /// Materialize a whole page: zones' sections with their element trees.
    pub fn load_page_tree(&self, id: PageId) -> Result<PageTree> {
        let page = self
            .store
            .load_page(id)?
            .ok_or_else(|| Error::NotFound(format!("page {id}")))?;
        let mut sections = Vec::new();
        for section in self.store.sections_of(SectionOwner::Page(id))? {
            sections.push(self.load_section_tree(section.id)?);
        }
        Ok(PageTree { page, sections })
    }

    /// Delete a section, its element trees (leaf-first), and renumber the
    /// zone it left.
    pub fn delete_section(&mut self, id: SectionId) -> Result<()> {
        let section = self
            .store
            .load_section(id)?
            .ok_or_else(|| Error::NotFound(format!("section {id}")))?;
        self.gate.can_edit_content(section.tenant)?;

        for root in self.store.roots_of(ElementOwner::Section(id))? {
            delete_subtree(&mut self.store, root.id)?;
        }
        self.store.delete_section(id)?;
        self.resequence_zone(section.owner, &section.zone)?;
        Ok(())
    }

    fn persist_input(&mut self, input: ElementInput) -> Result<Element> {
        self.gate.can_edit_content(input.tenant)?;
        self.ensure_owner_exists(input.owner)?;
        if let Some(parent) = input.parent_id {
            if self.store.load_element(parent)?.is_none() {
                return Err(Error::NotFound(format!("parent element {parent}")));
            }
        }

        let answers = self.parse_answers(&input.kind, input.answers.as_deref())?;
        let id = match input.id {
            Some(id) => {
                if self.store.load_element(id)?.is_none() {
                    return Err(Error::NotFound(format!("element {id}")));
                }
                id
            }
            None => ElementId::generate(),
        };

        let element = Element {
            id,
            tenant: input.tenant,
            owner: input.owner,
            parent_id: input.parent_id,
            kind: input.kind,
            sort: input.sort,
            answers,
            styles: input.styles,
            animations: input.animations,
        };
        self.store.save_element(&element)?;
        Ok(element)
    }

    fn parse_answers(&self, kind: &ElementKind, blob: Option<&str>) -> Result<Answers> {
        match Answers::parse(kind, blob) {
            Ok(answers) => Ok(answers),
            Err(message) => {
                if kind.is_layout() && self.config.layout_policy == LayoutPolicy::Strict {
                    return Err(Error::MalformedAnswers(message));
                }
                if kind.is_layout() {
                    warn!(
                        kind = kind.name(),
                        %message,
                        "degrading malformed layout answers to an empty child specification"
                    );
                }
                Ok(Answers::default_for(kind))
            }
        }
    }

    fn ensure_owner_exists(&self, owner: ElementOwner) -> Result<()> {
        match owner {
            ElementOwner::Section(id) => {
                if self.store.load_section(id)?.is_none() {
                    return Err(Error::NotFound(format!("section {id}")));
                }
            }
            ElementOwner::Block(id) => {
                if self.store.load_block(id)?.is_none() {
                    return Err(Error::NotFound(format!("block {id}")));
                }
            }
        }
        Ok(())
    }

    fn zone_sections(&self, owner: SectionOwner, zone: &str) -> Result<Vec<Section>> {
        Ok(self
            .store
            .sections_of(owner)?
            .into_iter()
            .filter(|s| s.zone == zone)
            .collect())
    }

    fn resequence_zone(&mut self, owner: SectionOwner, zone: &str) -> Result<usize> {
        let group = self.zone_sections(owner, zone)?;
        let updates = sequence::resequence_sections(&group);
        let mut by_id: HashMap<SectionId, Section> =
            group.into_iter().map(|s| (s.id, s)).collect();
        let count = updates.len();
        for (id, sort) in updates {
            if let Some(mut section) = by_id.remove(&id) {
                section.sort = sort;
                self.store.save_section(&section)?;
            }
        }
        Ok(count)
    }
}
