use rusqlite::{params, Connection, Row};

use pagetree_core::{
    Answers, Block, BlockId, ContentStore, Element, ElementId, ElementKind, ElementOwner, Error,
    Page, PageId, Result, Section, SectionId, SectionOwner, TenantId,
};

/// SQLite-backed `ContentStore` keeping the four content tables plus the
/// list-by-parent indexes the engine leans on.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(storage_err)?;
        let store = Self { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path).map_err(storage_err)?;
        let store = Self { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    fn ensure_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS pages (
                    id TEXT PRIMARY KEY,
                    tenant TEXT NOT NULL,
                    url TEXT NOT NULL,
                    title TEXT NOT NULL,
                    layout TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS blocks (
                    id TEXT PRIMARY KEY,
                    tenant TEXT NOT NULL,
                    block_type TEXT NOT NULL,
                    name TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS sections (
                    id TEXT PRIMARY KEY,
                    tenant TEXT NOT NULL,
                    page_id TEXT,
                    block_id TEXT,
                    zone TEXT NOT NULL,
                    sort INTEGER NOT NULL,
                    background TEXT,
                    styles TEXT,
                    target_block_id TEXT
                );
                CREATE INDEX IF NOT EXISTS idx_sections_page ON sections(page_id, zone, sort);
                CREATE INDEX IF NOT EXISTS idx_sections_block ON sections(block_id, zone, sort);
                CREATE TABLE IF NOT EXISTS elements (
                    id TEXT PRIMARY KEY,
                    tenant TEXT NOT NULL,
                    section_id TEXT,
                    block_id TEXT,
                    parent_id TEXT,
                    kind TEXT NOT NULL,
                    sort INTEGER NOT NULL,
                    answers TEXT,
                    styles TEXT,
                    animations TEXT
                );
                CREATE INDEX IF NOT EXISTS idx_elements_parent ON elements(parent_id, sort);
                CREATE INDEX IF NOT EXISTS idx_elements_section ON elements(section_id, sort);
                CREATE INDEX IF NOT EXISTS idx_elements_block ON elements(block_id, sort);",
            )
            .map_err(storage_err)
    }

    fn query_elements(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Element>> {
        let mut stmt = self.conn.prepare(sql).map_err(storage_err)?;
        let rows = stmt.query_map(params, element_row).map_err(storage_err)?;
        let mut elements = Vec::new();
        for row in rows {
            elements.push(element_from_row(row.map_err(storage_err)?)?);
        }
        Ok(elements)
    }

    fn query_sections(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Section>> {
        let mut stmt = self.conn.prepare(sql).map_err(storage_err)?;
        let rows = stmt.query_map(params, section_row).map_err(storage_err)?;
        let mut sections = Vec::new();
        for row in rows {
            sections.push(section_from_row(row.map_err(storage_err)?)?);
        }
        Ok(sections)
    }
}

impl ContentStore for SqliteStore {
    fn load_page(&self, id: PageId) -> Result<Option<Page>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, tenant, url, title, layout FROM pages WHERE id = ?1")
            .map_err(storage_err)?;
        let mut rows = stmt
            .query_map([id.to_string()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .map_err(storage_err)?;
        match rows.next() {
            Some(row) => {
                let (id, tenant, url, title, layout) = row.map_err(storage_err)?;
                Ok(Some(Page {
                    id: PageId::parse(&id).map_err(storage_err)?,
                    tenant: TenantId::parse(&tenant).map_err(storage_err)?,
                    url,
                    title,
                    layout,
                }))
            }
            None => Ok(None),
        }
    }

    fn save_page(&mut self, page: &Page) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO pages (id, tenant, url, title, layout)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    page.id.to_string(),
                    page.tenant.to_string(),
                    page.url,
                    page.title,
                    page.layout,
                ],
            )
            .map_err(storage_err)?;
        Ok(())
    }

    fn load_block(&self, id: BlockId) -> Result<Option<Block>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, tenant, block_type, name FROM blocks WHERE id = ?1")
            .map_err(storage_err)?;
        let mut rows = stmt
            .query_map([id.to_string()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(storage_err)?;
        match rows.next() {
            Some(row) => {
                let (id, tenant, block_type, name) = row.map_err(storage_err)?;
                Ok(Some(Block {
                    id: BlockId::parse(&id).map_err(storage_err)?,
                    tenant: TenantId::parse(&tenant).map_err(storage_err)?,
                    block_type,
                    name,
                }))
            }
            None => Ok(None),
        }
    }

    fn save_block(&mut self, block: &Block) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO blocks (id, tenant, block_type, name)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    block.id.to_string(),
                    block.tenant.to_string(),
                    block.block_type,
                    block.name,
                ],
            )
            .map_err(storage_err)?;
        Ok(())
    }

    fn load_section(&self, id: SectionId) -> Result<Option<Section>> {
        let sections = self.query_sections(
            "SELECT id, tenant, page_id, block_id, zone, sort, background, styles, target_block_id
             FROM sections WHERE id = ?1",
            &[&id.to_string()],
        )?;
        Ok(sections.into_iter().next())
    }

    fn save_section(&mut self, section: &Section) -> Result<()> {
        let (page_id, block_id) = match section.owner {
            SectionOwner::Page(id) => (Some(id.to_string()), None),
            SectionOwner::Block(id) => (None, Some(id.to_string())),
        };
        self.conn
            .execute(
                "INSERT OR REPLACE INTO sections
                 (id, tenant, page_id, block_id, zone, sort, background, styles, target_block_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    section.id.to_string(),
                    section.tenant.to_string(),
                    page_id,
                    block_id,
                    section.zone,
                    section.sort,
                    section.background,
                    section.styles,
                    section.target_block_id.map(|id| id.to_string()),
                ],
            )
            .map_err(storage_err)?;
        Ok(())
    }

    fn delete_section(&mut self, id: SectionId) -> Result<()> {
        self.conn
            .execute("DELETE FROM sections WHERE id = ?1", [id.to_string()])
            .map_err(storage_err)?;
        Ok(())
    }

    fn sections_of(&self, owner: SectionOwner) -> Result<Vec<Section>> {
        match owner {
            SectionOwner::Page(id) => self.query_sections(
                "SELECT id, tenant, page_id, block_id, zone, sort, background, styles, target_block_id
                 FROM sections WHERE page_id = ?1 ORDER BY zone ASC, sort ASC, id ASC",
                &[&id.to_string()],
            ),
            SectionOwner::Block(id) => self.query_sections(
                "SELECT id, tenant, page_id, block_id, zone, sort, background, styles, target_block_id
                 FROM sections WHERE block_id = ?1 ORDER BY zone ASC, sort ASC, id ASC",
                &[&id.to_string()],
            ),
        }
    }

    fn load_element(&self, id: ElementId) -> Result<Option<Element>> {
        let elements = self.query_elements(
            "SELECT id, tenant, section_id, block_id, parent_id, kind, sort, answers, styles, animations
             FROM elements WHERE id = ?1",
            &[&id.to_string()],
        )?;
        Ok(elements.into_iter().next())
    }

    fn save_element(&mut self, element: &Element) -> Result<()> {
        let (section_id, block_id) = match element.owner {
            ElementOwner::Section(id) => (Some(id.to_string()), None),
            ElementOwner::Block(id) => (None, Some(id.to_string())),
        };
        let answers = element.answers.to_blob()?;
        self.conn
            .execute(
                "INSERT OR REPLACE INTO elements
                 (id, tenant, section_id, block_id, parent_id, kind, sort, answers, styles, animations)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    element.id.to_string(),
                    element.tenant.to_string(),
                    section_id,
                    block_id,
                    element.parent_id.map(|id| id.to_string()),
                    element.kind.name(),
                    element.sort,
                    answers,
                    element.styles,
                    element.animations,
                ],
            )
            .map_err(storage_err)?;
        Ok(())
    }

    fn delete_element(&mut self, id: ElementId) -> Result<()> {
        self.conn
            .execute("DELETE FROM elements WHERE id = ?1", [id.to_string()])
            .map_err(storage_err)?;
        Ok(())
    }

    fn children_of(&self, parent: ElementId) -> Result<Vec<Element>> {
        self.query_elements(
            "SELECT id, tenant, section_id, block_id, parent_id, kind, sort, answers, styles, animations
             FROM elements WHERE parent_id = ?1 ORDER BY sort ASC, id ASC",
            &[&parent.to_string()],
        )
    }

    fn roots_of(&self, owner: ElementOwner) -> Result<Vec<Element>> {
        match owner {
            ElementOwner::Section(id) => self.query_elements(
                "SELECT id, tenant, section_id, block_id, parent_id, kind, sort, answers, styles, animations
                 FROM elements WHERE section_id = ?1 AND parent_id IS NULL ORDER BY sort ASC, id ASC",
                &[&id.to_string()],
            ),
            ElementOwner::Block(id) => self.query_elements(
                "SELECT id, tenant, section_id, block_id, parent_id, kind, sort, answers, styles, animations
                 FROM elements WHERE block_id = ?1 AND parent_id IS NULL ORDER BY sort ASC, id ASC",
                &[&id.to_string()],
            ),
        }
    }

    fn elements_of(&self, owner: ElementOwner) -> Result<Vec<Element>> {
        match owner {
            ElementOwner::Section(id) => self.query_elements(
                "SELECT id, tenant, section_id, block_id, parent_id, kind, sort, answers, styles, animations
                 FROM elements WHERE section_id = ?1 ORDER BY sort ASC, id ASC",
                &[&id.to_string()],
            ),
            ElementOwner::Block(id) => self.query_elements(
                "SELECT id, tenant, section_id, block_id, parent_id, kind, sort, answers, styles, animations
                 FROM elements WHERE block_id = ?1 ORDER BY sort ASC, id ASC",
                &[&id.to_string()],
            ),
        }
    }
}

fn storage_err(e: impl std::fmt::Display) -> Error {
    Error::Storage(e.to_string())
}

type SectionRow = (
    String,
    String,
    Option<String>,
    Option<String>,
    String,
    i32,
    Option<String>,
    Option<String>,
    Option<String>,
);

fn section_row(row: &Row<'_>) -> rusqlite::Result<SectionRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

fn section_from_row(row: SectionRow) -> Result<Section> {
    let (id, tenant, page_id, block_id, zone, sort, background, styles, target_block_id) = row;
    let owner = match (page_id, block_id) {
        (Some(page), _) => SectionOwner::Page(PageId::parse(&page).map_err(storage_err)?),
        (None, Some(block)) => SectionOwner::Block(BlockId::parse(&block).map_err(storage_err)?),
        (None, None) => return Err(Error::Storage(format!("section {id} has no owner"))),
    };
    Ok(Section {
        id: SectionId::parse(&id).map_err(storage_err)?,
        tenant: TenantId::parse(&tenant).map_err(storage_err)?,
        owner,
        zone,
        sort,
        background,
        styles,
        target_block_id: target_block_id
            .as_deref()
            .map(BlockId::parse)
            .transpose()
            .map_err(storage_err)?,
    })
}

type ElementRow = (
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    String,
    i32,
    Option<String>,
    Option<String>,
    Option<String>,
);

fn element_row(row: &Row<'_>) -> rusqlite::Result<ElementRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
    ))
}

fn element_from_row(row: ElementRow) -> Result<Element> {
    let (id, tenant, section_id, block_id, parent_id, kind, sort, answers, styles, animations) =
        row;
    let owner = match (section_id, block_id) {
        (Some(section), _) => {
            ElementOwner::Section(SectionId::parse(&section).map_err(storage_err)?)
        }
        (None, Some(block)) => ElementOwner::Block(BlockId::parse(&block).map_err(storage_err)?),
        (None, None) => return Err(Error::Storage(format!("element {id} has no owner"))),
    };
    let kind = ElementKind::from_name(&kind);
    Ok(Element {
        id: ElementId::parse(&id).map_err(storage_err)?,
        tenant: TenantId::parse(&tenant).map_err(storage_err)?,
        owner,
        parent_id: parent_id
            .as_deref()
            .map(ElementId::parse)
            .transpose()
            .map_err(storage_err)?,
        answers: Answers::parse_lenient(&kind, answers.as_deref()),
        kind,
        sort,
        styles,
        animations,
    })
}
