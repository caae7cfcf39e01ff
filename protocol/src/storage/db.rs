//! # SolarDb — Persistent Record Store
//!
//! The sled-backed [`Repository`] used by the operator node. All platform
//! records the engine touches flow through here.
//!
//! ## Tree Layout
//!
//! | Tree             | Key                          | Value                      |
//! |------------------|------------------------------|----------------------------|
//! | `entities`       | `index` (4B BE)              | `json(Entity)`             |
//! | `investors`      | `index` (4B BE)              | `json(Investor)`           |
//! | `projects`       | `index` (4B BE)              | `json(Project)`            |
//! | `replenishments` | `entity` (4B BE) + seq (8B)  | `json(ReplenishmentRecord)`|
//!
//! Indices are stored big-endian so sled's lexicographic ordering matches
//! numeric ordering, and so all replenishments of one entity sit in one
//! contiguous prefix range.
//!
//! Records are JSON rather than bincode: amounts are decimals, and their
//! serde representation is a string that needs a self-describing format.

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::{Db, Tree};
use std::path::Path;

use super::audit::ReplenishmentRecord;
use super::{DbError, DbResult, Repository};
use crate::model::{Entity, Investor, Project};

/// Persistent store for entities, investors, projects and audit records.
///
/// sled handles its own concurrency: `SolarDb` can be shared across threads
/// behind an `Arc` without extra locking. Writes to a single record are
/// last-writer-wins.
#[derive(Debug, Clone)]
pub struct SolarDb {
    db: Db,
    entities: Tree,
    investors: Tree,
    projects: Tree,
    replenishments: Tree,
}

impl SolarDb {
    /// Open or create a database at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// A database that lives in memory and disappears on drop. For tests.
    pub fn open_temporary() -> DbResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    /// Open the record trees inside an existing sled database.
    ///
    /// The operator node shares one sled instance between the repository
    /// and the sandbox ledger.
    pub fn from_db(db: Db) -> DbResult<Self> {
        let entities = db.open_tree("entities")?;
        let investors = db.open_tree("investors")?;
        let projects = db.open_tree("projects")?;
        let replenishments = db.open_tree("replenishments")?;
        Ok(Self {
            db,
            entities,
            investors,
            projects,
            replenishments,
        })
    }

    /// The underlying sled handle.
    pub fn handle(&self) -> &Db {
        &self.db
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn investor_count(&self) -> usize {
        self.investors.len()
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    /// Force pending writes to disk.
    pub fn flush(&self) -> DbResult<()> {
        self.db.flush()?;
        Ok(())
    }

    fn get<T: DeserializeOwned>(tree: &Tree, index: u32) -> DbResult<Option<T>> {
        match tree.get(index.to_be_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put<T: Serialize>(tree: &Tree, index: u32, value: &T) -> DbResult<()> {
        let bytes = serde_json::to_vec(value).map_err(|e| DbError::Serialization(e.to_string()))?;
        tree.insert(index.to_be_bytes(), bytes)?;
        Ok(())
    }
}

impl Repository for SolarDb {
    fn retrieve_project(&self, index: u32) -> DbResult<Option<Project>> {
        Self::get(&self.projects, index)
    }

    fn retrieve_entity(&self, index: u32) -> DbResult<Option<Entity>> {
        Self::get(&self.entities, index)
    }

    fn retrieve_investor(&self, index: u32) -> DbResult<Option<Investor>> {
        Self::get(&self.investors, index)
    }

    fn retrieve_all_investors(&self) -> DbResult<Vec<Investor>> {
        self.investors
            .iter()
            .map(|item| {
                let (_, bytes) = item?;
                decode(&bytes)
            })
            .collect()
    }

    fn save_entity(&self, entity: &Entity) -> DbResult<()> {
        Self::put(&self.entities, entity.index(), entity)
    }

    fn save_investor(&self, investor: &Investor) -> DbResult<()> {
        Self::put(&self.investors, investor.index(), investor)
    }

    fn save_project(&self, project: &Project) -> DbResult<()> {
        Self::put(&self.projects, project.index, project)
    }

    fn record_replenishment(&self, record: &ReplenishmentRecord) -> DbResult<()> {
        let seq = self.db.generate_id()?;
        let mut key = Vec::with_capacity(12);
        key.extend_from_slice(&record.entity_index.to_be_bytes());
        key.extend_from_slice(&seq.to_be_bytes());

        let bytes =
            serde_json::to_vec(record).map_err(|e| DbError::Serialization(e.to_string()))?;
        self.replenishments.insert(key, bytes)?;
        self.replenishments.flush()?;
        Ok(())
    }

    fn replenishments_for(&self, entity_index: u32) -> DbResult<Vec<ReplenishmentRecord>> {
        self.replenishments
            .scan_prefix(entity_index.to_be_bytes())
            .map(|item| {
                let (_, bytes) = item?;
                decode(&bytes)
            })
            .collect()
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> DbResult<T> {
    serde_json::from_slice(bytes).map_err(|e| DbError::Serialization(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
