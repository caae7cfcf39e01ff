//! # Storage Module
//!
//! Persistence for the records the guarantee engine reads and writes.
//!
//! ```text
//! mod.rs    — Repository trait, DbError
//! db.rs     — SolarDb: sled trees, JSON-encoded records
//! audit.rs  — ReplenishmentRecord: one row per accepted escrow transfer
//! ```
//!
//! The engine only ever sees the [`Repository`] trait. Lookups distinguish
//! "not there" (`Ok(None)`) from "could not look" (`Err`), because the
//! engine reports those two cases differently to its callers.

pub mod audit;
pub mod db;

pub use audit::ReplenishmentRecord;
pub use db::SolarDb;

use thiserror::Error;

use crate::model::{Entity, Investor, Project};

/// Errors from the storage layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// The underlying sled database failed.
    #[error("database error: {0}")]
    Sled(#[from] sled::Error),

    /// A record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Record access used by the guarantee engine.
///
/// Implementations must be safe to share between threads. Writes of a
/// whole record are atomic; there are no multi-record transactions.
pub trait Repository: Send + Sync {
    fn retrieve_project(&self, index: u32) -> DbResult<Option<Project>>;

    fn retrieve_entity(&self, index: u32) -> DbResult<Option<Entity>>;

    fn retrieve_investor(&self, index: u32) -> DbResult<Option<Investor>>;

    /// Every stored investor, in index order.
    fn retrieve_all_investors(&self) -> DbResult<Vec<Investor>>;

    /// Insert or replace the entity stored under its account index.
    fn save_entity(&self, entity: &Entity) -> DbResult<()>;

    /// Insert or replace the investor stored under its account index.
    fn save_investor(&self, investor: &Investor) -> DbResult<()>;

    fn save_project(&self, project: &Project) -> DbResult<()>;

    /// Append an audit record for an accepted replenishment transfer.
    fn record_replenishment(&self, record: &ReplenishmentRecord) -> DbResult<()>;

    /// Audit records written for `entity_index`, oldest first.
    fn replenishments_for(&self, entity_index: u32) -> DbResult<Vec<ReplenishmentRecord>>;
}
