//! Audit records for escrow replenishments.
//!
//! One record per transfer the ledger accepted. They are the local half of
//! any reconciliation against the ledger's own history: a transfer present
//! on the ledger but missing here was committed by a process that died
//! before it could write this record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::AssetSelector;

/// A completed escrow replenishment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplenishmentRecord {
    /// Guarantor entity that paid.
    pub entity_index: u32,
    /// Project whose escrow received the funds.
    pub project_index: u32,
    /// Asset moved.
    pub asset: AssetSelector,
    /// Amount the caller asked for.
    pub requested: Decimal,
    /// Amount actually submitted to the ledger.
    pub submitted: Decimal,
    /// `true` when `submitted` was reduced to what the wallet could cover.
    pub clamped: bool,
    /// Ledger entry sequence number.
    pub ledger_entry: u64,
    /// Ledger transaction hash.
    pub tx_id: String,
    /// When the engine recorded the transfer.
    pub recorded_at: DateTime<Utc>,
}
