//! Solar project as seen by the guarantee engine.
//!
//! Project lifecycle belongs to another part of the platform. The engine
//! only needs to know where the escrow account is.

use serde::{Deserialize, Serialize};

/// A project with a custodial escrow account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Repository index.
    pub index: u32,
    /// Hex public key of the project's escrow account.
    pub escrow_pubkey: String,
    /// Lifecycle stage ordinal, tracked by the project side of the platform.
    pub stage: u8,
}

impl Project {
    pub fn new(index: u32, escrow_pubkey: impl Into<String>) -> Self {
        Self {
            index,
            escrow_pubkey: escrow_pubkey.into(),
            stage: 0,
        }
    }
}
