//! Base account shared by entities and investors.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::vault::EncryptedSeed;

/// A custodial wallet: the public address plus the sealed seed that signs
/// for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    /// Hex-encoded Ed25519 public key.
    pub public_key: String,
    /// Seed sealed under the owner's passphrase.
    pub encrypted_seed: EncryptedSeed,
}

/// Fields every platform participant has.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Repository index; the key the record is stored under.
    pub index: u32,
    /// Display name.
    pub name: String,
    /// Whether the participant accepted the platform's terms and conditions.
    pub legal: bool,
    /// Reputation score, maintained elsewhere.
    pub reputation: Decimal,
    /// Custodial wallet.
    pub wallet: Wallet,
}

impl Account {
    /// A fresh account that has not accepted the terms yet.
    pub fn new(index: u32, name: impl Into<String>, wallet: Wallet) -> Self {
        Self {
            index,
            name: name.into(),
            legal: false,
            reputation: Decimal::ZERO,
            wallet,
        }
    }

    /// Shorthand for the wallet address.
    pub fn public_key(&self) -> &str {
        &self.wallet.public_key
    }
}
