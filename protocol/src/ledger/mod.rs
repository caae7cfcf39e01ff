//! # Ledger Module — Talking to the Value-Transfer Network
//!
//! SolarFund does not move money itself. Balances live on an external
//! ledger network and every transfer is a signed submission to it. This
//! module defines the narrow contract the engine needs from that network,
//! plus a sandbox implementation for development networks and tests.
//!
//! ```text
//! mod.rs      — LedgerClient trait, AssetSelector, TransferReceipt, errors
//! sandbox.rs  — SandboxLedger: sled-backed ledger with a transfer history
//! ```
//!
//! ## One transfer path
//!
//! The network exposes two families of calls, one for the native currency
//! and one for issued assets. Callers should not have to branch on that.
//! [`LedgerClient::balance`] and [`LedgerClient::transfer`] dispatch on an
//! [`AssetSelector`] so the engine has exactly one code path for both.

pub mod sandbox;

pub use sandbox::{LedgerEntry, SandboxLedger, SignedTransfer};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::NATIVE_ASSET_CODE;
use crate::crypto::keys::SigningSecret;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors surfaced by a ledger client.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LedgerError {
    /// The network could not be reached or did not answer.
    #[error("ledger unreachable: {0}")]
    Unreachable(String),

    /// The network answered but refused the request.
    #[error("ledger rejected request: {0}")]
    Rejected(String),

    /// The source account cannot cover the transfer.
    #[error("insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance {
        /// Balance of the source account.
        available: Decimal,
        /// Amount the transfer tried to move.
        requested: Decimal,
    },

    /// Transfers must move a strictly positive amount.
    #[error("invalid transfer amount {0}")]
    InvalidAmount(Decimal),

    /// The destination is not a well-formed public key.
    #[error("invalid destination account {0}")]
    InvalidDestination(String),
}

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

/// An issued asset: a code plus the account that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetCode {
    /// Short asset code, e.g. `STABLEUSD`.
    pub code: String,
    /// Hex public key of the issuing account.
    pub issuer: String,
}

impl AssetCode {
    pub fn new(code: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            issuer: issuer.into(),
        }
    }
}

/// Which asset a balance query or transfer refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AssetSelector {
    /// The network's native currency.
    Native,
    /// An issued asset.
    Custom(AssetCode),
}

impl AssetSelector {
    /// Display code: the asset code, or the native code for `Native`.
    pub fn code(&self) -> &str {
        match self {
            AssetSelector::Native => NATIVE_ASSET_CODE,
            AssetSelector::Custom(asset) => &asset.code,
        }
    }
}

impl std::fmt::Display for AssetSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetSelector::Native => write!(f, "{NATIVE_ASSET_CODE}(native)"),
            AssetSelector::Custom(asset) => write!(f, "{}", asset.code),
        }
    }
}

// ---------------------------------------------------------------------------
// Receipts
// ---------------------------------------------------------------------------

/// What the network hands back for an accepted transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// Sequence number of the ledger entry that recorded the transfer.
    pub ledger_entry: u64,
    /// Transaction hash, hex-encoded.
    pub tx_id: String,
}

// ---------------------------------------------------------------------------
// LedgerClient
// ---------------------------------------------------------------------------

/// Contract the engine needs from the ledger network.
///
/// Calls are blocking and carry no timeout of their own; a hung network
/// hangs the caller.
pub trait LedgerClient: Send + Sync {
    /// Balance of an issued asset held by `public_key`.
    fn asset_balance(&self, public_key: &str, asset_code: &str) -> Result<Decimal, LedgerError>;

    /// Native-currency balance held by `public_key`.
    fn native_balance(&self, public_key: &str) -> Result<Decimal, LedgerError>;

    /// Transfer an issued asset from the wallet of `secret` to `destination`.
    fn send_asset(
        &self,
        asset_code: &str,
        issuer: &str,
        destination: &str,
        amount: Decimal,
        secret: &SigningSecret,
        memo: &str,
    ) -> Result<TransferReceipt, LedgerError>;

    /// Transfer native currency from the wallet of `secret` to `destination`.
    fn send_native(
        &self,
        destination: &str,
        amount: Decimal,
        secret: &SigningSecret,
        memo: &str,
    ) -> Result<TransferReceipt, LedgerError>;

    /// Balance of whichever asset `asset` selects.
    fn balance(&self, public_key: &str, asset: &AssetSelector) -> Result<Decimal, LedgerError> {
        match asset {
            AssetSelector::Native => self.native_balance(public_key),
            AssetSelector::Custom(code) => self.asset_balance(public_key, &code.code),
        }
    }

    /// Transfer whichever asset `asset` selects.
    fn transfer(
        &self,
        asset: &AssetSelector,
        destination: &str,
        amount: Decimal,
        secret: &SigningSecret,
        memo: &str,
    ) -> Result<TransferReceipt, LedgerError> {
        match asset {
            AssetSelector::Native => self.send_native(destination, amount, secret, memo),
            AssetSelector::Custom(code) => self.send_asset(
                &code.code,
                &code.issuer,
                destination,
                amount,
                secret,
                memo,
            ),
        }
    }
}
