//! # Protocol Configuration & Constants
//!
//! Every magic number in SolarFund lives here, next to the one runtime
//! configuration struct the engine needs: [`EngineConfig`].
//!
//! The network mode used to be a process-wide global read from inside the
//! admission check. It is now a plain value carried in `EngineConfig` and
//! handed to each component when it is constructed, so two engines pointed
//! at different networks can live in the same process (and in the same test).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Ledger Parameters
// ---------------------------------------------------------------------------

/// Default amount held back from a clamped replenishment to pay network
/// fees. One whole unit of whatever asset is being moved.
pub const DEFAULT_FEE_RESERVE: Decimal = Decimal::ONE;

/// Memo attached to every escrow replenishment transfer. Ledger memos are
/// short; keep this under [`MAX_MEMO_LENGTH`].
pub const REPLENISH_MEMO: &str = "guarantor refund";

/// Maximum memo length in bytes accepted by the ledger.
pub const MAX_MEMO_LENGTH: usize = 28;

/// Stablecoin code issued by the platform on sandbox networks.
pub const SANDBOX_STABLECOIN_CODE: &str = "STABLEUSD";

/// Anchor-issued USD code used on the production network.
pub const PRODUCTION_STABLECOIN_CODE: &str = "USD";

/// Native asset code, used only for display and audit records.
pub const NATIVE_ASSET_CODE: &str = "XLM";

/// Default native-to-USD conversion rate for the fixed-rate oracle.
/// Sandbox balances are play money; this only has to be plausible.
pub const DEFAULT_NATIVE_USD_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2); // 0.10

/// Sentinel stored in `Investor::amount_invested` for investors who have
/// never placed an order.
pub const NEVER_INVESTED: Decimal = Decimal::NEGATIVE_ONE;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// AES-256-GCM key length in bytes.
pub const AES_KEY_LENGTH: usize = 32;

/// AES-256-GCM nonce length in bytes. 96 bits. Not 128. Twelve bytes.
pub const AES_NONCE_LENGTH: usize = 12;

/// AES-256-GCM authentication tag length in bytes.
pub const AES_TAG_LENGTH: usize = 16;

/// Salt length for passphrase key derivation.
pub const KDF_SALT_LENGTH: usize = 16;

/// Argon2id memory cost in KiB (19 MiB, the OWASP minimum for Argon2id).
pub const ARGON2_MEMORY_KB: u32 = 19_456;

/// Argon2id iteration count.
pub const ARGON2_ITERATIONS: u32 = 2;

/// Argon2id lanes.
pub const ARGON2_PARALLELISM: u32 = 1;

/// Ed25519 seed length in bytes.
pub const SEED_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Network Mode
// ---------------------------------------------------------------------------

/// Which ledger network the engine talks to.
///
/// The mode only selects asset codes. Decision logic is identical on both
/// networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    /// Test network with platform-issued play money.
    #[default]
    Sandbox,
    /// The real network. Mistakes here cost real money.
    Production,
}

impl NetworkMode {
    /// Parse a mode name. Accepts `sandbox`/`testnet` and
    /// `production`/`mainnet`, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sandbox" | "testnet" => Some(NetworkMode::Sandbox),
            "production" | "mainnet" => Some(NetworkMode::Production),
            _ => None,
        }
    }
}

impl std::fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkMode::Sandbox => write!(f, "sandbox"),
            NetworkMode::Production => write!(f, "production"),
        }
    }
}

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Errors reported by [`EngineConfig::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("fee reserve must not be negative (got {0})")]
    NegativeFeeReserve(Decimal),

    #[error("native/usd rate must be positive (got {0})")]
    NonPositiveRate(Decimal),

    #[error("stablecoin code for {0} network is empty")]
    EmptyStablecoinCode(NetworkMode),
}

/// Runtime configuration for the guarantee engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Network the engine runs against.
    pub network: NetworkMode,

    /// Amount withheld from clamped replenishments to cover fees.
    pub fee_reserve: Decimal,

    /// Stablecoin code queried on the sandbox network.
    pub sandbox_stablecoin: String,

    /// Stablecoin code queried on the production network.
    pub production_stablecoin: String,

    /// Rate used by the fixed-rate oracle (USD per native unit).
    pub native_usd_rate: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            network: NetworkMode::Sandbox,
            fee_reserve: DEFAULT_FEE_RESERVE,
            sandbox_stablecoin: SANDBOX_STABLECOIN_CODE.to_string(),
            production_stablecoin: PRODUCTION_STABLECOIN_CODE.to_string(),
            native_usd_rate: DEFAULT_NATIVE_USD_RATE,
        }
    }
}

impl EngineConfig {
    /// Default configuration pinned to the given network.
    pub fn for_network(network: NetworkMode) -> Self {
        Self {
            network,
            ..Self::default()
        }
    }

    /// The stablecoin code admission control should query on the
    /// configured network.
    pub fn stablecoin_code(&self) -> &str {
        match self.network {
            NetworkMode::Sandbox => &self.sandbox_stablecoin,
            NetworkMode::Production => &self.production_stablecoin,
        }
    }

    /// Rejects configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fee_reserve < Decimal::ZERO {
            return Err(ConfigError::NegativeFeeReserve(self.fee_reserve));
        }
        if self.native_usd_rate <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveRate(self.native_usd_rate));
        }
        if self.sandbox_stablecoin.trim().is_empty() {
            return Err(ConfigError::EmptyStablecoinCode(NetworkMode::Sandbox));
        }
        if self.production_stablecoin.trim().is_empty() {
            return Err(ConfigError::EmptyStablecoinCode(NetworkMode::Production));
        }
        Ok(())
    }
}
