//! # Escrow Replenishment
//!
//! When a project's escrow account runs short, its guarantor tops it up
//! from the guarantor's own wallet. The flow is:
//!
//! 1. **Authorize** — the caller must hold [`Role::Guarantor`].
//! 2. **Locate** — load the project to learn its escrow address.
//! 3. **Size** — read the wallet balance and clamp the request to what the
//!    wallet can cover, keeping back a fee reserve.
//! 4. **Unlock** — unseal the wallet secret with the caller's passphrase.
//! 5. **Transfer** — submit one signed transfer to the escrow.
//! 6. **Record** — emit an audit event and persist a
//!    [`ReplenishmentRecord`].
//!
//! Steps 3 to 5 run under a per-wallet lock, so two replenishments from the
//! same guarantor never size themselves against the same balance.
//!
//! Native currency and issued assets go through the same path; only the
//! [`AssetSelector`] differs.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use solarfund_protocol::config::REPLENISH_MEMO;
use solarfund_protocol::ledger::{AssetCode, AssetSelector, LedgerClient};
use solarfund_protocol::model::{Entity, Role};
use solarfund_protocol::storage::{ReplenishmentRecord, Repository};
use solarfund_protocol::vault::CredentialVault;

use crate::authorization::require_role;
use crate::error::GuaranteeError;

// ---------------------------------------------------------------------------
// Clamp policy
// ---------------------------------------------------------------------------

/// How much a replenishment will actually send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPlan {
    /// Amount to submit to the ledger.
    pub amount: Decimal,
    /// `true` if `amount` is less than what was requested.
    pub clamped: bool,
}

/// Size a transfer against the wallet balance.
///
/// A wallet that covers the request sends exactly the request. A wallet
/// that does not sends its whole balance minus `fee_reserve`, and if that
/// leaves nothing positive the transfer is refused.
///
/// ```text
/// balance 200, request 100  →  100
/// balance  50, request 100  →   49   (clamped)
/// balance   1, request 100  →  InsufficientFunds
/// ```
pub fn clamp_transfer_amount(
    balance: Decimal,
    requested: Decimal,
    fee_reserve: Decimal,
) -> Result<TransferPlan, GuaranteeError> {
    if balance >= requested {
        return Ok(TransferPlan {
            amount: requested,
            clamped: false,
        });
    }
    let amount = balance - fee_reserve;
    if amount <= Decimal::ZERO {
        return Err(GuaranteeError::InsufficientFunds {
            balance,
            fee_reserve,
        });
    }
    Ok(TransferPlan {
        amount,
        clamped: true,
    })
}

// ---------------------------------------------------------------------------
// Wallet locks
// ---------------------------------------------------------------------------

/// Keyed mutexes, one per wallet public key.
///
/// Entries are created on first use and never removed; the table grows with
/// the number of distinct guarantor wallets, which is small.
#[derive(Debug, Default)]
pub struct WalletLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl WalletLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mutex guarding `public_key`. Callers lock the returned handle.
    pub fn lock_for(&self, public_key: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(public_key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Number of wallets that have been locked at least once.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Receipt
// ---------------------------------------------------------------------------

/// Outcome of an accepted replenishment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplenishmentReceipt {
    /// Ledger transaction hash.
    pub tx_id: String,
    /// Ledger entry sequence number.
    pub ledger_entry: u64,
    /// Amount the caller asked for.
    pub requested: Decimal,
    /// Amount that was sent.
    pub submitted: Decimal,
    /// `true` if the wallet could not cover `requested`.
    pub clamped: bool,
}

// ---------------------------------------------------------------------------
// EscrowReplenisher
// ---------------------------------------------------------------------------

/// Moves guarantor funds into project escrow accounts.
pub struct EscrowReplenisher {
    repo: Arc<dyn Repository>,
    ledger: Arc<dyn LedgerClient>,
    vault: Arc<dyn CredentialVault>,
    fee_reserve: Decimal,
    locks: WalletLocks,
}

impl EscrowReplenisher {
    pub fn new(
        repo: Arc<dyn Repository>,
        ledger: Arc<dyn LedgerClient>,
        vault: Arc<dyn CredentialVault>,
        fee_reserve: Decimal,
    ) -> Self {
        Self {
            repo,
            ledger,
            vault,
            fee_reserve,
            locks: WalletLocks::new(),
        }
    }

    /// Amount withheld from clamped transfers.
    pub fn fee_reserve(&self) -> Decimal {
        self.fee_reserve
    }

    /// Transfer up to `amount` of `asset` from the guarantor's wallet to the
    /// escrow of project `project_index`.
    ///
    /// The transfer is submitted once. A submission error means nothing
    /// moved on the ledger's side as far as the engine can tell; the engine
    /// does not retry.
    ///
    /// # Errors
    ///
    /// - [`GuaranteeError::Authorization`] if `entity` is not a guarantor.
    /// - [`GuaranteeError::InvalidAmount`] if `amount` is not positive.
    /// - [`GuaranteeError::NotFound`] if the project does not exist.
    /// - [`GuaranteeError::LedgerQuery`] if the balance cannot be read.
    /// - [`GuaranteeError::InsufficientFunds`] if the clamped amount is not
    ///   positive.
    /// - [`GuaranteeError::Credential`] if the passphrase does not unseal the
    ///   wallet. Nothing is submitted.
    /// - [`GuaranteeError::TransactionSubmission`] if the ledger refuses.
    pub fn replenish(
        &self,
        entity: &Entity,
        project_index: u32,
        asset: &AssetSelector,
        amount: Decimal,
        passphrase: &str,
    ) -> Result<ReplenishmentReceipt, GuaranteeError> {
        require_role(entity, Role::Guarantor)?;
        if amount <= Decimal::ZERO {
            return Err(GuaranteeError::InvalidAmount(amount));
        }

        let project = self
            .repo
            .retrieve_project(project_index)?
            .ok_or(GuaranteeError::NotFound {
                kind: "project",
                index: project_index,
            })?;

        let wallet = &entity.account.wallet;
        let lock = self.locks.lock_for(&wallet.public_key);
        let _guard = lock.lock();

        let balance = self
            .ledger
            .balance(&wallet.public_key, asset)
            .map_err(GuaranteeError::LedgerQuery)?;

        let plan = clamp_transfer_amount(balance, amount, self.fee_reserve)?;
        if plan.clamped {
            tracing::warn!(
                entity = entity.index(),
                project = project_index,
                %asset,
                %balance,
                requested = %amount,
                submitted = %plan.amount,
                "wallet cannot cover replenishment, clamping"
            );
        }

        let secret = self
            .vault
            .decrypt_seed(&wallet.encrypted_seed, passphrase)
            .map_err(GuaranteeError::Credential)?;

        let receipt = self
            .ledger
            .transfer(
                asset,
                &project.escrow_pubkey,
                plan.amount,
                &secret,
                REPLENISH_MEMO,
            )
            .map_err(GuaranteeError::TransactionSubmission)?;

        tracing::info!(
            target: "audit",
            entity = entity.index(),
            project = project_index,
            %asset,
            submitted = %plan.amount,
            tx_id = %receipt.tx_id,
            "escrow replenished"
        );

        let record = ReplenishmentRecord {
            entity_index: entity.index(),
            project_index,
            asset: asset.clone(),
            requested: amount,
            submitted: plan.amount,
            clamped: plan.clamped,
            ledger_entry: receipt.ledger_entry,
            tx_id: receipt.tx_id.clone(),
            recorded_at: Utc::now(),
        };
        if let Err(e) = self.repo.record_replenishment(&record) {
            tracing::error!(
                error = %e,
                tx_id = %receipt.tx_id,
                "transfer committed but audit record was not persisted"
            );
        }

        Ok(ReplenishmentReceipt {
            tx_id: receipt.tx_id,
            ledger_entry: receipt.ledger_entry,
            requested: amount,
            submitted: plan.amount,
            clamped: plan.clamped,
        })
    }

    /// [`replenish`](Self::replenish) with an issued asset.
    pub fn replenish_with_asset(
        &self,
        entity: &Entity,
        project_index: u32,
        asset_code: &str,
        issuer: &str,
        amount: Decimal,
        passphrase: &str,
    ) -> Result<ReplenishmentReceipt, GuaranteeError> {
        let asset = AssetSelector::Custom(AssetCode::new(asset_code, issuer));
        self.replenish(entity, project_index, &asset, amount, passphrase)
    }

    /// [`replenish`](Self::replenish) with the native currency.
    pub fn replenish_with_native(
        &self,
        entity: &Entity,
        project_index: u32,
        amount: Decimal,
        passphrase: &str,
    ) -> Result<ReplenishmentReceipt, GuaranteeError> {
        self.replenish(
            entity,
            project_index,
            &AssetSelector::Native,
            amount,
            passphrase,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
