//! # Sandbox Ledger
//!
//! A single-node stand-in for the ledger network, used on sandbox networks
//! and in tests. It keeps balances and an append-only transfer history in
//! sled, so a sandbox survives restarts of the operator node.
//!
//! ## Tree Layout
//!
//! | Tree              | Key                     | Value                 |
//! |-------------------|-------------------------|-----------------------|
//! | `ledger_balances` | `<pubkey>/<asset code>` | decimal (UTF-8)       |
//! | `ledger_history`  | entry seq (8B BE)       | `json(LedgerEntry)`   |
//!
//! Issued-asset balances are keyed by code only, matching how the
//! `asset_balance` query is addressed. Native balances use the key
//! `<pubkey>/native`.
//!
//! ## Signing
//!
//! The client side of [`LedgerClient`] wraps each transfer in a
//! [`SignedTransfer`] whose source account is the public key of the signing
//! secret. [`SandboxLedger::apply`] then checks the signature against that
//! claimed source before touching any balance, so an envelope altered after
//! signing, or signed by someone other than the source, is rejected.
//!
//! ## Atomicity
//!
//! The debit, the credit and the history entry of a transfer are written in
//! one sled transaction over both trees. A failed transfer leaves no trace.
//!
//! ## Fault injection
//!
//! [`SandboxLedger::set_offline`] makes balance queries fail and
//! [`SandboxLedger::set_rejecting`] makes submissions fail, so callers can
//! exercise their error paths without a flaky network.

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{Db, IVec, Transactional, Tree};

use super::{AssetSelector, LedgerClient, LedgerError, TransferReceipt};
use crate::config::MAX_MEMO_LENGTH;
use crate::crypto::keys::{self, SigningSecret};

/// Key suffix for native balances.
const NATIVE_KEY: &str = "native";

/// One accepted transfer in the sandbox history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Sequence number, strictly increasing.
    pub entry: u64,
    /// Transaction hash (BLAKE3, hex).
    pub tx_id: String,
    /// Source account public key.
    pub source: String,
    /// Destination account public key.
    pub destination: String,
    /// Asset code moved (`native` for the native currency).
    pub asset: String,
    /// Amount moved.
    pub amount: Decimal,
    /// Memo attached by the sender.
    pub memo: String,
    /// When the sandbox accepted the transfer.
    pub timestamp: DateTime<Utc>,
}

/// A transfer as submitted to the sandbox: the payload plus the source
/// account's signature over it.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTransfer {
    /// Claimed source account public key (hex).
    pub source: String,
    pub destination: String,
    /// Asset code, or `native`.
    pub asset: String,
    pub amount: Decimal,
    pub memo: String,
    /// Ed25519 signature over [`SignedTransfer::payload`].
    pub signature: [u8; 64],
}

impl SignedTransfer {
    /// Build and sign a transfer from the wallet of `secret`.
    pub fn sign(
        secret: &SigningSecret,
        asset: &str,
        destination: &str,
        amount: Decimal,
        memo: &str,
    ) -> Self {
        let mut transfer = Self {
            source: secret.public_key_hex(),
            destination: destination.to_string(),
            asset: asset.to_string(),
            amount,
            memo: memo.to_string(),
            signature: [0u8; 64],
        };
        transfer.signature = secret.sign(&transfer.payload());
        transfer
    }

    /// Canonical bytes covered by the signature.
    pub fn payload(&self) -> Vec<u8> {
        format!(
            "{}|{}|{}|{}|{}",
            self.source, self.destination, self.asset, self.amount, self.memo
        )
        .into_bytes()
    }
}

/// sled-backed single-node ledger.
#[derive(Debug)]
pub struct SandboxLedger {
    db: Db,
    balances: Tree,
    history: Tree,
    offline: AtomicBool,
    rejecting: AtomicBool,
}

impl SandboxLedger {
    /// Opens the sandbox trees inside an existing sled database.
    pub fn open(db: Db) -> Result<Self, LedgerError> {
        let balances = db.open_tree("ledger_balances").map_err(storage_error)?;
        let history = db.open_tree("ledger_history").map_err(storage_error)?;
        Ok(Self {
            db,
            balances,
            history,
            offline: AtomicBool::new(false),
            rejecting: AtomicBool::new(false),
        })
    }

    /// In-memory sandbox for tests. Dropped with the value.
    pub fn temporary() -> Result<Self, LedgerError> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(storage_error)?;
        Self::open(db)
    }

    /// When `true`, every balance query fails with `Unreachable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// When `true`, every submission fails with `Rejected`.
    pub fn set_rejecting(&self, rejecting: bool) {
        self.rejecting.store(rejecting, Ordering::SeqCst);
    }

    /// Faucet: mint `amount` of `asset` into `public_key`.
    pub fn credit(
        &self,
        public_key: &str,
        asset: &AssetSelector,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount));
        }
        keys::validate_public_key(public_key)
            .map_err(|_| LedgerError::InvalidDestination(public_key.to_string()))?;

        let key = balance_key(public_key, asset_key(asset));
        let updated = self
            .balances
            .transaction(|balances| {
                let current = decode_balance(balances.get(key.as_bytes())?)
                    .map_err(ConflictableTransactionError::Abort)?;
                let updated = current
                    .checked_add(amount)
                    .ok_or_else(|| ConflictableTransactionError::Abort(overflow()))?;
                balances.insert(key.as_bytes(), updated.to_string().as_bytes())?;
                Ok(updated)
            })
            .map_err(transaction_error)?;
        tracing::info!(public_key, %asset, %amount, balance = %updated, "sandbox faucet credit");
        Ok(updated)
    }

    /// Every accepted transfer, oldest first.
    pub fn history(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.history
            .iter()
            .map(|item| {
                let (_, bytes) = item.map_err(storage_error)?;
                serde_json::from_slice(&bytes)
                    .map_err(|e| LedgerError::Unreachable(format!("corrupt history entry: {e}")))
            })
            .collect()
    }

    /// Looks up an accepted transfer by transaction hash.
    pub fn find_transaction(&self, tx_id: &str) -> Result<Option<LedgerEntry>, LedgerError> {
        Ok(self.history()?.into_iter().find(|e| e.tx_id == tx_id))
    }

    /// Verify and apply a signed transfer.
    ///
    /// Validation and the signature check happen before any write; the
    /// balance check and all writes happen inside one transaction.
    pub fn apply(&self, transfer: &SignedTransfer) -> Result<TransferReceipt, LedgerError> {
        let amount = transfer.amount;
        let memo = transfer.memo.as_str();
        let destination = transfer.destination.as_str();
        let asset = transfer.asset.as_str();

        if self.rejecting.load(Ordering::SeqCst) {
            return Err(LedgerError::Rejected("sandbox ledger is rejecting submissions".into()));
        }
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount));
        }
        if memo.len() > MAX_MEMO_LENGTH {
            return Err(LedgerError::Rejected(format!(
                "memo exceeds {MAX_MEMO_LENGTH} bytes"
            )));
        }
        keys::validate_public_key(destination)
            .map_err(|_| LedgerError::InvalidDestination(destination.to_string()))?;

        let payload = transfer.payload();
        if !keys::verify_hex(&transfer.source, &payload, &transfer.signature) {
            return Err(LedgerError::Rejected("bad signature".into()));
        }

        let entry = self.db.generate_id().map_err(storage_error)?;
        let tx_id = {
            let mut hasher = blake3::Hasher::new();
            hasher.update(&payload);
            hasher.update(&entry.to_be_bytes());
            hasher.update(&transfer.signature);
            hasher.finalize().to_hex().to_string()
        };

        let record = LedgerEntry {
            entry,
            tx_id: tx_id.clone(),
            source: transfer.source.clone(),
            destination: destination.to_string(),
            asset: asset.to_string(),
            amount,
            memo: memo.to_string(),
            timestamp: Utc::now(),
        };
        let bytes = serde_json::to_vec(&record)
            .map_err(|e| LedgerError::Rejected(format!("could not encode entry: {e}")))?;

        let source_key = balance_key(&transfer.source, asset);
        let dest_key = balance_key(destination, asset);
        let entry_key = entry.to_be_bytes();

        (&self.balances, &self.history)
            .transaction(|(balances, history)| {
                let available = decode_balance(balances.get(source_key.as_bytes())?)
                    .map_err(ConflictableTransactionError::Abort)?;
                if available < amount {
                    return Err(ConflictableTransactionError::Abort(
                        LedgerError::InsufficientBalance {
                            available,
                            requested: amount,
                        },
                    ));
                }
                // A self-transfer only needs the balance check.
                if source_key != dest_key {
                    let credited = decode_balance(balances.get(dest_key.as_bytes())?)
                        .map_err(ConflictableTransactionError::Abort)?
                        .checked_add(amount)
                        .ok_or_else(|| ConflictableTransactionError::Abort(overflow()))?;
                    balances.insert(
                        source_key.as_bytes(),
                        (available - amount).to_string().as_bytes(),
                    )?;
                    balances.insert(dest_key.as_bytes(), credited.to_string().as_bytes())?;
                }
                history.insert(&entry_key[..], bytes.as_slice())?;
                Ok(())
            })
            .map_err(transaction_error)?;

        tracing::debug!(entry, tx_id = %tx_id, asset, %amount, "sandbox transfer accepted");
        Ok(TransferReceipt {
            ledger_entry: entry,
            tx_id,
        })
    }

    // -- internals ----------------------------------------------------------

    fn check_online(&self) -> Result<(), LedgerError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(LedgerError::Unreachable("sandbox ledger is offline".into()));
        }
        Ok(())
    }

    fn read_balance(&self, key: &str) -> Result<Decimal, LedgerError> {
        decode_balance(self.balances.get(key.as_bytes()).map_err(storage_error)?)
    }
}

impl LedgerClient for SandboxLedger {
    fn asset_balance(&self, public_key: &str, asset_code: &str) -> Result<Decimal, LedgerError> {
        self.check_online()?;
        self.read_balance(&balance_key(public_key, asset_code))
    }

    fn native_balance(&self, public_key: &str) -> Result<Decimal, LedgerError> {
        self.check_online()?;
        self.read_balance(&balance_key(public_key, NATIVE_KEY))
    }

    fn send_asset(
        &self,
        asset_code: &str,
        _issuer: &str,
        destination: &str,
        amount: Decimal,
        secret: &SigningSecret,
        memo: &str,
    ) -> Result<TransferReceipt, LedgerError> {
        self.apply(&SignedTransfer::sign(secret, asset_code, destination, amount, memo))
    }

    fn send_native(
        &self,
        destination: &str,
        amount: Decimal,
        secret: &SigningSecret,
        memo: &str,
    ) -> Result<TransferReceipt, LedgerError> {
        self.apply(&SignedTransfer::sign(secret, NATIVE_KEY, destination, amount, memo))
    }
}

fn asset_key(asset: &AssetSelector) -> &str {
    match asset {
        AssetSelector::Native => NATIVE_KEY,
        AssetSelector::Custom(code) => &code.code,
    }
}

fn balance_key(public_key: &str, asset: &str) -> String {
    format!("{public_key}/{asset}")
}

fn decode_balance(bytes: Option<IVec>) -> Result<Decimal, LedgerError> {
    let Some(bytes) = bytes else {
        return Ok(Decimal::ZERO);
    };
    std::str::from_utf8(&bytes)
        .ok()
        .and_then(|text| Decimal::from_str(text).ok())
        .ok_or_else(|| LedgerError::Unreachable("corrupt balance entry".into()))
}

fn overflow() -> LedgerError {
    LedgerError::Rejected("balance would overflow".into())
}

fn storage_error(e: sled::Error) -> LedgerError {
    LedgerError::Unreachable(format!("sandbox storage: {e}"))
}

fn transaction_error(e: TransactionError<LedgerError>) -> LedgerError {
    match e {
        TransactionError::Abort(err) => err,
        TransactionError::Storage(err) => storage_error(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::AssetCode;
    use rust_decimal_macros::dec;

    fn stable() -> AssetSelector {
        AssetSelector::Custom(AssetCode::new("STABLEUSD", "issuer"))
    }

    #[test]
    fn unknown_accounts_have_zero_balance() {
        let ledger = SandboxLedger::temporary().unwrap();
        let key = SigningSecret::generate().public_key_hex();
        assert_eq!(ledger.native_balance(&key).unwrap(), Decimal::ZERO);
        assert_eq!(ledger.asset_balance(&key, "STABLEUSD").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn credit_accumulates() {
        let ledger = SandboxLedger::temporary().unwrap();
        let key = SigningSecret::generate().public_key_hex();
        ledger.credit(&key, &stable(), dec!(10)).unwrap();
        ledger.credit(&key, &stable(), dec!(2.5)).unwrap();
        assert_eq!(ledger.balance(&key, &stable()).unwrap(), dec!(12.5));
        assert_eq!(ledger.native_balance(&key).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn transfer_moves_funds_and_records_history() {
        let ledger = SandboxLedger::temporary().unwrap();
        let sender = SigningSecret::generate();
        let receiver = SigningSecret::generate().public_key_hex();
        ledger
            .credit(&sender.public_key_hex(), &AssetSelector::Native, dec!(100))
            .unwrap();

        let receipt = ledger
            .transfer(&AssetSelector::Native, &receiver, dec!(40), &sender, "memo")
            .unwrap();

        assert_eq!(ledger.native_balance(&sender.public_key_hex()).unwrap(), dec!(60));
        assert_eq!(ledger.native_balance(&receiver).unwrap(), dec!(40));

        let entry = ledger.find_transaction(&receipt.tx_id).unwrap().unwrap();
        assert_eq!(entry.entry, receipt.ledger_entry);
        assert_eq!(entry.amount, dec!(40));
        assert_eq!(entry.memo, "memo");
        assert_eq!(ledger.history().unwrap().len(), 1);
    }

    #[test]
    fn overdraft_is_rejected() {
        let ledger = SandboxLedger::temporary().unwrap();
        let sender = SigningSecret::generate();
        let receiver = SigningSecret::generate().public_key_hex();
        ledger
            .credit(&sender.public_key_hex(), &stable(), dec!(5))
            .unwrap();

        let err = ledger
            .transfer(&stable(), &receiver, dec!(6), &sender, "x")
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                available: dec!(5),
                requested: dec!(6)
            }
        );
        assert!(ledger.history().unwrap().is_empty());
    }

    #[test]
    fn non_positive_amounts_and_bad_destinations_rejected() {
        let ledger = SandboxLedger::temporary().unwrap();
        let sender = SigningSecret::generate();
        let receiver = SigningSecret::generate().public_key_hex();

        assert_eq!(
            ledger
                .send_native(&receiver, Decimal::ZERO, &sender, "x")
                .unwrap_err(),
            LedgerError::InvalidAmount(Decimal::ZERO)
        );
        assert!(matches!(
            ledger.send_native("not-a-key", dec!(1), &sender, "x"),
            Err(LedgerError::InvalidDestination(_))
        ));
    }

    #[test]
    fn fault_injection() {
        let ledger = SandboxLedger::temporary().unwrap();
        let sender = SigningSecret::generate();
        let receiver = SigningSecret::generate().public_key_hex();
        ledger
            .credit(&sender.public_key_hex(), &AssetSelector::Native, dec!(10))
            .unwrap();

        ledger.set_offline(true);
        assert!(matches!(
            ledger.native_balance(&receiver),
            Err(LedgerError::Unreachable(_))
        ));
        ledger.set_offline(false);

        ledger.set_rejecting(true);
        assert!(matches!(
            ledger.send_native(&receiver, dec!(1), &sender, "x"),
            Err(LedgerError::Rejected(_))
        ));
        ledger.set_rejecting(false);
        assert!(ledger.send_native(&receiver, dec!(1), &sender, "x").is_ok());
    }

    #[test]
    fn tampered_transfer_is_rejected() {
        let ledger = SandboxLedger::temporary().unwrap();
        let sender = SigningSecret::generate();
        let receiver = SigningSecret::generate().public_key_hex();
        ledger
            .credit(&sender.public_key_hex(), &AssetSelector::Native, dec!(100))
            .unwrap();

        let mut inflated = SignedTransfer::sign(&sender, NATIVE_KEY, &receiver, dec!(1), "x");
        inflated.amount = dec!(90);
        assert_eq!(
            ledger.apply(&inflated).unwrap_err(),
            LedgerError::Rejected("bad signature".into())
        );

        // Signed by mallory, claiming to come from the sender's wallet.
        let mallory = SigningSecret::generate();
        let mut forged = SignedTransfer::sign(&mallory, NATIVE_KEY, &receiver, dec!(50), "x");
        forged.source = sender.public_key_hex();
        assert!(matches!(ledger.apply(&forged), Err(LedgerError::Rejected(_))));

        assert_eq!(ledger.native_balance(&sender.public_key_hex()).unwrap(), dec!(100));
        assert_eq!(ledger.native_balance(&receiver).unwrap(), Decimal::ZERO);
        assert!(ledger.history().unwrap().is_empty());

        let genuine = SignedTransfer::sign(&sender, NATIVE_KEY, &receiver, dec!(1), "x");
        assert!(ledger.apply(&genuine).is_ok());
        assert_eq!(ledger.native_balance(&receiver).unwrap(), dec!(1));
    }

    #[test]
    fn overflowing_credit_writes_nothing() {
        let ledger = SandboxLedger::temporary().unwrap();
        let sender = SigningSecret::generate();
        let receiver = SigningSecret::generate().public_key_hex();
        ledger.credit(&receiver, &stable(), Decimal::MAX).unwrap();
        ledger.credit(&sender.public_key_hex(), &stable(), dec!(10)).unwrap();

        assert!(matches!(
            ledger.credit(&receiver, &stable(), dec!(1)),
            Err(LedgerError::Rejected(_))
        ));

        // The debit is rolled back together with the failed credit.
        let err = ledger
            .transfer(&stable(), &receiver, dec!(10), &sender, "x")
            .unwrap_err();
        assert!(matches!(err, LedgerError::Rejected(_)));
        assert_eq!(ledger.balance(&sender.public_key_hex(), &stable()).unwrap(), dec!(10));
        assert_eq!(ledger.balance(&receiver, &stable()).unwrap(), Decimal::MAX);
        assert!(ledger.history().unwrap().is_empty());
    }

    #[test]
    fn self_transfer_keeps_the_balance() {
        let ledger = SandboxLedger::temporary().unwrap();
        let sender = SigningSecret::generate();
        let own = sender.public_key_hex();
        ledger.credit(&own, &AssetSelector::Native, dec!(5)).unwrap();

        ledger
            .transfer(&AssetSelector::Native, &own, dec!(5), &sender, "x")
            .unwrap();
        assert_eq!(ledger.native_balance(&own).unwrap(), dec!(5));
        assert_eq!(ledger.history().unwrap().len(), 1);
    }

    #[test]
    fn state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let key = SigningSecret::generate().public_key_hex();
        {
            let ledger = SandboxLedger::open(sled::open(dir.path()).unwrap()).unwrap();
            ledger.credit(&key, &stable(), dec!(7)).unwrap();
        }
        let ledger = SandboxLedger::open(sled::open(dir.path()).unwrap()).unwrap();
        assert_eq!(ledger.asset_balance(&key, "STABLEUSD").unwrap(), dec!(7));
    }
}
