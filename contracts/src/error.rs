//! Error type shared by every engine operation.

use rust_decimal::Decimal;
use thiserror::Error;

use solarfund_protocol::config::ConfigError;
use solarfund_protocol::ledger::LedgerError;
use solarfund_protocol::model::Role;
use solarfund_protocol::storage::DbError;
use solarfund_protocol::vault::VaultError;

/// Why a guarantee-engine operation failed.
///
/// Variants map one-to-one onto what the caller can do about it: fix the
/// request, retry later, or give up. Underlying causes are chained through
/// [`std::error::Error::source`], never flattened into the message.
#[derive(Debug, Error)]
pub enum GuaranteeError {
    /// The acting entity lacks the capability the operation requires.
    #[error("entity {index} is not authorized: missing role {role}")]
    Authorization {
        /// Account index of the entity.
        index: u32,
        /// Role the operation required.
        role: Role,
    },

    /// A record referenced by index does not exist.
    #[error("{kind} {index} not found")]
    NotFound {
        /// Record type, e.g. `"project"`.
        kind: &'static str,
        index: u32,
    },

    /// A balance query against the ledger failed.
    #[error("ledger balance query failed")]
    LedgerQuery(#[source] LedgerError),

    /// The wallet secret could not be unsealed. No transfer was attempted.
    #[error("could not unlock wallet credentials")]
    Credential(#[source] VaultError),

    /// The ledger refused or failed the transfer. Nothing was moved.
    #[error("transaction submission failed")]
    TransactionSubmission(#[source] LedgerError),

    /// After withholding the fee reserve, nothing would be left to send.
    #[error("insufficient funds: balance {balance} does not cover fee reserve {fee_reserve}")]
    InsufficientFunds {
        balance: Decimal,
        fee_reserve: Decimal,
    },

    /// Amounts that must be positive (or non-negative) were not.
    #[error("invalid amount {0}")]
    InvalidAmount(Decimal),

    /// Applying the amount would exceed the range of a `Decimal`. The
    /// record was left unchanged.
    #[error("{field} would overflow applying {amount}")]
    Overflow {
        /// Record field being updated, e.g. `"voting_balance"`.
        field: &'static str,
        amount: Decimal,
    },

    /// Reading or writing a record failed.
    #[error("storage failure")]
    Storage(#[from] DbError),

    /// The engine was constructed with an unusable configuration.
    #[error("invalid engine configuration")]
    Config(#[from] ConfigError),
}

impl GuaranteeError {
    /// Returns `true` when retrying the same call later might succeed.
    ///
    /// Submission failures are deliberately excluded: the caller must
    /// check the ledger first, since a lost answer is not a lost transfer.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GuaranteeError::LedgerQuery(LedgerError::Unreachable(_)) | GuaranteeError::Storage(_)
        )
    }
}
