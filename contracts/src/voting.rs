//! Investor governance weight.

use std::sync::Arc;

use rust_decimal::Decimal;

use solarfund_protocol::model::Investor;
use solarfund_protocol::storage::Repository;

use crate::error::GuaranteeError;

/// Adjusts and persists investor voting balances.
pub struct VotingLedger {
    repo: Arc<dyn Repository>,
}

impl VotingLedger {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    /// Add `delta` (which may be negative) to the investor's voting balance,
    /// flooring the result at zero, and persist. Returns the new balance.
    ///
    /// The record is written even when the balance does not change.
    ///
    /// # Errors
    ///
    /// [`GuaranteeError::Overflow`] if the sum does not fit in a `Decimal`.
    /// Nothing is written in that case.
    pub fn adjust_voting_balance(
        &self,
        investor: &mut Investor,
        delta: Decimal,
    ) -> Result<Decimal, GuaranteeError> {
        let mut updated = investor.clone();
        let balance = updated
            .adjust_voting(delta)
            .ok_or(GuaranteeError::Overflow {
                field: "voting_balance",
                amount: delta,
            })?;
        self.repo.save_investor(&updated)?;
        *investor = updated;

        tracing::debug!(
            investor = investor.index(),
            %delta,
            %balance,
            "voting balance adjusted"
        );
        Ok(balance)
    }
}
