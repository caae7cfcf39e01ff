//! # Investor Bookkeeping
//!
//! Records what an investor has put into which project, and whether they
//! act for a company. These are plain record updates; the money itself has
//! already moved by the time they are called.

use std::sync::Arc;

use rust_decimal::Decimal;

use solarfund_protocol::model::{Company, Investor};
use solarfund_protocol::storage::Repository;

use crate::error::GuaranteeError;

/// Persists investment history and company attestations.
pub struct InvestorBook {
    repo: Arc<dyn Repository>,
}

impl InvestorBook {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    /// Add a completed investment to the investor's history.
    ///
    /// The never-invested sentinel is treated as zero, so the first
    /// investment of `x` leaves `amount_invested == x`.
    ///
    /// # Errors
    ///
    /// [`GuaranteeError::InvalidAmount`] if `amount` is not positive,
    /// [`GuaranteeError::Overflow`] if the new total does not fit.
    pub fn record_investment(
        &self,
        investor: &mut Investor,
        project_index: u32,
        project_asset: &str,
        amount: Decimal,
    ) -> Result<(), GuaranteeError> {
        if amount <= Decimal::ZERO {
            return Err(GuaranteeError::InvalidAmount(amount));
        }

        let mut updated = investor.clone();
        let total = updated
            .add_investment(project_index, project_asset, amount)
            .ok_or(GuaranteeError::Overflow {
                field: "amount_invested",
                amount,
            })?;
        self.repo.save_investor(&updated)?;
        *investor = updated;

        tracing::info!(
            investor = investor.index(),
            project = project_index,
            %amount,
            %total,
            "investment recorded"
        );
        Ok(())
    }

    /// Mark the investor as acting on behalf of a company.
    pub fn set_company(&self, investor: &mut Investor) -> Result<(), GuaranteeError> {
        let mut updated = investor.clone();
        updated.acts_for_company = true;
        self.repo.save_investor(&updated)?;
        *investor = updated;
        Ok(())
    }

    /// Store the company attestation. Replaces any earlier one.
    pub fn set_company_details(
        &self,
        investor: &mut Investor,
        company: Company,
    ) -> Result<(), GuaranteeError> {
        let mut updated = investor.clone();
        updated.company = Some(company);
        self.repo.save_investor(&updated)?;
        *investor = updated;
        Ok(())
    }
}
