//! # First-Loss Guarantees
//!
//! A guarantor pledges capital that absorbs the first losses on a project.
//! Registering the pledge records which credential backs it and how much
//! was pledged. Moving the money is the escrow replenisher's job.

use std::sync::Arc;

use rust_decimal::Decimal;

use solarfund_protocol::model::{Entity, Role};
use solarfund_protocol::storage::Repository;
use solarfund_protocol::vault::CredentialRef;

use crate::authorization::require_role;
use crate::error::GuaranteeError;

/// Records first-loss pledges on guarantor entities.
pub struct GuarantorRegistry {
    repo: Arc<dyn Repository>,
}

impl GuarantorRegistry {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    /// Attach a first-loss pledge to `entity` and persist it.
    ///
    /// Registering the same pledge twice leaves the record as it was after
    /// the first call. A later call with different values replaces the
    /// earlier pledge.
    ///
    /// # Errors
    ///
    /// - [`GuaranteeError::Authorization`] if `entity` is not a guarantor.
    /// - [`GuaranteeError::InvalidAmount`] if `amount` is negative.
    /// - [`GuaranteeError::Storage`] if the record could not be saved; the
    ///   caller's `entity` is left untouched in that case.
    pub fn register_first_loss_guarantee(
        &self,
        entity: &mut Entity,
        credential: CredentialRef,
        amount: Decimal,
    ) -> Result<(), GuaranteeError> {
        require_role(entity, Role::Guarantor)?;
        if amount < Decimal::ZERO {
            return Err(GuaranteeError::InvalidAmount(amount));
        }

        let mut updated = entity.clone();
        updated.first_loss_guarantee = Some(credential);
        updated.first_loss_guarantee_amt = amount;
        self.repo.save_entity(&updated)?;
        *entity = updated;

        tracing::info!(entity = entity.index(), %amount, "first-loss guarantee registered");
        Ok(())
    }
}
