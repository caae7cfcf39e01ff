//! # Public Views
//!
//! Sanitised projections of platform records for public listings. They
//! carry nothing that could help move funds or identify a company: no
//! sealed seeds, no credential handles, no voting weight, no company data.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, Role};
use super::investor::Investor;

/// Public view of an investor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicInvestor {
    pub name: String,
    pub invested_projects: Vec<String>,
    pub amount_invested: Decimal,
    pub public_key: String,
    pub reputation: Decimal,
}

impl From<&Investor> for PublicInvestor {
    fn from(investor: &Investor) -> Self {
        Self {
            name: investor.account.name.clone(),
            invested_projects: investor.invested_projects.clone(),
            amount_invested: investor.amount_invested(),
            public_key: investor.account.wallet.public_key.clone(),
            reputation: investor.account.reputation,
        }
    }
}

/// Public view of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicEntity {
    pub name: String,
    pub public_key: String,
    pub roles: Vec<Role>,
    pub reputation: Decimal,
    /// Pledged first-loss amount; zero for non-guarantors.
    pub first_loss_guarantee_amt: Decimal,
}

impl From<&Entity> for PublicEntity {
    fn from(entity: &Entity) -> Self {
        let pledged = if entity.has_role(Role::Guarantor) {
            entity.first_loss_guarantee_amt
        } else {
            Decimal::ZERO
        };
        Self {
            name: entity.account.name.clone(),
            public_key: entity.account.wallet.public_key.clone(),
            roles: entity.roles.iter().copied().collect(),
            reputation: entity.account.reputation,
            first_loss_guarantee_amt: pledged,
        }
    }
}
