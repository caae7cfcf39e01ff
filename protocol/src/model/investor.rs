//! # Investors
//!
//! `voting_balance` and `amount_invested` are private. They change only
//! through [`Investor::adjust_voting`] and [`Investor::add_investment`],
//! which the engine's voting and bookkeeping operations call before
//! persisting. Both use checked arithmetic and leave the record untouched
//! when the result would not fit in a `Decimal`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::account::Account;
use crate::config::NEVER_INVESTED;

/// Attestation details for an investor acting on behalf of a company.
/// Inert data: the engine stores it and never interprets it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub company_type: String,
    pub name: String,
    pub legal_name: String,
    pub admin_email: String,
    pub phone_number: String,
    pub address: String,
    pub country: String,
    pub city: String,
    pub zip_code: String,
    pub tax_id_number: String,
    /// The investor's role inside the company.
    pub role: String,
}

/// A participant who funds projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investor {
    /// Base account.
    pub account: Account,
    /// Governance weight. Never negative.
    voting_balance: Decimal,
    /// Total invested, or [`NEVER_INVESTED`] before the first order.
    amount_invested: Decimal,
    /// Project asset identifiers invested in, in order.
    pub invested_projects: Vec<String>,
    /// Project indices invested in, in order.
    pub invested_project_indices: Vec<u32>,
    /// Whether the investor acts on behalf of a company.
    pub acts_for_company: bool,
    /// Company attestation, when provided.
    pub company: Option<Company>,
    /// Seed-round project asset identifiers. Carried for imported records;
    /// the engine never writes them.
    #[serde(default)]
    pub seed_invested_projects: Vec<String>,
    /// Seed-round project indices, parallel to `seed_invested_projects`.
    #[serde(default)]
    pub seed_invested_project_indices: Vec<u32>,
}

impl Investor {
    /// A new investor who has never invested.
    pub fn new(account: Account) -> Self {
        Self {
            account,
            voting_balance: Decimal::ZERO,
            amount_invested: NEVER_INVESTED,
            invested_projects: Vec::new(),
            invested_project_indices: Vec::new(),
            acts_for_company: false,
            company: None,
            seed_invested_projects: Vec::new(),
            seed_invested_project_indices: Vec::new(),
        }
    }

    pub fn voting_balance(&self) -> Decimal {
        self.voting_balance
    }

    /// Total invested, or [`NEVER_INVESTED`].
    pub fn amount_invested(&self) -> Decimal {
        self.amount_invested
    }

    /// Add `delta` to the voting balance, flooring at zero.
    ///
    /// Returns the new balance, or `None` (and changes nothing) if the sum
    /// overflows.
    pub fn adjust_voting(&mut self, delta: Decimal) -> Option<Decimal> {
        let sum = self.voting_balance.checked_add(delta)?;
        self.voting_balance = sum.max(Decimal::ZERO);
        Some(self.voting_balance)
    }

    /// Append an investment of `amount` in `project_asset` / `project_index`.
    ///
    /// The never-invested sentinel counts as zero. Returns the new total, or
    /// `None` (and changes nothing) if the sum overflows.
    pub fn add_investment(
        &mut self,
        project_index: u32,
        project_asset: &str,
        amount: Decimal,
    ) -> Option<Decimal> {
        let base = if self.has_invested() {
            self.amount_invested
        } else {
            Decimal::ZERO
        };
        self.amount_invested = base.checked_add(amount)?;
        self.invested_projects.push(project_asset.to_string());
        self.invested_project_indices.push(project_index);
        Some(self.amount_invested)
    }

    /// `false` while `amount_invested` still holds the sentinel.
    pub fn has_invested(&self) -> bool {
        self.amount_invested != NEVER_INVESTED
    }

    pub fn index(&self) -> u32 {
        self.account.index
    }
}
