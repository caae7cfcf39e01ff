//! # Entities and Roles
//!
//! An entity is any non-investor participant: developers, contractors,
//! originators and guarantors. What an entity may do is decided by the
//! [`Role`]s it holds, checked in one place by the engine's authorization
//! function, never by ad-hoc flag reads scattered through operations.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::account::Account;
use crate::vault::CredentialRef;

/// Capabilities an account can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Plain project entity (developer, contractor, originator).
    Entity,
    /// May post first-loss capital and replenish escrow accounts.
    Guarantor,
    /// May place investment orders.
    Investor,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Entity => write!(f, "entity"),
            Role::Guarantor => write!(f, "guarantor"),
            Role::Investor => write!(f, "investor"),
        }
    }
}

/// A project-side participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Base account.
    pub account: Account,
    /// Roles granted to this entity.
    pub roles: BTreeSet<Role>,
    /// Credential backing the first-loss pledge. Opaque; never logged.
    pub first_loss_guarantee: Option<CredentialRef>,
    /// Pledged first-loss amount. Only meaningful for guarantors.
    pub first_loss_guarantee_amt: Decimal,
}

impl Entity {
    /// A plain entity holding only [`Role::Entity`].
    pub fn new(account: Account) -> Self {
        Self {
            account,
            roles: BTreeSet::from([Role::Entity]),
            first_loss_guarantee: None,
            first_loss_guarantee_amt: Decimal::ZERO,
        }
    }

    /// An entity that also holds [`Role::Guarantor`].
    pub fn guarantor(account: Account) -> Self {
        let mut entity = Self::new(account);
        entity.grant(Role::Guarantor);
        entity
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Grants `role`. Returns `false` if it was already held.
    pub fn grant(&mut self, role: Role) -> bool {
        self.roles.insert(role)
    }

    /// Revokes `role`. Returns `false` if it was not held.
    pub fn revoke(&mut self, role: Role) -> bool {
        self.roles.remove(&role)
    }

    pub fn index(&self) -> u32 {
        self.account.index
    }
}
