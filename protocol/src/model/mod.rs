//! # Platform Records
//!
//! The records the engine reads and mutates. They are created by the
//! account-provisioning side of the platform and persisted through the
//! [`Repository`](crate::storage::Repository); the engine only ever mutates
//! them through its own operations.
//!
//! ```text
//! account.rs  — Account + Wallet: the base every participant shares
//! entity.rs   — Entity + Role: developers, contractors, guarantors
//! investor.rs — Investor + Company
//! project.rs  — Project: the escrow target, read-only here
//! public.rs   — sanitised views safe to hand to public endpoints
//! ```

pub mod account;
pub mod entity;
pub mod investor;
pub mod project;
pub mod public;

pub use account::{Account, Wallet};
pub use entity::{Entity, Role};
pub use investor::{Company, Investor};
pub use project::Project;
pub use public::{PublicEntity, PublicInvestor};
