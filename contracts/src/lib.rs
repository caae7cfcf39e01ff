//! # SolarFund Guarantee Engine
//!
//! The financial rules around first-loss guarantors and investors:
//!
//! - **Guarantor** — registering first-loss pledges on guarantor entities.
//! - **Escrow** — moving guarantor funds into project escrow accounts,
//!   clamped to what the wallet can cover.
//! - **Admission** — deciding whether an investor can cover an order.
//! - **Voting** — governance weight, floored at zero.
//! - **Bookkeeping** — investment history and company attestations.
//!
//! ## Design Principles
//!
//! 1. Capabilities are roles, checked by one function before anything else.
//! 2. Every operation takes already-loaded records and returns `Result`;
//!    failures never leave a half-updated record behind.
//! 3. The engine holds no secrets. Wallet seeds are unsealed per call and
//!    dropped when the call returns.
//! 4. Amounts are decimals, never floats.

pub mod admission;
pub mod authorization;
pub mod bookkeeping;
pub mod engine;
pub mod error;
pub mod escrow;
pub mod guarantor;
pub mod voting;

#[cfg(test)]
mod testing;

pub use admission::AdmissionControl;
pub use authorization::require_role;
pub use bookkeeping::InvestorBook;
pub use engine::GuaranteeEngine;
pub use error::GuaranteeError;
pub use escrow::{
    clamp_transfer_amount, EscrowReplenisher, ReplenishmentReceipt, TransferPlan, WalletLocks,
};
pub use guarantor::GuarantorRegistry;
pub use voting::VotingLedger;
