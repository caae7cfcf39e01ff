// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # SolarFund Protocol — Core Library
//!
//! Shared building blocks for the SolarFund guarantee engine: the platform
//! records, the way they are persisted, and the narrow contracts the engine
//! has with the outside world (ledger network, credential custody, price
//! feed).
//!
//! ## Architecture
//!
//! - **config** — Network mode, engine parameters and platform constants.
//! - **crypto** — Ed25519 signing secrets, Argon2id + AES-256-GCM sealing.
//! - **vault** — Sealed wallet seeds and the credential vault contract.
//! - **ledger** — The ledger client contract and a sled-backed sandbox.
//! - **oracle** — Native-to-stablecoin price estimates.
//! - **model** — Accounts, entities, investors, projects, public views.
//! - **storage** — The repository contract and its sled implementation.
//!
//! The engine itself lives in the `solarfund-contracts` crate. Nothing in
//! this crate decides policy; it only stores, seals and transports.

pub mod config;
pub mod crypto;
pub mod ledger;
pub mod model;
pub mod oracle;
pub mod storage;
pub mod vault;
