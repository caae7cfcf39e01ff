//! # Cryptographic Primitives
//!
//! Thin, typed wrappers around audited implementations:
//!
//! - **Ed25519** for wallet signing keys.
//! - **Argon2id** to stretch wallet passphrases into encryption keys.
//! - **AES-256-GCM** to seal wallet seeds at rest.
//!
//! Nothing here is clever, and nothing here should become clever.

pub mod encryption;
pub mod keys;

pub use encryption::{decrypt, derive_key, encrypt, EncryptionError};
pub use keys::{verify_hex, KeyError, SigningSecret};
