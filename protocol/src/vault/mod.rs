//! # Vault Module — Credential Custody
//!
//! The vault is the only place where a wallet's signing secret comes back
//! to life. The engine hands it an [`EncryptedSeed`] and the passphrase the
//! caller supplied; the vault returns a [`SigningSecret`] or refuses.
//!
//! ```text
//! seed.rs        — EncryptedSeed: the at-rest form of a wallet seed
//! credential.rs  — CredentialRef: opaque handle backing a first-loss pledge
//! mod.rs         — CredentialVault trait + SeedVault (Argon2id + AES-256-GCM)
//! ```
//!
//! The trait exists so the engine can run against an HSM or a remote
//! custody service without caring which one it is.

pub mod credential;
pub mod seed;

pub use credential::CredentialRef;
pub use seed::EncryptedSeed;

use thiserror::Error;

use crate::crypto::encryption::{self, EncryptionError};
use crate::crypto::keys::SigningSecret;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned when a sealed seed cannot be opened.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VaultError {
    /// Authentication failed: wrong passphrase or tampered ciphertext.
    /// AES-GCM cannot tell the two apart, and neither do we.
    #[error("could not unseal wallet seed (wrong passphrase or tampered seed)")]
    WrongPassphrase,

    /// The stored record is structurally broken (bad hex, bad lengths).
    #[error("sealed wallet seed is corrupt: {0}")]
    CorruptSeed(&'static str),

    /// The passphrase was empty. Refused before spending time on Argon2.
    #[error("empty passphrase")]
    EmptyPassphrase,

    /// Key derivation or encryption failed for a reason unrelated to input.
    #[error("crypto failure: {0}")]
    Crypto(#[from] EncryptionError),
}

// ---------------------------------------------------------------------------
// CredentialVault
// ---------------------------------------------------------------------------

/// Turns a sealed seed plus a passphrase into a usable signing secret.
pub trait CredentialVault: Send + Sync {
    /// Unseal `seed` with `passphrase`.
    ///
    /// # Errors
    ///
    /// Any [`VaultError`]. Implementations must never return a secret that
    /// was not authenticated against the passphrase.
    fn decrypt_seed(
        &self,
        seed: &EncryptedSeed,
        passphrase: &str,
    ) -> Result<SigningSecret, VaultError>;
}

/// Local vault: Argon2id key derivation plus AES-256-GCM sealing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeedVault;

impl SeedVault {
    pub fn new() -> Self {
        Self
    }

    /// Seal a wallet secret under `passphrase` with a fresh salt.
    ///
    /// This is the inverse of [`CredentialVault::decrypt_seed`] and is what
    /// the account-creation collaborator calls when it provisions a wallet.
    pub fn seal(
        &self,
        secret: &SigningSecret,
        passphrase: &str,
    ) -> Result<EncryptedSeed, VaultError> {
        if passphrase.is_empty() {
            return Err(VaultError::EmptyPassphrase);
        }
        let salt = encryption::random_salt();
        let key = encryption::derive_key(passphrase.as_bytes(), &salt)?;
        let sealed = encryption::encrypt(&key, &secret.seed_bytes())?;
        Ok(EncryptedSeed {
            salt: hex::encode(salt),
            sealed: hex::encode(sealed),
        })
    }
}

impl CredentialVault for SeedVault {
    fn decrypt_seed(
        &self,
        seed: &EncryptedSeed,
        passphrase: &str,
    ) -> Result<SigningSecret, VaultError> {
        if passphrase.is_empty() {
            return Err(VaultError::EmptyPassphrase);
        }
        let salt = seed
            .salt_bytes()
            .ok_or(VaultError::CorruptSeed("salt is not 16 hex-encoded bytes"))?;
        let sealed = seed
            .sealed_bytes()
            .ok_or(VaultError::CorruptSeed("payload is not hex"))?;

        let key = encryption::derive_key(passphrase.as_bytes(), &salt)?;
        let plaintext = match encryption::decrypt(&key, &sealed) {
            Ok(bytes) => bytes,
            Err(EncryptionError::CiphertextTooShort) => {
                return Err(VaultError::CorruptSeed("payload is truncated"))
            }
            Err(_) => return Err(VaultError::WrongPassphrase),
        };

        SigningSecret::try_from_slice(&plaintext)
            .map_err(|_| VaultError::CorruptSeed("unsealed seed has the wrong length"))
    }
}
