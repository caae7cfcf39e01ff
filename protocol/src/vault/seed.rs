//! # Sealed Wallet Seeds
//!
//! An [`EncryptedSeed`] is what the repository stores next to a wallet's
//! public key. It is the Ed25519 seed sealed with AES-256-GCM under an
//! Argon2id key derived from the owner's passphrase and a per-seed salt.
//!
//! Both fields are hex strings so records stay readable in JSON dumps.

use serde::{Deserialize, Serialize};

use crate::config::KDF_SALT_LENGTH;

/// A wallet seed sealed under a passphrase-derived key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedSeed {
    /// Hex-encoded Argon2id salt.
    pub salt: String,
    /// Hex-encoded `nonce || ciphertext || tag`.
    pub sealed: String,
}

impl EncryptedSeed {
    /// Decodes the salt, returning `None` when it is malformed.
    pub fn salt_bytes(&self) -> Option<[u8; KDF_SALT_LENGTH]> {
        let bytes = hex::decode(&self.salt).ok()?;
        bytes.as_slice().try_into().ok()
    }

    /// Decodes the sealed payload, returning `None` when it is not hex.
    pub fn sealed_bytes(&self) -> Option<Vec<u8>> {
        hex::decode(&self.sealed).ok()
    }
}

impl std::fmt::Debug for EncryptedSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Sealed bytes are safe to print, but they are long and useless in logs.
        write!(f, "EncryptedSeed({} bytes)", self.sealed.len() / 2)
    }
}
