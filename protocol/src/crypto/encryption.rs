//! # AES-256-GCM Encryption & Passphrase Key Derivation
//!
//! Wallet seeds are stored sealed with AES-256-GCM under a key derived from
//! the owner's passphrase with Argon2id. Nothing else in the platform is
//! encrypted at rest, so this module stays small.
//!
//! ## Wire format
//!
//! [`encrypt`] returns `nonce || ciphertext` as a single `Vec<u8>`. The
//! first 12 bytes are the random nonce, the rest is ciphertext plus the
//! 16-byte auth tag. [`decrypt`] expects the same layout.
//!
//! Nonces are random 96-bit values from `OsRng`. Each seed is sealed under
//! its own salt-derived key, so the birthday bound is not a concern.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use thiserror::Error;

use crate::config::{
    AES_KEY_LENGTH, AES_NONCE_LENGTH, ARGON2_ITERATIONS, ARGON2_MEMORY_KB, ARGON2_PARALLELISM,
    KDF_SALT_LENGTH,
};

/// Errors that can occur during encryption, decryption or key derivation.
///
/// "Wrong key" and "corrupted ciphertext" are deliberately the same error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncryptionError {
    #[error("encryption failed")]
    EncryptFailed,

    #[error("decryption failed -- wrong key or corrupted ciphertext")]
    DecryptFailed,

    #[error("ciphertext too short: must be at least {AES_NONCE_LENGTH} bytes")]
    CiphertextTooShort,

    #[error("key derivation failed")]
    KeyDerivationFailed,
}

/// Encrypt plaintext with AES-256-GCM under a fresh random nonce.
pub fn encrypt(key: &[u8; AES_KEY_LENGTH], plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EncryptionError::EncryptFailed)?;

    let mut nonce_bytes = [0u8; AES_NONCE_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| EncryptionError::EncryptFailed)?;

    let mut out = Vec::with_capacity(AES_NONCE_LENGTH + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt data previously produced by [`encrypt`].
pub fn decrypt(key: &[u8; AES_KEY_LENGTH], data: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    if data.len() < AES_NONCE_LENGTH {
        return Err(EncryptionError::CiphertextTooShort);
    }

    let (nonce_bytes, ciphertext) = data.split_at(AES_NONCE_LENGTH);
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EncryptionError::DecryptFailed)?;
    let nonce = Nonce::from_slice(nonce_bytes);

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| EncryptionError::DecryptFailed)
}

/// Generate a random salt for [`derive_key`].
pub fn random_salt() -> [u8; KDF_SALT_LENGTH] {
    let mut salt = [0u8; KDF_SALT_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive a 256-bit key from a passphrase with Argon2id.
///
/// The same passphrase and salt always produce the same key; a different
/// salt per sealed seed keeps identical passphrases from producing
/// identical keys.
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8; KDF_SALT_LENGTH],
) -> Result<[u8; AES_KEY_LENGTH], EncryptionError> {
    let params = Params::new(
        ARGON2_MEMORY_KB,
        ARGON2_ITERATIONS,
        ARGON2_PARALLELISM,
        Some(AES_KEY_LENGTH),
    )
    .map_err(|_| EncryptionError::KeyDerivationFailed)?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; AES_KEY_LENGTH];
    argon2
        .hash_password_into(passphrase, salt, &mut key)
        .map_err(|_| EncryptionError::KeyDerivationFailed)?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AES_TAG_LENGTH;

    fn test_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        for (i, byte) in key.iter_mut().enumerate() {
            *byte = i as u8;
        }
        key
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = test_key();
        let sealed = encrypt(&key, b"wallet seed bytes").unwrap();
        assert_eq!(decrypt(&key, &sealed).unwrap(), b"wallet seed bytes");
    }

    #[test]
    fn test_ciphertext_length() {
        let key = test_key();
        let sealed = encrypt(&key, &[0u8; 32]).unwrap();
        assert_eq!(sealed.len(), AES_NONCE_LENGTH + 32 + AES_TAG_LENGTH);
    }

    #[test]
    fn test_wrong_key_fails_decryption() {
        let key = test_key();
        let sealed = encrypt(&key, b"secret").unwrap();

        let mut wrong_key = test_key();
        wrong_key[0] ^= 0xFF;

        assert_eq!(
            decrypt(&wrong_key, &sealed),
            Err(EncryptionError::DecryptFailed)
        );
    }

    #[test]
    fn test_modified_ciphertext_fails_decryption() {
        let key = test_key();
        let mut sealed = encrypt(&key, b"secret").unwrap();
        sealed[AES_NONCE_LENGTH] ^= 0xFF;
        assert!(decrypt(&key, &sealed).is_err());
    }

    #[test]
    fn test_decrypt_too_short() {
        assert_eq!(
            decrypt(&test_key(), &[0u8; 4]),
            Err(EncryptionError::CiphertextTooShort)
        );
    }

    #[test]
    fn test_derive_key_is_deterministic_per_salt() {
        let salt = [9u8; KDF_SALT_LENGTH];
        let k1 = derive_key(b"hunter2", &salt).unwrap();
        let k2 = derive_key(b"hunter2", &salt).unwrap();
        assert_eq!(k1, k2);

        let other = derive_key(b"hunter2", &[10u8; KDF_SALT_LENGTH]).unwrap();
        assert_ne!(k1, other);
    }

    #[test]
    fn test_random_salts_differ() {
        assert_ne!(random_salt(), random_salt());
    }
}
