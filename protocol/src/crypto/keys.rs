//! # Wallet Signing Keys
//!
//! Every custodial wallet on the platform is an Ed25519 keypair. The secret
//! half only ever exists in memory as a [`SigningSecret`], produced by the
//! credential vault when a caller supplies the right passphrase, and dropped
//! as soon as the ledger has the signed transfer.
//!
//! Public keys travel around as lowercase hex strings. That is what the
//! repository stores in `Wallet::public_key`, what the ledger indexes
//! balances by, and what escrow accounts are addressed with.
//!
//! ## Security considerations
//!
//! - Secret bytes are zeroized on drop (ed25519-dalek does this for us).
//! - `SigningSecret` is not `Serialize` and its `Debug` prints only the
//!   public key. Persisting a secret has to go through the vault.
//! - Key bytes are never logged.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use std::fmt;
use thiserror::Error;

use crate::config::SEED_LENGTH;

/// Errors that can occur during key operations.
///
/// Kept vague on purpose: error messages about key material are a gift
/// to whoever is reading the logs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid seed bytes: expected {SEED_LENGTH} bytes")]
    InvalidSeed,

    #[error("invalid public key: not a hex-encoded Ed25519 point")]
    InvalidPublicKey,
}

/// The decrypted signing secret of a custodial wallet.
pub struct SigningSecret {
    signing_key: SigningKey,
}

impl SigningSecret {
    /// Generate a fresh secret from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Rebuild a secret from its 32-byte seed. In Ed25519 the seed *is*
    /// the secret key.
    pub fn from_seed(seed: &[u8; SEED_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Length-checked variant of [`from_seed`](Self::from_seed) for bytes
    /// coming out of a decryption.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        let seed: &[u8; SEED_LENGTH] = bytes.try_into().map_err(|_| KeyError::InvalidSeed)?;
        Ok(Self::from_seed(seed))
    }

    /// Raw seed bytes. Only the vault should need this, to seal a seed.
    pub fn seed_bytes(&self) -> [u8; SEED_LENGTH] {
        self.signing_key.to_bytes()
    }

    /// Hex-encoded public key: the wallet's address on the ledger.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message. Ed25519 signatures are deterministic.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl Clone for SigningSecret {
    fn clone(&self) -> Self {
        Self::from_seed(&self.signing_key.to_bytes())
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningSecret(pub={})", self.public_key_hex())
    }
}

/// Checks that `public_key_hex` decodes to a valid Ed25519 point.
pub fn validate_public_key(public_key_hex: &str) -> Result<(), KeyError> {
    decode_public_key(public_key_hex).map(|_| ())
}

/// Verify `signature` over `message` against a hex-encoded public key.
///
/// Returns `false` for malformed keys as well as bad signatures; callers
/// only want a yes/no answer.
pub fn verify_hex(public_key_hex: &str, message: &[u8], signature: &[u8; 64]) -> bool {
    let Ok(verifying_key) = decode_public_key(public_key_hex) else {
        return false;
    };
    verifying_key
        .verify(message, &Signature::from_bytes(signature))
        .is_ok()
}

fn decode_public_key(public_key_hex: &str) -> Result<VerifyingKey, KeyError> {
    let bytes = hex::decode(public_key_hex).map_err(|_| KeyError::InvalidPublicKey)?;
    let arr: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| KeyError::InvalidPublicKey)?;
    VerifyingKey::from_bytes(&arr).map_err(|_| KeyError::InvalidPublicKey)
}
