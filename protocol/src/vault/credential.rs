//! # Credential Handles
//!
//! A guarantor's first-loss pledge is backed by a credential, but the
//! record must never hold that credential in a usable form. A
//! [`CredentialRef`] is an opaque handle issued by whichever custody system
//! backs the pledge. The engine only stores it and hands it back; it never
//! interprets, prints or logs its contents.

use serde::{Deserialize, Serialize};

/// Opaque reference to a credential held by an external custody system.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialRef(String);

impl CredentialRef {
    /// Wraps a handle issued by the custody system.
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    /// The raw handle, for passing back to the custody system.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the handle is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for CredentialRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CredentialRef(<redacted>)")
    }
}

impl std::fmt::Display for CredentialRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<redacted>")
    }
}
