//! Master key derivation and handling.
//!
//! The master key is derived once at startup and treated as immutable,
//! read-only process-wide state from then on. Key material is zeroized
//! on drop and never exposed through `Debug`.

use crate::error::{CryptoError, CryptoResult};
use rand::RngCore;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Key size in bytes (AES-256).
pub const KEY_SIZE: usize = 32;

/// Fixed KDF salt. Acceptable for deriving a single-tenant master key;
/// NOT suitable for multi-tenant key separation.
const KDF_SALT: &[u8] = b"sealdrop-master-key-v1";

/// The process-wide 256-bit master key.
///
/// Zeroized when dropped. The `Debug` implementation is redacted so the
/// key can never leak through logging.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey([u8; KEY_SIZE]);

impl MasterKey {
    /// Wraps raw key bytes (for tests and key-handoff paths).
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Access the raw key bytes (crate-internal only).
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey([REDACTED])")
    }
}

/// Derives the 256-bit master key from an arbitrary-length secret using
/// Argon2id with a fixed salt. Deterministic: the same secret always
/// yields the same key, so documents encrypted before a restart remain
/// decryptable as long as the secret is persisted.
pub fn derive_master_key(secret: &str) -> CryptoResult<MasterKey> {
    let mut out = [0u8; KEY_SIZE];
    argon2::Argon2::default()
        .hash_password_into(secret.as_bytes(), KDF_SALT, &mut out)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(MasterKey(out))
}

/// Generates a random secret for development use only.
///
/// A key derived from a generated secret dies with the process: every
/// document encrypted under it becomes permanently undecryptable after a
/// restart. Production deployments must configure a persisted secret.
pub fn generate_dev_secret() -> String {
    let mut bytes = [0u8; KEY_SIZE];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let a = derive_master_key("correct horse battery staple").unwrap();
        let b = derive_master_key("correct horse battery staple").unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_secrets_yield_different_keys() {
        let a = derive_master_key("secret-one").unwrap();
        let b = derive_master_key("secret-two").unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn debug_is_redacted() {
        let key = derive_master_key("s3cret").unwrap();
        assert_eq!(format!("{key:?}"), "MasterKey([REDACTED])");
    }

    #[test]
    fn dev_secrets_are_unique() {
        assert_ne!(generate_dev_secret(), generate_dev_secret());
    }
}
