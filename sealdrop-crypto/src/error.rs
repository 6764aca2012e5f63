//! Crypto error types.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors from the encryption layer.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key derivation from the configured secret failed.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Internal cipher failure during encryption. Does not occur for
    /// ordinary byte payloads.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Authentication failed on decrypt: the tag did not verify, or the
    /// stored IV/tag are malformed. Fatal for the request — never
    /// retryable, never partial plaintext.
    #[error("payload corrupted or tampered")]
    Integrity,
}
