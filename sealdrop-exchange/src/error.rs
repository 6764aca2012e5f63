//! Exchange error types.
//!
//! Policy denials carry a [`DenyReason`] the transport maps to a
//! user-facing rejection; they are expected outcomes, distinct from the
//! genuine failure variants. Integrity failures deliberately render as a
//! generic "corrupted or tampered" message — cryptographic internals
//! never reach the requester.

use sealdrop_blobstore::BlobStoreError;
use sealdrop_crypto::CryptoError;
use sealdrop_storage::StorageError;
use sealdrop_types::DenyReason;
use thiserror::Error;

/// Result type for exchange operations.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// Errors surfaced by the exchange and lifecycle layers.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("document not found: {0}")]
    NotFound(String),

    /// Access or destruction policy denied the request.
    #[error("{0}")]
    Denied(DenyReason),

    /// Ciphertext failed authentication on decrypt.
    #[error("document corrupted or tampered")]
    Integrity,

    /// Master key could not be derived at startup.
    #[error("key setup failed: {0}")]
    KeySetup(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<StorageError> for ExchangeError {
    fn from(e: StorageError) -> Self {
        ExchangeError::Storage(e.to_string())
    }
}

impl From<BlobStoreError> for ExchangeError {
    fn from(e: BlobStoreError) -> Self {
        ExchangeError::Storage(e.to_string())
    }
}

impl From<CryptoError> for ExchangeError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::Integrity => ExchangeError::Integrity,
            CryptoError::KeyDerivation(msg) => ExchangeError::KeySetup(msg),
            CryptoError::Encryption(msg) => ExchangeError::Storage(msg),
        }
    }
}
