//! Encryption layer for Sealdrop.
//!
//! Provides per-document at-rest encryption using:
//! - Argon2id for deriving the process-wide master key from a configured secret
//! - AES-256-GCM for authenticated encryption with a detached tag
//! - Obfuscated storage names for ciphertext blobs
//!
//! # Architecture
//!
//! A single 256-bit master key is derived once at startup and shared
//! read-only for the life of the process. Every `encrypt` call draws a
//! fresh random 128-bit IV, so identical plaintexts never produce
//! identical ciphertexts. The IV and the GCM authentication tag are
//! returned hex-encoded for storage alongside document metadata — they
//! are never embedded in the ciphertext blob itself.
//!
//! This module knows nothing about documents, users, or storage.

mod cipher;
mod error;
mod key;
mod naming;

pub use cipher::{decrypt, encrypt, EncryptedPayload, IV_SIZE, TAG_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use key::{derive_master_key, generate_dev_secret, MasterKey, KEY_SIZE};
pub use naming::obfuscate_name;
