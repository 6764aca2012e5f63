//! Document lifecycle and exchange orchestration for Sealdrop.
//!
//! Two layers live here:
//!
//! - [`DocumentLifecycle`] owns the document state machine: access-policy
//!   evaluation, view accounting, and view/expiry-driven destruction. It
//!   is the only code that mutates document metadata, and it never
//!   encrypts or decrypts anything.
//! - [`DocumentExchange`] is the orchestration surface consumed by the
//!   transport layer: upload (encrypt, store blob, create record),
//!   download (access check, decrypt, account the view, apply the
//!   destruction policy), metadata reads, sender-initiated deletion, and
//!   the expiry sweep.
//!
//! A document has exactly two states: Active and Destroyed. Destruction
//! removes the metadata record and the ciphertext blob; it is evaluated
//! synchronously on every recipient view and periodically by [`Sweeper`].

mod config;
mod error;
mod exchange;
mod lifecycle;
mod sweeper;

pub use config::ExchangeConfig;
pub use error::{ExchangeError, ExchangeResult};
pub use exchange::{Delivered, DocumentExchange, UploadRequest};
pub use lifecycle::{evaluate_access, DocumentLifecycle};
pub use sweeper::Sweeper;
