//! Shared types for the Sealdrop document exchange.
//!
//! The central entity is [`Document`]: one encrypted file sent from one
//! user to another, carrying its own destruction policy (view limit and/or
//! expiry timestamp). Everything here is plain data — no I/O, no crypto.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A document record as persisted in the metadata store.
///
/// All fields except `view_count` are immutable after creation. The
/// ciphertext itself lives in the content store under `storage_ref`;
/// the IV and auth tag needed to decrypt it are stored here, never
/// inside the blob.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique id (uuid v4), assigned at creation.
    pub id: String,
    /// Original human-readable filename, used only for display and
    /// download headers.
    pub filename: String,
    /// Obfuscated name of the ciphertext blob in the content store.
    pub storage_ref: String,
    pub mime_type: String,
    /// Plaintext size in bytes, captured at upload time.
    pub size: i64,
    pub sender_id: String,
    pub recipient_id: String,
    /// Hex-encoded 128-bit initialization vector.
    pub encryption_iv: String,
    /// Hex-encoded 128-bit GCM authentication tag.
    pub encryption_auth_tag: String,
    /// Number of recipient views recorded so far. Starts at 0,
    /// monotonically non-decreasing.
    pub view_count: i64,
    /// Maximum recipient views before self-destruction. `None` = unlimited.
    pub view_limit: Option<i64>,
    /// Absolute expiry timestamp (epoch ms). `None` = never expires.
    pub expires_at: Option<i64>,
    /// Creation timestamp (epoch ms).
    pub created_at: i64,
}

/// Creation payload for a new document record.
///
/// The store assigns `id`, `created_at`, and the initial `view_count`.
/// Policy validation (e.g. `view_limit > 0`) belongs to the caller.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewDocument {
    pub filename: String,
    pub storage_ref: String,
    pub mime_type: String,
    pub size: i64,
    pub sender_id: String,
    pub recipient_id: String,
    pub encryption_iv: String,
    pub encryption_auth_tag: String,
    pub view_limit: Option<i64>,
    pub expires_at: Option<i64>,
}

/// Caller-facing projection of a document.
///
/// This is the only shape rendered to external callers: it omits
/// `storage_ref` and the encryption parameters, which exist solely for
/// the decrypt path.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DocumentMeta {
    pub id: String,
    pub filename: String,
    pub mime_type: String,
    pub size: i64,
    pub sender_id: String,
    pub recipient_id: String,
    pub view_count: i64,
    pub view_limit: Option<i64>,
    pub expires_at: Option<i64>,
    pub created_at: i64,
}

impl From<&Document> for DocumentMeta {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            filename: doc.filename.clone(),
            mime_type: doc.mime_type.clone(),
            size: doc.size,
            sender_id: doc.sender_id.clone(),
            recipient_id: doc.recipient_id.clone(),
            view_count: doc.view_count,
            view_limit: doc.view_limit,
            expires_at: doc.expires_at,
            created_at: doc.created_at,
        }
    }
}

/// Outcome of an access-policy evaluation.
///
/// A denial is a normal, expected outcome — not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny(DenyReason),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow)
    }
}

/// Reason a request was denied by the access or destruction policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// The requester is neither the sender nor the recipient.
    NotParticipant,
    /// The document's expiry timestamp has passed.
    Expired,
    /// The recipient has exhausted the view limit.
    ViewLimitReached,
    /// Only the sender may delete a document.
    NotSender,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::NotParticipant => {
                write!(f, "you do not have permission to access this document")
            }
            DenyReason::Expired => write!(f, "document has expired"),
            DenyReason::ViewLimitReached => write!(f, "view limit has been reached"),
            DenyReason::NotSender => write!(f, "only the sender can delete this document"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> Document {
        Document {
            id: "doc-1".into(),
            filename: "report.pdf".into(),
            storage_ref: "1700000000000-abcd.pdf.enc".into(),
            mime_type: "application/pdf".into(),
            size: 1024,
            sender_id: "alice".into(),
            recipient_id: "bob".into(),
            encryption_iv: "00".repeat(16),
            encryption_auth_tag: "ff".repeat(16),
            view_count: 0,
            view_limit: Some(3),
            expires_at: None,
            created_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn meta_projection_omits_crypto_parameters() {
        let meta = DocumentMeta::from(&sample_document());
        let json = serde_json::to_value(&meta).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("encryption_iv"));
        assert!(!obj.contains_key("encryption_auth_tag"));
        assert!(!obj.contains_key("storage_ref"));
        assert_eq!(obj["filename"], "report.pdf");
    }

    #[test]
    fn deny_reasons_render_without_internals() {
        assert_eq!(
            DenyReason::ViewLimitReached.to_string(),
            "view limit has been reached"
        );
        assert_eq!(DenyReason::Expired.to_string(), "document has expired");
    }
}
