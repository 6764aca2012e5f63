//! Document lifecycle state machine.
//!
//! A document is Active from creation until destruction removes its
//! metadata record and ciphertext blob. There is no intermediate state:
//! the transition is evaluated synchronously after every recipient view
//! and once per sweep cycle.
//!
//! All destruction paths are idempotent — "metadata already gone" is
//! success, so concurrent destruction attempts on the same document
//! cannot fail each other.

use crate::error::ExchangeResult;
use sealdrop_blobstore::{BlobStore, BlobStoreError};
use sealdrop_storage::DocumentStore;
use sealdrop_types::{AccessDecision, DenyReason, Document, NewDocument};
use tracing::{debug, info, warn};

/// Evaluates whether `requester` may access a document right now.
///
/// Denials are ordinary outcomes, returned as values:
/// - not a party to the exchange (neither sender nor recipient),
/// - the expiry timestamp has passed (denies both parties),
/// - the recipient has exhausted the view limit.
///
/// The sender is exempt from the view-limit check — the limit bounds
/// recipient exposure, not sender review. A self-sent document
/// (`sender_id == recipient_id`) is treated as a recipient access, so
/// the limit applies.
pub fn evaluate_access(doc: &Document, requester: &str, now_ms: i64) -> AccessDecision {
    if requester != doc.sender_id && requester != doc.recipient_id {
        return AccessDecision::Deny(DenyReason::NotParticipant);
    }

    if doc.expires_at.is_some_and(|t| now_ms >= t) {
        return AccessDecision::Deny(DenyReason::Expired);
    }

    if requester == doc.recipient_id
        && doc
            .view_limit
            .is_some_and(|limit| doc.view_count >= limit)
    {
        return AccessDecision::Deny(DenyReason::ViewLimitReached);
    }

    AccessDecision::Allow
}

/// Owns document metadata mutation and the destruction policy.
///
/// The lifecycle manager references ciphertext blobs by name only; it
/// never encrypts, decrypts, or inspects their contents.
#[derive(Clone)]
pub struct DocumentLifecycle {
    documents: DocumentStore,
    blobs: BlobStore,
}

impl DocumentLifecycle {
    pub fn new(documents: DocumentStore, blobs: BlobStore) -> Self {
        Self { documents, blobs }
    }

    /// Persists a new Active document with `view_count = 0`. Policy
    /// validation of the payload (e.g. `view_limit > 0`) belongs to the
    /// caller.
    pub fn create(&self, new: NewDocument) -> ExchangeResult<Document> {
        Ok(self.documents.create(new)?)
    }

    /// Records one recipient view via the storage layer's atomic
    /// increment. Returns the authoritative post-increment count, or
    /// `None` if the document was destroyed in the meantime.
    pub fn record_view(&self, document_id: &str) -> ExchangeResult<Option<i64>> {
        Ok(self.documents.increment_view_count(document_id)?)
    }

    /// Re-evaluates the destruction policy after a recorded view, using
    /// the post-increment count the storage layer returned. Destroys the
    /// document if its expiry has passed or the view limit is now met.
    /// Returns whether destruction happened on this call.
    pub fn apply_destruction_policy(
        &self,
        doc: &Document,
        current_count: i64,
        now_ms: i64,
    ) -> ExchangeResult<bool> {
        let expired = doc.expires_at.is_some_and(|t| now_ms >= t);
        let limit_reached = doc.view_limit.is_some_and(|limit| current_count >= limit);

        if !(expired || limit_reached) {
            return Ok(false);
        }

        let destroyed = self.destroy(doc)?;
        if destroyed {
            info!(
                document_id = %doc.id,
                expired,
                limit_reached,
                "document auto-destroyed"
            );
        }
        Ok(destroyed)
    }

    /// Explicit sender-initiated destruction. Only the sender may delete;
    /// a record that is already gone is success, not an error.
    pub fn delete(&self, document_id: &str, requester: &str) -> ExchangeResult<()> {
        let Some(doc) = self.documents.get(document_id)? else {
            debug!(document_id, "delete requested for already-destroyed document");
            return Ok(());
        };

        if requester != doc.sender_id {
            return Err(crate::ExchangeError::Denied(DenyReason::NotSender));
        }

        self.destroy(&doc)?;
        info!(document_id = %doc.id, requester, "document deleted by sender");
        Ok(())
    }

    /// Destroys every document whose expiry has passed, returning how
    /// many were removed. Idempotent: a second sweep with no new
    /// expirations removes nothing and returns 0. In-flight reads that
    /// already passed access evaluation are unaffected — they hold their
    /// own copy of the record and ciphertext.
    pub fn sweep_expired(&self, now_ms: i64) -> ExchangeResult<usize> {
        let expired = self.documents.find_expired(now_ms)?;
        let mut removed = 0;
        for doc in &expired {
            if self.destroy(doc)? {
                removed += 1;
            }
        }
        if removed > 0 {
            info!(removed, "expiry sweep destroyed documents");
        }
        Ok(removed)
    }

    /// Shared destruction path: removes the metadata record, then asks
    /// the content store to drop the blob. Returns whether this call
    /// removed the record (false = it was already gone).
    ///
    /// A blob-delete failure is logged and tolerated rather than rolled
    /// back — the document is gone from the exchange's perspective, and
    /// an orphaned blob is reconciled by an external job.
    fn destroy(&self, doc: &Document) -> ExchangeResult<bool> {
        let removed = self.documents.delete(&doc.id)?;

        match self.blobs.delete(&doc.storage_ref) {
            Ok(()) => {}
            Err(BlobStoreError::NotFound(_)) => {} // already gone
            Err(e) => {
                warn!(
                    document_id = %doc.id,
                    storage_ref = %doc.storage_ref,
                    error = %e,
                    "ciphertext blob deletion failed; orphaned blob left behind"
                );
            }
        }

        Ok(removed)
    }
}
