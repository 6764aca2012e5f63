//! Exchange orchestration — the surface the transport layer calls.
//!
//! Upload: encrypt the payload, store the ciphertext under an obfuscated
//! name, create the metadata record referencing that name plus IV/tag.
//! Download: check access, read and decrypt the ciphertext, then — for
//! recipient reads only — account the view and apply the destruction
//! policy using the authoritative post-increment count.

use crate::config::ExchangeConfig;
use crate::error::{ExchangeError, ExchangeResult};
use crate::lifecycle::{evaluate_access, DocumentLifecycle};
use chrono::Utc;
use sealdrop_blobstore::{BlobStore, BlobStoreError};
use sealdrop_crypto::{self as crypto, MasterKey};
use sealdrop_storage::DocumentStore;
use sealdrop_types::{AccessDecision, DocumentMeta};
use std::sync::Arc;
use tracing::{info, warn};

/// Upload parameters supplied by the transport layer. The caller is
/// responsible for request-level validation (recipient exists,
/// `view_limit > 0`, parseable expiry).
#[derive(Clone, Debug)]
pub struct UploadRequest {
    pub filename: String,
    pub mime_type: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub view_limit: Option<i64>,
    pub expires_at: Option<i64>,
}

/// A decrypted document ready to hand to the requester.
#[derive(Clone, Debug)]
pub struct Delivered {
    pub filename: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// The document exchange: cipher engine + lifecycle manager + stores,
/// wired together behind the operations external callers consume.
#[derive(Clone)]
pub struct DocumentExchange {
    key: Arc<MasterKey>,
    documents: DocumentStore,
    blobs: BlobStore,
    lifecycle: DocumentLifecycle,
}

impl DocumentExchange {
    /// Builds the exchange, deriving the master key once. Without a
    /// configured secret a random one is generated — development only,
    /// since a restart then strands every stored ciphertext.
    pub fn new(
        config: &ExchangeConfig,
        documents: DocumentStore,
        blobs: BlobStore,
    ) -> ExchangeResult<Self> {
        let secret = match &config.master_secret {
            Some(secret) => secret.clone(),
            None => {
                warn!(
                    "no master secret configured; using a generated key — \
                     existing documents will be unreadable after restart"
                );
                crypto::generate_dev_secret()
            }
        };
        let key = Arc::new(crypto::derive_master_key(&secret)?);

        let lifecycle = DocumentLifecycle::new(documents.clone(), blobs.clone());
        Ok(Self {
            key,
            documents,
            blobs,
            lifecycle,
        })
    }

    /// The lifecycle manager, for callers that drive policy directly
    /// (e.g. the sweeper).
    pub fn lifecycle(&self) -> &DocumentLifecycle {
        &self.lifecycle
    }

    /// Encrypts and stores a payload, returning the created document's
    /// metadata projection.
    pub fn upload(&self, request: UploadRequest, plaintext: &[u8]) -> ExchangeResult<DocumentMeta> {
        let payload = crypto::encrypt(&self.key, plaintext)?;
        let storage_ref = crypto::obfuscate_name(&request.filename);

        self.blobs.put(&storage_ref, &payload.ciphertext)?;

        let doc = self.lifecycle.create(sealdrop_types::NewDocument {
            filename: request.filename,
            storage_ref,
            mime_type: request.mime_type,
            size: plaintext.len() as i64,
            sender_id: request.sender_id,
            recipient_id: request.recipient_id,
            encryption_iv: payload.iv,
            encryption_auth_tag: payload.auth_tag,
            view_limit: request.view_limit,
            expires_at: request.expires_at,
        })?;

        info!(
            document_id = %doc.id,
            sender = %doc.sender_id,
            recipient = %doc.recipient_id,
            size = doc.size,
            "document uploaded"
        );
        Ok(DocumentMeta::from(&doc))
    }

    /// Decrypts and delivers a document to an authorized requester.
    ///
    /// Recipient reads consume the view limit: the view is recorded via
    /// the atomic increment after successful decryption, and the
    /// destruction policy is applied with the count that increment
    /// returned. Sender reads leave the counter untouched.
    pub fn download(&self, document_id: &str, requester: &str) -> ExchangeResult<Delivered> {
        let doc = self
            .documents
            .get(document_id)?
            .ok_or_else(|| ExchangeError::NotFound(document_id.to_string()))?;

        let now_ms = Utc::now().timestamp_millis();
        if let AccessDecision::Deny(reason) = evaluate_access(&doc, requester, now_ms) {
            return Err(ExchangeError::Denied(reason));
        }

        let ciphertext = match self.blobs.get(&doc.storage_ref) {
            Ok(bytes) => bytes,
            // Metadata without its blob: the destruction pairing broke.
            Err(BlobStoreError::NotFound(_)) => {
                return Err(ExchangeError::Storage(format!(
                    "ciphertext blob missing for document {}",
                    doc.id
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let data = crypto::decrypt(
            &self.key,
            &ciphertext,
            &doc.encryption_iv,
            &doc.encryption_auth_tag,
        )?;

        if requester == doc.recipient_id {
            // None means a concurrent destruction won; this read already
            // passed access evaluation and is allowed to complete.
            if let Some(count) = self.lifecycle.record_view(&doc.id)? {
                self.lifecycle.apply_destruction_policy(&doc, count, now_ms)?;
            }
        }

        info!(document_id = %doc.id, requester, "document downloaded");
        Ok(Delivered {
            filename: doc.filename,
            mime_type: doc.mime_type,
            data,
        })
    }

    /// Access-checked metadata projection of a single document.
    pub fn get_document(&self, document_id: &str, requester: &str) -> ExchangeResult<DocumentMeta> {
        let doc = self
            .documents
            .get(document_id)?
            .ok_or_else(|| ExchangeError::NotFound(document_id.to_string()))?;

        let now_ms = Utc::now().timestamp_millis();
        if let AccessDecision::Deny(reason) = evaluate_access(&doc, requester, now_ms) {
            return Err(ExchangeError::Denied(reason));
        }

        Ok(DocumentMeta::from(&doc))
    }

    /// Documents the user has sent, newest first.
    pub fn list_sent(&self, user_id: &str) -> ExchangeResult<Vec<DocumentMeta>> {
        let docs = self.documents.list_sent(user_id)?;
        Ok(docs.iter().map(DocumentMeta::from).collect())
    }

    /// Documents the user has received, newest first.
    pub fn list_received(&self, user_id: &str) -> ExchangeResult<Vec<DocumentMeta>> {
        let docs = self.documents.list_received(user_id)?;
        Ok(docs.iter().map(DocumentMeta::from).collect())
    }

    /// Sender-initiated destruction.
    pub fn delete(&self, document_id: &str, requester: &str) -> ExchangeResult<()> {
        self.lifecycle.delete(document_id, requester)
    }

    /// Destroys all documents past their expiry; returns the number removed.
    pub fn sweep_expired(&self) -> ExchangeResult<usize> {
        self.lifecycle.sweep_expired(Utc::now().timestamp_millis())
    }
}
