//! Sweeper task tests using tokio's paused test clock.
//!
//! Note the sweep interval runs on the tokio clock while expiry itself is
//! wall-clock, so these tests create documents that are already expired
//! and advance the virtual clock to trigger ticks.

use sealdrop_blobstore::BlobStore;
use sealdrop_exchange::{DocumentExchange, ExchangeConfig, Sweeper, UploadRequest};
use sealdrop_storage::DocumentStore;
use std::sync::Arc;
use std::time::Duration;

fn expired_upload() -> UploadRequest {
    UploadRequest {
        filename: "fleeting.txt".into(),
        mime_type: "text/plain".into(),
        sender_id: "alice".into(),
        recipient_id: "bob".into(),
        view_limit: None,
        expires_at: Some(chrono::Utc::now().timestamp_millis() - 1),
    }
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn sweeper_destroys_expired_documents_on_schedule() {
    let documents = DocumentStore::open_in_memory().unwrap();
    let blobs = BlobStore::open_in_memory().unwrap();
    let config = ExchangeConfig {
        master_secret: Some("sweeper-test-secret".into()),
        ..ExchangeConfig::default()
    };
    let exchange =
        Arc::new(DocumentExchange::new(&config, documents.clone(), blobs.clone()).unwrap());

    let first = exchange.upload(expired_upload(), b"gone at startup").unwrap();

    let handle = tokio::spawn(Sweeper::new(exchange.clone(), Duration::from_secs(60)).run());

    // The first tick fires immediately and clears the backlog.
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert!(documents.get(&first.id).unwrap().is_none());

    // A document expiring between ticks is picked up by the next one.
    let second = exchange.upload(expired_upload(), b"gone next tick").unwrap();
    tokio::time::sleep(Duration::from_secs(61)).await;
    assert!(documents.get(&second.id).unwrap().is_none());

    handle.abort();
}
