use sealdrop_storage::DocumentStore;
use sealdrop_types::NewDocument;

fn new_document(sender: &str, recipient: &str) -> NewDocument {
    NewDocument {
        filename: "notes.txt".into(),
        storage_ref: format!("{}-cafe.txt.enc", uuid::Uuid::new_v4()),
        mime_type: "text/plain".into(),
        size: 42,
        sender_id: sender.into(),
        recipient_id: recipient.into(),
        encryption_iv: "00".repeat(16),
        encryption_auth_tag: "ff".repeat(16),
        view_limit: None,
        expires_at: None,
    }
}

// ── Basic CRUD ───────────────────────────────────────────────────

#[test]
fn create_and_get() {
    let store = DocumentStore::open_in_memory().unwrap();
    let doc = store.create(new_document("alice", "bob")).unwrap();

    assert_eq!(doc.view_count, 0);
    assert!(doc.created_at > 0);

    let retrieved = store.get(&doc.id).unwrap().unwrap();
    assert_eq!(retrieved, doc);
}

#[test]
fn get_nonexistent_returns_none() {
    let store = DocumentStore::open_in_memory().unwrap();
    assert!(store.get("nonexistent-id").unwrap().is_none());
}

#[test]
fn create_assigns_unique_ids() {
    let store = DocumentStore::open_in_memory().unwrap();
    let a = store.create(new_document("alice", "bob")).unwrap();
    let b = store.create(new_document("alice", "bob")).unwrap();
    assert_ne!(a.id, b.id);
}

#[test]
fn optional_fields_round_trip() {
    let store = DocumentStore::open_in_memory().unwrap();

    let mut with_policy = new_document("alice", "bob");
    with_policy.view_limit = Some(3);
    with_policy.expires_at = Some(1_900_000_000_000);
    let doc = store.create(with_policy).unwrap();

    let retrieved = store.get(&doc.id).unwrap().unwrap();
    assert_eq!(retrieved.view_limit, Some(3));
    assert_eq!(retrieved.expires_at, Some(1_900_000_000_000));

    let unlimited = store.create(new_document("alice", "bob")).unwrap();
    let retrieved = store.get(&unlimited.id).unwrap().unwrap();
    assert_eq!(retrieved.view_limit, None);
    assert_eq!(retrieved.expires_at, None);
}

// ── Sender / recipient queries ───────────────────────────────────

#[test]
fn list_sent_and_received() {
    let store = DocumentStore::open_in_memory().unwrap();
    store.create(new_document("alice", "bob")).unwrap();
    store.create(new_document("alice", "carol")).unwrap();
    store.create(new_document("bob", "alice")).unwrap();

    let sent = store.list_sent("alice").unwrap();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|d| d.sender_id == "alice"));

    let received = store.list_received("alice").unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].sender_id, "bob");

    assert!(store.list_sent("carol").unwrap().is_empty());
}

#[test]
fn listings_are_newest_first() {
    let store = DocumentStore::open_in_memory().unwrap();

    let older = store.create(new_document("alice", "bob")).unwrap();
    // created_at has millisecond resolution
    std::thread::sleep(std::time::Duration::from_millis(5));
    let newer = store.create(new_document("alice", "bob")).unwrap();

    let sent = store.list_sent("alice").unwrap();
    assert_eq!(sent[0].id, newer.id);
    assert_eq!(sent[1].id, older.id);
}

// ── Atomic view counting ─────────────────────────────────────────

#[test]
fn increment_returns_authoritative_count() {
    let store = DocumentStore::open_in_memory().unwrap();
    let doc = store.create(new_document("alice", "bob")).unwrap();

    assert_eq!(store.increment_view_count(&doc.id).unwrap(), Some(1));
    assert_eq!(store.increment_view_count(&doc.id).unwrap(), Some(2));
    assert_eq!(store.increment_view_count(&doc.id).unwrap(), Some(3));

    let retrieved = store.get(&doc.id).unwrap().unwrap();
    assert_eq!(retrieved.view_count, 3);
}

#[test]
fn increment_on_missing_document_returns_none() {
    let store = DocumentStore::open_in_memory().unwrap();
    assert_eq!(store.increment_view_count("gone").unwrap(), None);
}

#[test]
fn increments_from_concurrent_callers_are_not_lost() {
    let store = DocumentStore::open_in_memory().unwrap();
    let doc = store.create(new_document("alice", "bob")).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            let id = doc.id.clone();
            std::thread::spawn(move || store.increment_view_count(&id).unwrap())
        })
        .collect();

    let mut counts: Vec<i64> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();
    counts.sort_unstable();

    // Every caller observed a distinct post-increment value.
    assert_eq!(counts, (1..=8).collect::<Vec<i64>>());
    assert_eq!(store.get(&doc.id).unwrap().unwrap().view_count, 8);
}

// ── Deletion ─────────────────────────────────────────────────────

#[test]
fn delete_is_idempotent() {
    let store = DocumentStore::open_in_memory().unwrap();
    let doc = store.create(new_document("alice", "bob")).unwrap();

    assert!(store.delete(&doc.id).unwrap());
    assert!(store.get(&doc.id).unwrap().is_none());

    // Already gone: success, just nothing removed.
    assert!(!store.delete(&doc.id).unwrap());
}

// ── Expiry queries ───────────────────────────────────────────────

#[test]
fn find_expired_honors_boundary() {
    let store = DocumentStore::open_in_memory().unwrap();

    let mut expired = new_document("alice", "bob");
    expired.expires_at = Some(1_000);
    let expired = store.create(expired).unwrap();

    let mut at_boundary = new_document("alice", "bob");
    at_boundary.expires_at = Some(2_000);
    let at_boundary = store.create(at_boundary).unwrap();

    let mut future = new_document("alice", "bob");
    future.expires_at = Some(3_000);
    store.create(future).unwrap();

    // No expiry set: never swept.
    store.create(new_document("alice", "bob")).unwrap();

    let found = store.find_expired(2_000).unwrap();
    let ids: Vec<&str> = found.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(found.len(), 2);
    assert!(ids.contains(&expired.id.as_str()));
    assert!(ids.contains(&at_boundary.id.as_str()));
}

#[test]
fn count_tracks_records() {
    let store = DocumentStore::open_in_memory().unwrap();
    assert_eq!(store.count().unwrap(), 0);
    let doc = store.create(new_document("alice", "bob")).unwrap();
    assert_eq!(store.count().unwrap(), 1);
    store.delete(&doc.id).unwrap();
    assert_eq!(store.count().unwrap(), 0);
}

// ── File-backed persistence ──────────────────────────────────────

#[test]
fn reopen_preserves_documents() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("documents.duckdb");

    let id = {
        let store = DocumentStore::open(&db_path).unwrap();
        store.create(new_document("alice", "bob")).unwrap().id
    };

    let store = DocumentStore::open(&db_path).unwrap();
    assert!(store.get(&id).unwrap().is_some());
}
