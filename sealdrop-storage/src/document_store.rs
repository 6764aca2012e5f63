//! Document record store backed by DuckDB.
//!
//! All `view_count` mutation goes through [`DocumentStore::increment_view_count`],
//! a single `UPDATE .. RETURNING` statement that is atomic at the storage
//! layer and hands back the authoritative post-increment count. There is
//! deliberately no general update operation: document records are
//! immutable apart from that one counter.

use crate::error::StorageResult;
use chrono::Utc;
use duckdb::{params, Connection, Row};
use sealdrop_types::{Document, NewDocument};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Metadata store for document records.
#[derive(Clone)]
pub struct DocumentStore {
    conn: Arc<Mutex<Connection>>,
}

impl DocumentStore {
    /// Opens or creates a document store at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = crate::open_duckdb_with_wal_recovery(path, "256MB", 2)?;
        initialize_document_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an in-memory document store (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_document_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens a document store over an existing shared connection.
    pub fn open_with_conn(conn: Arc<Mutex<Connection>>) -> StorageResult<Self> {
        {
            let guard = conn.lock().unwrap();
            initialize_document_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    /// Persists a new document record with a fresh id, `view_count = 0`,
    /// and the current creation timestamp. Cross-field policy validation
    /// (e.g. `view_limit > 0`) belongs to the caller.
    pub fn create(&self, new: NewDocument) -> StorageResult<Document> {
        let doc = Document {
            id: uuid::Uuid::new_v4().to_string(),
            filename: new.filename,
            storage_ref: new.storage_ref,
            mime_type: new.mime_type,
            size: new.size,
            sender_id: new.sender_id,
            recipient_id: new.recipient_id,
            encryption_iv: new.encryption_iv,
            encryption_auth_tag: new.encryption_auth_tag,
            view_count: 0,
            view_limit: new.view_limit,
            expires_at: new.expires_at,
            created_at: Utc::now().timestamp_millis(),
        };

        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO documents (
                id, filename, storage_ref, mime_type, size,
                sender_id, recipient_id, encryption_iv, encryption_auth_tag,
                view_count, view_limit, expires_at, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                doc.id,
                doc.filename,
                doc.storage_ref,
                doc.mime_type,
                doc.size,
                doc.sender_id,
                doc.recipient_id,
                doc.encryption_iv,
                doc.encryption_auth_tag,
                doc.view_count,
                doc.view_limit,
                doc.expires_at,
                doc.created_at,
            ],
        )?;

        Ok(doc)
    }

    /// Get a single document by id.
    pub fn get(&self, id: &str) -> StorageResult<Option<Document>> {
        let conn = self.conn.lock().unwrap();
        let result = conn.query_row(
            &format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?"),
            params![id],
            row_to_document,
        );

        match result {
            Ok(doc) => Ok(Some(doc)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Documents sent by a user, newest first.
    pub fn list_sent(&self, sender_id: &str) -> StorageResult<Vec<Document>> {
        self.list_by_column("sender_id", sender_id)
    }

    /// Documents received by a user, newest first.
    pub fn list_received(&self, recipient_id: &str) -> StorageResult<Vec<Document>> {
        self.list_by_column("recipient_id", recipient_id)
    }

    fn list_by_column(&self, column: &str, value: &str) -> StorageResult<Vec<Document>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE {column} = ? ORDER BY created_at DESC"
        ))?;
        let docs = stmt
            .query_map(params![value], row_to_document)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(docs)
    }

    /// Atomically increments `view_count` and returns the authoritative
    /// post-increment value, or `None` if the record is already gone.
    ///
    /// This is one UPDATE statement — concurrent calls for the same
    /// document cannot lose an increment, and the destruction decision
    /// downstream always sees the real counter, never a locally bumped
    /// copy.
    pub fn increment_view_count(&self, id: &str) -> StorageResult<Option<i64>> {
        let conn = self.conn.lock().unwrap();
        let result = conn.query_row(
            "UPDATE documents SET view_count = view_count + 1 WHERE id = ? RETURNING view_count",
            params![id],
            |row| row.get(0),
        );

        match result {
            Ok(count) => Ok(Some(count)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes a document record. Returns `false` (not an error) if the
    /// record was already gone — destruction must be idempotent.
    pub fn delete(&self, id: &str) -> StorageResult<bool> {
        let conn = self.conn.lock().unwrap();
        let affected = conn.execute("DELETE FROM documents WHERE id = ?", params![id])?;
        Ok(affected > 0)
    }

    /// All documents whose expiry timestamp is set and at/before the
    /// given instant.
    pub fn find_expired(&self, before_ms: i64) -> StorageResult<Vec<Document>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents
             WHERE expires_at IS NOT NULL AND expires_at <= ?
             ORDER BY expires_at ASC"
        ))?;
        let docs = stmt
            .query_map(params![before_ms], row_to_document)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(docs)
    }

    /// Total number of document records.
    pub fn count(&self) -> StorageResult<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

const DOCUMENT_COLUMNS: &str = "id, filename, storage_ref, mime_type, size, \
     sender_id, recipient_id, encryption_iv, encryption_auth_tag, \
     view_count, view_limit, expires_at, created_at";

fn row_to_document(row: &Row<'_>) -> duckdb::Result<Document> {
    Ok(Document {
        id: row.get(0)?,
        filename: row.get(1)?,
        storage_ref: row.get(2)?,
        mime_type: row.get(3)?,
        size: row.get(4)?,
        sender_id: row.get(5)?,
        recipient_id: row.get(6)?,
        encryption_iv: row.get(7)?,
        encryption_auth_tag: row.get(8)?,
        view_count: row.get(9)?,
        view_limit: row.get(10)?,
        expires_at: row.get(11)?,
        created_at: row.get(12)?,
    })
}

fn initialize_document_schema(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id VARCHAR PRIMARY KEY,
            filename VARCHAR NOT NULL,
            storage_ref VARCHAR NOT NULL UNIQUE,
            mime_type VARCHAR NOT NULL,
            size BIGINT NOT NULL,
            sender_id VARCHAR NOT NULL,
            recipient_id VARCHAR NOT NULL,
            encryption_iv VARCHAR NOT NULL,
            encryption_auth_tag VARCHAR NOT NULL,
            view_count BIGINT NOT NULL DEFAULT 0,
            view_limit BIGINT,
            expires_at BIGINT,
            created_at BIGINT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_documents_sender ON documents(sender_id);
        CREATE INDEX IF NOT EXISTS idx_documents_recipient ON documents(recipient_id);
        CREATE INDEX IF NOT EXISTS idx_documents_expiry ON documents(expires_at);
        "#,
    )?;
    Ok(())
}
