//! Ciphertext blob storage, keyed by obfuscated storage name.
//!
//! The blob store holds opaque bytes and nothing else: ciphertext
//! arrives already encrypted from the cipher engine, and this store
//! never inspects, transforms, or decrypts it. Document metadata —
//! including the IV and auth tag needed to decrypt a blob — lives in
//! the metadata store, never here.

use chrono::Utc;
use duckdb::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};

// ============================================================================
// Error types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BlobStoreError {
    #[error("blob not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(String),
}

pub type BlobStoreResult<T> = Result<T, BlobStoreError>;

// ============================================================================
// BlobStore
// ============================================================================

/// Content store for ciphertext blobs, backed by DuckDB.
#[derive(Clone)]
pub struct BlobStore {
    conn: Arc<Mutex<Connection>>,
}

impl BlobStore {
    /// Open a blob store backed by a DuckDB file.
    pub fn open(db_path: &Path) -> BlobStoreResult<Self> {
        let conn =
            Connection::open(db_path).map_err(|e| BlobStoreError::Storage(e.to_string()))?;

        // Cap memory/threads — DuckDB defaults to ~80% RAM per connection
        conn.execute_batch("PRAGMA memory_limit='128MB'; PRAGMA threads=1;")
            .map_err(|e| BlobStoreError::Storage(e.to_string()))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.ensure_tables()?;
        Ok(store)
    }

    /// Open with an existing shared connection.
    pub fn open_with_conn(conn: Arc<Mutex<Connection>>) -> BlobStoreResult<Self> {
        let store = Self { conn };
        store.ensure_tables()?;
        Ok(store)
    }

    /// Open in-memory (for testing).
    pub fn open_in_memory() -> BlobStoreResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| BlobStoreError::Storage(e.to_string()))?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.ensure_tables()?;
        Ok(store)
    }

    fn ensure_tables(&self) -> BlobStoreResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| BlobStoreError::Storage(e.to_string()))?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS blobs (
                name VARCHAR PRIMARY KEY,
                data BLOB NOT NULL,
                size BIGINT NOT NULL DEFAULT 0,
                created_at BIGINT NOT NULL
            );",
        )
        .map_err(|e| BlobStoreError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Store a blob under the given name (upsert; keeps the original
    /// creation timestamp on overwrite).
    pub fn put(&self, name: &str, data: &[u8]) -> BlobStoreResult<()> {
        let now = Utc::now().timestamp_millis();

        let conn = self
            .conn
            .lock()
            .map_err(|e| BlobStoreError::Storage(e.to_string()))?;
        conn.execute(
            "INSERT OR REPLACE INTO blobs (name, data, size, created_at)
             VALUES (?, ?, ?, COALESCE((SELECT created_at FROM blobs WHERE name = ?), ?))",
            params![name, data, data.len() as i64, name, now],
        )
        .map_err(|e| BlobStoreError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Read a blob's bytes.
    pub fn get(&self, name: &str) -> BlobStoreResult<Vec<u8>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| BlobStoreError::Storage(e.to_string()))?;
        conn.query_row(
            "SELECT data FROM blobs WHERE name = ?",
            params![name],
            |row| row.get(0),
        )
        .map_err(|_| BlobStoreError::NotFound(name.to_string()))
    }

    /// Delete a blob. Returns `NotFound` if it was already gone — callers
    /// on the destruction path treat that as success.
    pub fn delete(&self, name: &str) -> BlobStoreResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| BlobStoreError::Storage(e.to_string()))?;
        let affected = conn
            .execute("DELETE FROM blobs WHERE name = ?", params![name])
            .map_err(|e| BlobStoreError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(BlobStoreError::NotFound(name.to_string()));
        }
        Ok(())
    }

    /// Whether a blob exists.
    pub fn contains(&self, name: &str) -> BlobStoreResult<bool> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| BlobStoreError::Storage(e.to_string()))?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM blobs WHERE name = ?",
                params![name],
                |row| row.get(0),
            )
            .map_err(|e| BlobStoreError::Storage(e.to_string()))?;
        Ok(count > 0)
    }

    /// Stored size of a blob in bytes.
    pub fn len(&self, name: &str) -> BlobStoreResult<i64> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| BlobStoreError::Storage(e.to_string()))?;
        conn.query_row(
            "SELECT size FROM blobs WHERE name = ?",
            params![name],
            |row| row.get(0),
        )
        .map_err(|_| BlobStoreError::NotFound(name.to_string()))
    }
}
