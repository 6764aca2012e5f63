//! DuckDB metadata store for Sealdrop.
//!
//! Persists document records and exposes the handful of operations the
//! lifecycle manager needs: CRUD, by-sender / by-recipient / by-expiry
//! queries, and a single-statement atomic `view_count` increment.
//!
//! The ciphertext itself never passes through this crate — blobs live in
//! the content store, referenced here by obfuscated storage name only.

mod document_store;
mod error;

pub use document_store::DocumentStore;
pub use error::{StorageError, StorageResult};

/// Open a DuckDB connection with stale WAL recovery and resource limits.
///
/// If the initial open fails and a `.wal` file exists alongside the
/// database, it is removed and the open is retried once. This handles the
/// common case where an unclean shutdown leaves a WAL file that prevents
/// reopening.
pub fn open_duckdb_with_wal_recovery(
    path: &std::path::Path,
    memory_limit: &str,
    threads: u32,
) -> StorageResult<duckdb::Connection> {
    let conn = match duckdb::Connection::open(path) {
        Ok(c) => c,
        Err(first_err) => {
            let wal_path = path.with_extension(
                path.extension()
                    .map(|ext| format!("{}.wal", ext.to_string_lossy()))
                    .unwrap_or_else(|| "wal".to_string()),
            );
            if wal_path.exists() {
                eprintln!(
                    "[WARN] DuckDB open failed, removing stale WAL and retrying: {}",
                    wal_path.display()
                );
                if std::fs::remove_file(&wal_path).is_ok() {
                    let c = duckdb::Connection::open(path)?;
                    apply_resource_limits(&c, memory_limit, threads)?;
                    return Ok(c);
                }
            }
            return Err(first_err.into());
        }
    };
    apply_resource_limits(&conn, memory_limit, threads)?;
    Ok(conn)
}

/// Apply memory and thread limits to a DuckDB connection.
fn apply_resource_limits(
    conn: &duckdb::Connection,
    memory_limit: &str,
    threads: u32,
) -> StorageResult<()> {
    conn.execute_batch(&format!(
        "PRAGMA memory_limit='{}'; PRAGMA threads={};",
        memory_limit, threads
    ))?;
    Ok(())
}
