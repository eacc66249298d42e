//! Schema bring-up, grounded on `cortex-storage::migrations` (version
//! tracking table + forward-only migration functions). Because every
//! store here is one generic `(key, value)` table (see `kv.rs`), there is
//! only one migration: create the tables. The version table is kept so
//! a future on-disk format change has somewhere to record itself.

use rusqlite::Connection;

use nmt_core::errors::StorageError;

use crate::{kv, to_storage_err};

pub const LATEST_VERSION: u32 = 1;

pub fn current_version(conn: &Connection) -> Result<u32, StorageError> {
    let exists: bool = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version'")
        .and_then(|mut stmt| stmt.exists([]))
        .map_err(to_storage_err)?;
    if !exists {
        return Ok(0);
    }
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get::<_, i64>(0),
    )
    .map(|v| v as u32)
    .map_err(to_storage_err)
}

/// Ensure the backing table for `table_name` exists and the schema
/// version record reflects `LATEST_VERSION`. Idempotent; safe to call on
/// every store `init()`.
pub fn run(conn: &Connection, table_name: &str) -> Result<(), StorageError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );",
    )
    .map_err(to_storage_err)?;

    kv::ensure_table(conn, table_name)?;

    if current_version(conn)? < LATEST_VERSION {
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [LATEST_VERSION],
        )
        .map_err(to_storage_err)?;
    }
    Ok(())
}
