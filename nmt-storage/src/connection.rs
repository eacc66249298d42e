//! Single-writer connection wrapper (spec §5: "all store mutations are
//! point-in-time consistent per key; batched writes are all-or-nothing").
//!
//! Grounded on `cortex-temporal`'s `WriteConnection::with_conn` pattern:
//! one mutex-guarded connection serializes every mutation, WAL mode lets
//! readers on the same connection observe a consistent snapshot.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use nmt_core::errors::StorageError;

use crate::to_storage_err;

/// Wraps a single `rusqlite::Connection` behind a mutex. All reads and
/// writes for one logical store (chunks, neurons, synapses, index
/// snapshots) funnel through here, giving the serialized-writer contract
/// the spec requires without a separate connection pool.
pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::Fatal(format!("create data dir: {e}")))?;
        }
        let conn = Connection::open(path).map_err(|e| {
            StorageError::Fatal(format!("open {}: {e}", path.display()))
        })?;
        Self::configure(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(to_storage_err)?;
        Self::configure(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn configure(conn: &Connection) -> Result<(), StorageError> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;",
        )
        .map_err(to_storage_err)?;
        Ok(())
    }

    /// Run `f` against the guarded connection. Poisoned-lock recovery is
    /// intentionally absent: a panic while holding the lock indicates a
    /// bug elsewhere in the store and should surface, not be papered over.
    pub fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StorageError::Fatal("write connection lock poisoned".into()))?;
        f(&conn)
    }

    /// Run `f` inside a transaction; rolled back if `f` errors, committed
    /// otherwise. Used for batched multi-key mutations.
    pub fn with_tx<T>(
        &self,
        f: impl FnOnce(&rusqlite::Transaction<'_>) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| StorageError::Fatal("write connection lock poisoned".into()))?;
        let tx = conn.transaction().map_err(to_storage_err)?;
        let result = f(&tx)?;
        tx.commit().map_err(to_storage_err)?;
        Ok(result)
    }

    /// `PRAGMA wal_checkpoint(TRUNCATE)`, run during scheduled compaction.
    pub fn checkpoint(&self) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
                .map_err(to_storage_err)
        })
    }
}
