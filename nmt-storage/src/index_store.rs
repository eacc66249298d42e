//! Named HNSW snapshots under the `index:` key prefix (spec §4.5, §6:
//! "index/ — named HNSW snapshots (binary...)"). Snapshots are zstd-
//! compressed JSON; `zstd` is the teacher's compaction/snapshot
//! compression crate of choice.

use std::path::Path;

use nmt_core::errors::{HnswError, StorageError};
use nmt_hnsw::{HnswIndex, HnswSnapshot};

use crate::connection::WriteConnection;
use crate::{kv, migrations, to_storage_err};

const TABLE: &str = "index_snapshots";
const ZSTD_LEVEL: i32 = 3;

pub struct IndexStore {
    conn: WriteConnection,
}

impl IndexStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = WriteConnection::open(path)?;
        conn.with_conn(|c| migrations::run(c, TABLE))?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = WriteConnection::open_in_memory()?;
        conn.with_conn(|c| migrations::run(c, TABLE))?;
        Ok(Self { conn })
    }

    fn key(name: &str) -> String {
        format!("index:{name}")
    }

    pub fn save(&self, name: &str, index: &HnswIndex) -> Result<(), StorageError> {
        let snapshot = index.to_snapshot();
        let json = serde_json::to_vec(&snapshot).map_err(|e| to_storage_err(e.to_string()))?;
        let compressed = zstd::encode_all(json.as_slice(), ZSTD_LEVEL)
            .map_err(|e| StorageError::Io(e.to_string()))?;
        self.conn
            .with_conn(|conn| kv::put(conn, TABLE, &Self::key(name), &compressed))
    }

    /// Load a named snapshot. Corruption surfaces as a load error;
    /// callers may catch `StorageError::Corruption` and fall back to an
    /// empty index (spec §4.2 persistence).
    pub fn load(&self, name: &str) -> Result<Option<HnswIndex>, StorageError> {
        let raw = self
            .conn
            .with_conn(|conn| kv::get(conn, TABLE, &Self::key(name)))?;
        let Some(compressed) = raw else {
            return Ok(None);
        };
        let json = zstd::decode_all(compressed.as_slice())
            .map_err(|e| StorageError::Corruption(format!("zstd decode: {e}")))?;
        let snapshot: HnswSnapshot =
            serde_json::from_slice(&json).map_err(|e| StorageError::Corruption(e.to_string()))?;
        let index = HnswIndex::from_snapshot(snapshot).map_err(|e: HnswError| {
            StorageError::Corruption(format!("hnsw snapshot: {e}"))
        })?;
        Ok(Some(index))
    }

    pub fn list(&self) -> Result<Vec<String>, StorageError> {
        self.conn.with_conn(|conn| {
            Ok(kv::scan_prefix(conn, TABLE, "index:")?
                .into_iter()
                .map(|(key, _)| key.trim_start_matches("index:").to_string())
                .collect())
        })
    }

    pub fn compact(&self) -> Result<(), StorageError> {
        self.conn.checkpoint()
    }
}
