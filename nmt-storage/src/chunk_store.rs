//! `chunk:<hash>` -> serialized chunk (spec §6 file layout, §4.5).

use std::collections::HashSet;
use std::path::Path;

use nmt_core::errors::StorageError;
use nmt_hash::Chunk;

use crate::connection::WriteConnection;
use crate::{kv, migrations, to_storage_err};

const TABLE: &str = "chunks";

pub struct ChunkStore {
    conn: WriteConnection,
}

impl ChunkStore {
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

    fn key(hash: &str) -> String {
        format!("chunk:{hash}")
    }

    /// Insert a chunk; a no-op if one with this hash already exists
    /// (content-addressing means identical bytes dedup naturally).
    pub fn put(&self, chunk: &Chunk) -> Result<(), StorageError> {
        self.conn.with_conn(|conn| {
            let key = Self::key(&chunk.hash);
            if kv::exists(conn, TABLE, &key)? {
                return Ok(());
            }
            let value = serde_json::to_vec(chunk).map_err(|e| to_storage_err(e.to_string()))?;
            kv::put(conn, TABLE, &key, &value)
        })
    }

    pub fn put_batch(&self, chunks: &[Chunk]) -> Result<(), StorageError> {
        self.conn.with_tx(|tx| {
            for chunk in chunks {
                let key = Self::key(&chunk.hash);
                if kv::exists(tx, TABLE, &key)? {
                    continue;
                }
                let value =
                    serde_json::to_vec(chunk).map_err(|e| to_storage_err(e.to_string()))?;
                kv::put(tx, TABLE, &key, &value)?;
            }
            Ok(())
        })
    }

    pub fn get(&self, hash: &str) -> Result<Option<Chunk>, StorageError> {
        self.conn.with_conn(|conn| {
            let raw = kv::get(conn, TABLE, &Self::key(hash))?;
            raw.map(|bytes| {
                serde_json::from_slice(&bytes).map_err(|e| to_storage_err(e.to_string()))
            })
            .transpose()
        })
    }

    pub fn exists(&self, hash: &str) -> Result<bool, StorageError> {
        self.conn
            .with_conn(|conn| kv::exists(conn, TABLE, &Self::key(hash)))
    }

    fn delete(&self, hash: &str) -> Result<(), StorageError> {
        self.conn
            .with_conn(|conn| kv::delete(conn, TABLE, &Self::key(hash)))
    }

    /// Remove every stored chunk whose hash is not present in
    /// `live_hashes` (referenced by at least one live neuron). Returns the
    /// number of chunks collected.
    pub fn gc(&self, live_hashes: &HashSet<String>) -> Result<usize, StorageError> {
        let all = self.conn.with_conn(|conn| kv::scan_prefix(conn, TABLE, "chunk:"))?;
        let mut collected = 0;
        for (key, _) in all {
            let hash = key.trim_start_matches("chunk:");
            if !live_hashes.contains(hash) {
                self.delete(hash)?;
                collected += 1;
            }
        }
        Ok(collected)
    }

    pub fn compact(&self) -> Result<(), StorageError> {
        self.conn.checkpoint()
    }

    pub fn count(&self) -> Result<usize, StorageError> {
        self.conn
            .with_conn(|conn| kv::count_prefix(conn, TABLE, "chunk:"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(data: &[u8]) -> Chunk {
        Chunk::new(0, 0, data.to_vec(), None)
    }

    #[test]
    fn put_then_get_round_trips() {
        let store = ChunkStore::open_in_memory().unwrap();
        let c = chunk(b"hello world");
        store.put(&c).unwrap();
        let got = store.get(&c.hash).unwrap().unwrap();
        assert_eq!(got.data, c.data);
    }

    #[test]
    fn duplicate_put_is_idempotent() {
        let store = ChunkStore::open_in_memory().unwrap();
        let c = chunk(b"same bytes");
        store.put(&c).unwrap();
        store.put(&c).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn gc_removes_unreferenced_chunks_only() {
        let store = ChunkStore::open_in_memory().unwrap();
        let a = chunk(b"alpha");
        let b = chunk(b"beta");
        store.put(&a).unwrap();
        store.put(&b).unwrap();

        let mut live = HashSet::new();
        live.insert(a.hash.clone());
        let collected = store.gc(&live).unwrap();

        assert_eq!(collected, 1);
        assert!(store.exists(&a.hash).unwrap());
        assert!(!store.exists(&b.hash).unwrap());
    }
}
