//! `attractor:<id>` -> serialized attractor (spec §3 "Attractor" lifecycle,
//! §4.4). Mirrors `neuron_store.rs`'s shape; attractors have no secondary
//! index since they are always looked up and enumerated by id.

use std::path::Path;

use nmt_core::errors::StorageError;
use nmt_core::models::Attractor;

use crate::connection::WriteConnection;
use crate::{kv, migrations, to_storage_err};

const TABLE: &str = "attractors";

pub struct AttractorStore {
    conn: WriteConnection,
}

impl AttractorStore {
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

    fn key(id: &str) -> String {
        format!("attractor:{id}")
    }

    pub fn put(&self, attractor: &Attractor) -> Result<(), StorageError> {
        let value = serde_json::to_vec(attractor).map_err(|e| to_storage_err(e.to_string()))?;
        self.conn
            .with_conn(|conn| kv::put(conn, TABLE, &Self::key(&attractor.id), &value))
    }

    pub fn get(&self, id: &str) -> Result<Option<Attractor>, StorageError> {
        self.conn.with_conn(|conn| {
            let raw = kv::get(conn, TABLE, &Self::key(id))?;
            raw.map(|bytes| {
                serde_json::from_slice(&bytes).map_err(|e| to_storage_err(e.to_string()))
            })
            .transpose()
        })
    }

    pub fn delete(&self, id: &str) -> Result<(), StorageError> {
        self.conn
            .with_conn(|conn| kv::delete(conn, TABLE, &Self::key(id)))
    }

    /// Enumerate every attractor via the `attractor:` prefix range-scan.
    pub fn all(&self) -> Result<Vec<Attractor>, StorageError> {
        self.conn.with_conn(|conn| {
            kv::scan_prefix(conn, TABLE, "attractor:")?
                .into_iter()
                .map(|(_, bytes)| {
                    serde_json::from_slice(&bytes).map_err(|e| to_storage_err(e.to_string()))
                })
                .collect()
        })
    }

    pub fn count(&self) -> Result<usize, StorageError> {
        self.conn
            .with_conn(|conn| kv::count_prefix(conn, TABLE, "attractor:"))
    }

    pub fn compact(&self) -> Result<(), StorageError> {
        self.conn.checkpoint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn attractor(id: &str) -> Attractor {
        let now = Utc::now();
        Attractor {
            id: id.to_string(),
            name: "goal".to_string(),
            description: "test goal".to_string(),
            embedding: vec![1.0, 0.0],
            strength: 1.0,
            probability: 0.5,
            priority: 5,
            deadline: None,
            prerequisites: vec![],
            created_at: now,
            updated_at: now,
            activations: 0,
        }
    }

    #[test]
    fn put_then_get_round_trips() {
        let store = AttractorStore::open_in_memory().unwrap();
        store.put(&attractor("a1")).unwrap();
        let got = store.get("a1").unwrap().unwrap();
        assert_eq!(got.name, "goal");
    }

    #[test]
    fn delete_removes_record() {
        let store = AttractorStore::open_in_memory().unwrap();
        store.put(&attractor("a1")).unwrap();
        store.delete("a1").unwrap();
        assert!(store.get("a1").unwrap().is_none());
    }

    #[test]
    fn all_enumerates_every_attractor() {
        let store = AttractorStore::open_in_memory().unwrap();
        store.put(&attractor("a1")).unwrap();
        store.put(&attractor("a2")).unwrap();
        assert_eq!(store.all().unwrap().len(), 2);
    }
}
