//! `neuron:<id>` -> serialized neuron; `root:<merkleRoot>` -> id (spec §4.5,
//! §6). Embeddings round-trip as a JSON float array and rehydrate straight
//! into `Vec<f32>`, so no extra alignment step is needed once deserialized.

use std::path::Path;

use nmt_core::errors::StorageError;
use nmt_core::models::Neuron;

use crate::connection::WriteConnection;
use crate::{kv, migrations, to_storage_err};

const TABLE: &str = "neurons";

pub struct NeuronStore {
    conn: WriteConnection,
}

impl NeuronStore {
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

    fn primary_key(id: &str) -> String {
        format!("neuron:{id}")
    }

    fn root_key(root: &str) -> String {
        format!("root:{root}")
    }

    pub fn put(&self, neuron: &Neuron) -> Result<(), StorageError> {
        let value = serde_json::to_vec(neuron).map_err(|e| to_storage_err(e.to_string()))?;
        self.conn.with_tx(|tx| {
            kv::put(tx, TABLE, &Self::primary_key(&neuron.id), &value)?;
            kv::put(
                tx,
                TABLE,
                &Self::root_key(&neuron.merkle_root),
                neuron.id.as_bytes(),
            )
        })
    }

    pub fn get(&self, id: &str) -> Result<Option<Neuron>, StorageError> {
        self.conn.with_conn(|conn| {
            let raw = kv::get(conn, TABLE, &Self::primary_key(id))?;
            raw.map(|bytes| {
                serde_json::from_slice(&bytes).map_err(|e| to_storage_err(e.to_string()))
            })
            .transpose()
        })
    }

    pub fn get_by_merkle_root(&self, root: &str) -> Result<Option<Neuron>, StorageError> {
        let id = self
            .conn
            .with_conn(|conn| kv::get(conn, TABLE, &Self::root_key(root)))?;
        match id {
            Some(bytes) => {
                let id = String::from_utf8(bytes)
                    .map_err(|e| StorageError::Corruption(e.to_string()))?;
                self.get(&id)
            }
            None => Ok(None),
        }
    }

    pub fn exists(&self, id: &str) -> Result<bool, StorageError> {
        self.conn
            .with_conn(|conn| kv::exists(conn, TABLE, &Self::primary_key(id)))
    }

    /// Delete the neuron record and its secondary `root:` index entry.
    /// Does not cascade synapse deletion — that is `nmt-graph`'s job,
    /// which owns referential integrity across stores.
    pub fn delete(&self, id: &str) -> Result<(), StorageError> {
        let existing = self.get(id)?;
        self.conn.with_tx(|tx| {
            kv::delete(tx, TABLE, &Self::primary_key(id))?;
            if let Some(neuron) = &existing {
                kv::delete(tx, TABLE, &Self::root_key(&neuron.merkle_root))?;
            }
            Ok(())
        })
    }

    /// Enumerate all live neurons via the `neuron:` prefix range-scan.
    pub fn all(&self) -> Result<Vec<Neuron>, StorageError> {
        self.conn.with_conn(|conn| {
            kv::scan_prefix(conn, TABLE, "neuron:")?
                .into_iter()
                .map(|(_, bytes)| {
                    serde_json::from_slice(&bytes).map_err(|e| to_storage_err(e.to_string()))
                })
                .collect()
        })
    }

    pub fn count(&self) -> Result<usize, StorageError> {
        self.conn
            .with_conn(|conn| kv::count_prefix(conn, TABLE, "neuron:"))
    }

    pub fn compact(&self) -> Result<(), StorageError> {
        self.conn.checkpoint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use nmt_core::models::NeuronMetadata;

    fn neuron(id: &str, root: &str) -> Neuron {
        Neuron {
            id: id.to_string(),
            embedding: vec![1.0, 0.0, 0.0],
            chunk_hashes: vec!["abc".to_string()],
            merkle_root: root.to_string(),
            metadata: NeuronMetadata::new("note"),
            outgoing_synapses: vec![],
            incoming_synapses: vec![],
        }
    }

    #[test]
    fn put_then_get_round_trips() {
        let store = NeuronStore::open_in_memory().unwrap();
        let n = neuron("n1", "root1");
        store.put(&n).unwrap();
        let got = store.get("n1").unwrap().unwrap();
        assert_eq!(got.embedding, n.embedding);
    }

    #[test]
    fn lookup_by_merkle_root() {
        let store = NeuronStore::open_in_memory().unwrap();
        let n = neuron("n1", "root1");
        store.put(&n).unwrap();
        let got = store.get_by_merkle_root("root1").unwrap().unwrap();
        assert_eq!(got.id, "n1");
    }

    #[test]
    fn delete_removes_both_keys() {
        let store = NeuronStore::open_in_memory().unwrap();
        let n = neuron("n1", "root1");
        store.put(&n).unwrap();
        store.delete("n1").unwrap();
        assert!(store.get("n1").unwrap().is_none());
        assert!(store.get_by_merkle_root("root1").unwrap().is_none());
    }

    #[test]
    fn all_enumerates_every_live_neuron_via_prefix_scan() {
        let store = NeuronStore::open_in_memory().unwrap();
        store.put(&neuron("n1", "r1")).unwrap();
        store.put(&neuron("n2", "r2")).unwrap();
        let all = store.all().unwrap();
        assert_eq!(all.len(), 2);
        let _ = Utc::now();
    }
}
