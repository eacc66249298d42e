//! `synapse:<id>` -> serialized synapse; `source:<src>:<id>` and
//! `target:<tgt>:<id>` -> id, so outgoing/incoming enumeration is an
//! O(degree) prefix range-scan rather than a full-store scan (spec §4.5).

use std::path::Path;

use nmt_core::errors::StorageError;
use nmt_core::models::Synapse;

use crate::connection::WriteConnection;
use crate::{kv, migrations, to_storage_err};

const TABLE: &str = "synapses";

pub struct SynapseStore {
    conn: WriteConnection,
}

impl SynapseStore {
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
        format!("synapse:{id}")
    }

    fn source_key(src: &str, id: &str) -> String {
        format!("source:{src}:{id}")
    }

    fn target_key(tgt: &str, id: &str) -> String {
        format!("target:{tgt}:{id}")
    }

    /// Insert or replace a synapse record. Replacing mutates the weight
    /// in place without touching the secondary indexes, since source/
    /// target never change for an existing id.
    pub fn put(&self, synapse: &Synapse) -> Result<(), StorageError> {
        let value = serde_json::to_vec(synapse).map_err(|e| to_storage_err(e.to_string()))?;
        self.conn.with_tx(|tx| {
            kv::put(tx, TABLE, &Self::primary_key(&synapse.id), &value)?;
            kv::put(
                tx,
                TABLE,
                &Self::source_key(&synapse.source_id, &synapse.id),
                synapse.id.as_bytes(),
            )?;
            kv::put(
                tx,
                TABLE,
                &Self::target_key(&synapse.target_id, &synapse.id),
                synapse.id.as_bytes(),
            )
        })
    }

    pub fn get(&self, id: &str) -> Result<Option<Synapse>, StorageError> {
        self.conn.with_conn(|conn| {
            let raw = kv::get(conn, TABLE, &Self::primary_key(id))?;
            raw.map(|bytes| {
                serde_json::from_slice(&bytes).map_err(|e| to_storage_err(e.to_string()))
            })
            .transpose()
        })
    }

    /// Delete the synapse record and both secondary-index entries in one
    /// batch (spec §4.5: "delete-synapse batches the synapse record and
    /// both secondary-index entries").
    pub fn delete(&self, id: &str) -> Result<(), StorageError> {
        let existing = self.get(id)?;
        self.conn.with_tx(|tx| {
            kv::delete(tx, TABLE, &Self::primary_key(id))?;
            if let Some(syn) = &existing {
                kv::delete(tx, TABLE, &Self::source_key(&syn.source_id, id))?;
                kv::delete(tx, TABLE, &Self::target_key(&syn.target_id, id))?;
            }
            Ok(())
        })
    }

    /// Outgoing synapses from `source_id`, via the `source:` prefix index.
    pub fn by_source(&self, source_id: &str) -> Result<Vec<Synapse>, StorageError> {
        self.ids_then_load(&format!("source:{source_id}:"))
    }

    /// Incoming synapses into `target_id`, via the `target:` prefix index.
    pub fn by_target(&self, target_id: &str) -> Result<Vec<Synapse>, StorageError> {
        self.ids_then_load(&format!("target:{target_id}:"))
    }

    fn ids_then_load(&self, prefix: &str) -> Result<Vec<Synapse>, StorageError> {
        let entries = self
            .conn
            .with_conn(|conn| kv::scan_prefix(conn, TABLE, prefix))?;
        let mut out = Vec::with_capacity(entries.len());
        for (_, id_bytes) in entries {
            let id = String::from_utf8(id_bytes).map_err(|e| StorageError::Corruption(e.to_string()))?;
            if let Some(syn) = self.get(&id)? {
                out.push(syn);
            }
        }
        Ok(out)
    }

    pub fn all(&self) -> Result<Vec<Synapse>, StorageError> {
        self.conn.with_conn(|conn| {
            kv::scan_prefix(conn, TABLE, "synapse:")?
                .into_iter()
                .map(|(_, bytes)| {
                    serde_json::from_slice(&bytes).map_err(|e| to_storage_err(e.to_string()))
                })
                .collect()
        })
    }

    pub fn compact(&self) -> Result<(), StorageError> {
        self.conn.checkpoint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nmt_core::models::{SynapseMetadata, SynapseType};

    fn synapse(id: &str, src: &str, tgt: &str) -> Synapse {
        Synapse {
            id: id.to_string(),
            source_id: src.to_string(),
            target_id: tgt.to_string(),
            synapse_type: SynapseType::Semantic,
            weight: 0.5,
            metadata: SynapseMetadata::new(false),
        }
    }

    #[test]
    fn by_source_is_degree_bounded_not_full_scan() {
        let store = SynapseStore::open_in_memory().unwrap();
        store.put(&synapse("s1", "a", "b")).unwrap();
        store.put(&synapse("s2", "a", "c")).unwrap();
        store.put(&synapse("s3", "x", "y")).unwrap();

        let out = store.by_source("a").unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn delete_removes_record_and_both_indexes() {
        let store = SynapseStore::open_in_memory().unwrap();
        store.put(&synapse("s1", "a", "b")).unwrap();
        store.delete("s1").unwrap();
        assert!(store.get("s1").unwrap().is_none());
        assert!(store.by_source("a").unwrap().is_empty());
        assert!(store.by_target("b").unwrap().is_empty());
    }
}
