//! Serialization format (spec §4.2, §6): params, entry point, and per-node
//! `{id, embedding, layer, connections[layer] -> id[]}`. `Set<id>` is
//! materialized as a sorted array of ids (not internal indices), so the
//! snapshot is stable across compactions that renumber nodes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use nmt_core::errors::HnswError;

use crate::index::HnswIndex;
use crate::node::Node;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: String,
    pub embedding: Vec<f32>,
    pub layer: usize,
    /// `connections[layer]` is the sorted list of neighbor ids at that
    /// layer.
    pub connections: Vec<Vec<String>>,
    pub tombstoned: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HnswSnapshot {
    pub m: usize,
    pub ef_construction: usize,
    pub ef_search: usize,
    pub tombstone_threshold: usize,
    pub entry_point: Option<String>,
    pub nodes: Vec<NodeSnapshot>,
}

impl HnswSnapshot {
    pub fn from_index(index: &HnswIndex) -> Self {
        let (m, ef_construction, ef_search, tombstone_threshold) = index.params();
        let nodes = index.raw_nodes();
        let entry_point = index
            .raw_entry_point()
            .map(|idx| nodes[idx].id.clone());

        let node_snapshots = nodes
            .iter()
            .map(|n| NodeSnapshot {
                id: n.id.clone(),
                embedding: n.embedding.clone(),
                layer: n.layer,
                connections: n
                    .connections
                    .iter()
                    .map(|set| {
                        let mut ids: Vec<String> =
                            set.iter().map(|&idx| nodes[idx].id.clone()).collect();
                        ids.sort();
                        ids
                    })
                    .collect(),
                tombstoned: n.tombstoned,
            })
            .collect();

        Self {
            m,
            ef_construction,
            ef_search,
            tombstone_threshold,
            entry_point,
            nodes: node_snapshots,
        }
    }

    pub fn into_index(self) -> Result<HnswIndex, HnswError> {
        let mut id_to_idx: HashMap<String, usize> = HashMap::new();
        for (idx, n) in self.nodes.iter().enumerate() {
            if id_to_idx.insert(n.id.clone(), idx).is_some() {
                return Err(HnswError::IndexCorrupted(format!(
                    "duplicate id in snapshot: {}",
                    n.id
                )));
            }
        }

        let mut nodes = Vec::with_capacity(self.nodes.len());
        for snap in &self.nodes {
            let mut node = Node::new(snap.id.clone(), snap.embedding.clone(), snap.layer);
            node.tombstoned = snap.tombstoned;
            for (layer, ids) in snap.connections.iter().enumerate() {
                let mut set = std::collections::BTreeSet::new();
                for id in ids {
                    let idx = id_to_idx.get(id).ok_or_else(|| {
                        HnswError::IndexCorrupted(format!("dangling connection to {id}"))
                    })?;
                    set.insert(*idx);
                }
                if layer < node.connections.len() {
                    node.connections[layer] = set;
                } else {
                    return Err(HnswError::IndexCorrupted(
                        "connection layer exceeds node layer".to_string(),
                    ));
                }
            }
            nodes.push(node);
        }

        let entry_point = match &self.entry_point {
            Some(id) => Some(*id_to_idx.get(id).ok_or_else(|| {
                HnswError::IndexCorrupted(format!("entry point {id} not present in snapshot"))
            })?),
            None => None,
        };

        Ok(HnswIndex::from_parts(
            self.m,
            self.ef_construction,
            self.ef_search,
            self.tombstone_threshold,
            nodes,
            id_to_idx,
            entry_point,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nmt_core::config::HnswConfig;

    #[test]
    fn round_trip_preserves_count_ids_and_search() {
        let config = HnswConfig::default();
        let mut index = HnswIndex::new(&config);
        for i in 0..25 {
            index
                .insert(format!("n{i}"), vec![i as f32, 1.0, 0.0])
                .unwrap();
        }

        let snapshot = index.to_snapshot();
        let json = serde_json::to_vec(&snapshot).unwrap();
        let restored: HnswSnapshot = serde_json::from_slice(&json).unwrap();
        let restored_index = HnswIndex::from_snapshot(restored).unwrap();

        assert_eq!(restored_index.len(), index.len());
        assert!(restored_index.has("n10"));

        let results = restored_index.search(&[10.0, 1.0, 0.0], 1, None);
        assert_eq!(results[0].0, "n10");
    }

    #[test]
    fn dangling_connection_is_a_load_error() {
        let snapshot = HnswSnapshot {
            m: 16,
            ef_construction: 200,
            ef_search: 50,
            tombstone_threshold: 50,
            entry_point: Some("n0".to_string()),
            nodes: vec![NodeSnapshot {
                id: "n0".to_string(),
                embedding: vec![1.0, 0.0],
                layer: 0,
                connections: vec![vec!["ghost".to_string()]],
                tombstoned: false,
            }],
        };
        assert!(HnswIndex::from_snapshot(snapshot).is_err());
    }
}
