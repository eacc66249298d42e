use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::VectorClock;

/// The kind of mutation a change entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOperation {
    Create,
    Update,
    Delete,
}

/// One entry in the durable, per-node, strictly monotonic change journal.
/// `sequence` is dense and globally unique per node; `entity_type` names
/// the kind of record affected (`neuron`, `synapse`, `attractor`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub sequence: u64,
    pub entity_type: String,
    pub operation: ChangeOperation,
    pub entity_id: String,
    pub data: serde_json::Value,
    pub vector_clock: VectorClock,
    pub timestamp: DateTime<Utc>,
    pub node_id: String,
    pub metadata: Option<serde_json::Value>,
}

impl ChangeEntry {
    /// True when this entry carries `metadata.resolvedConflict == true`,
    /// i.e. it was produced by applying a remote change that won a
    /// conflict resolution pass rather than a local, first-hand mutation.
    pub fn is_resolved_conflict(&self) -> bool {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("resolvedConflict"))
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}
