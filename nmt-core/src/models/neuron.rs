use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Provenance;

/// Lifecycle kind of a neuron. `Fact` neurons are permanent; `Transient`
/// neurons carry a time-to-live after which they become eligible for
/// garbage collection once no longer referenced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NeuronKind {
    Fact,
    Transient { ttl_seconds: i64 },
}

/// Mutable bookkeeping attached to a neuron: access stats, tags, and the
/// online-learning counters updated by `recordFeedback`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeuronMetadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub access_count: u64,
    pub source_type: String,
    pub tags: BTreeSet<String>,
    pub neuron_kind: Option<NeuronKind>,
    pub feedback_count: u64,
    pub embedding_drift: f64,
    pub provenance: Option<Provenance>,
}

impl NeuronMetadata {
    pub fn new(source_type: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            last_accessed: now,
            access_count: 0,
            source_type: source_type.into(),
            tags: BTreeSet::new(),
            neuron_kind: None,
            feedback_count: 0,
            embedding_drift: 0.0,
            provenance: None,
        }
    }

    /// True if this is a `Transient` neuron whose TTL has elapsed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match &self.neuron_kind {
            Some(NeuronKind::Transient { ttl_seconds }) => {
                now.signed_duration_since(self.created_at).num_seconds() > *ttl_seconds
            }
            _ => false,
        }
    }
}

/// A content-addressed document: a unit-norm embedding, an ordered list of
/// chunk hashes, the Merkle root committing that ordered sequence, and the
/// typed-graph edge lists connecting it to other neurons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neuron {
    pub id: String,
    pub embedding: Vec<f32>,
    pub chunk_hashes: Vec<String>,
    pub merkle_root: String,
    pub metadata: NeuronMetadata,
    pub outgoing_synapses: Vec<String>,
    pub incoming_synapses: Vec<String>,
}

impl Neuron {
    /// L2 norm of the embedding; should be 1.0 +/- a small epsilon for
    /// every stored neuron (spec invariant).
    pub fn embedding_norm(&self) -> f32 {
        self.embedding.iter().map(|x| x * x).sum::<f32>().sqrt()
    }
}
