use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The relationship a synapse encodes between two neurons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SynapseType {
    Semantic,
    Temporal,
    Causal,
    Associative,
    Hierarchical,
    Duplicate,
    Inhibitory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynapseMetadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub activation_count: u64,
    pub last_activated: Option<DateTime<Utc>>,
    /// Set on both records of a bidirectional `connect()` call. This is
    /// informational only: each direction remains an independent record
    /// in the synapse store (see DESIGN.md open question).
    pub bidirectional: bool,
}

impl SynapseMetadata {
    pub fn new(bidirectional: bool) -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            activation_count: 0,
            last_activated: None,
            bidirectional,
        }
    }

    pub fn record_activation(&mut self, at: DateTime<Utc>) {
        self.activation_count += 1;
        self.last_activated = Some(at);
        self.updated_at = at;
    }
}

/// A typed, weighted directed edge between two neurons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Synapse {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub synapse_type: SynapseType,
    /// Always clamped to [0, 1].
    pub weight: f64,
    pub metadata: SynapseMetadata,
}

impl Synapse {
    pub fn clamp_weight(w: f64) -> f64 {
        w.clamp(0.0, 1.0)
    }
}
