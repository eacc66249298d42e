use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A goal region in embedding space used to bias path planning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attractor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub embedding: Vec<f32>,
    /// [0, 1], decays over time and is pruned once negligible.
    pub strength: f64,
    /// [0, 1].
    pub probability: f64,
    /// [1, 10].
    pub priority: u8,
    pub deadline: Option<DateTime<Utc>>,
    pub prerequisites: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub activations: u64,
}

impl Attractor {
    /// Strength decays if untouched for more than 24h of wall-clock time;
    /// pruned when strength < 0.01 and activations < 5 (spec §3 lifecycle).
    pub fn is_prunable(&self) -> bool {
        self.strength < 0.01 && self.activations < 5
    }

    pub fn hours_since_update(&self, now: DateTime<Utc>) -> f64 {
        now.signed_duration_since(self.updated_at).num_seconds() as f64 / 3600.0
    }
}
