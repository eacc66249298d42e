//! Health reporting. Shape grounded on `cortex-core::models::health_report`'s
//! re-export list (`HealthMetrics`, `HealthReport`, `HealthStatus`,
//! `SubsystemHealth`); the teacher's own source for that module was not
//! retrieved into the pack, so the field shapes here are original,
//! following the names it exports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// The worse of the two statuses; used to roll subsystem checks up
    /// into one overall status.
    fn worse(self, other: Self) -> Self {
        use HealthStatus::*;
        match (self, other) {
            (Unhealthy, _) | (_, Unhealthy) => Unhealthy,
            (Degraded, _) | (_, Degraded) => Degraded,
            _ => Healthy,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsystemHealth {
    pub name: String,
    pub status: HealthStatus,
    pub detail: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl SubsystemHealth {
    pub fn healthy(name: impl Into<String>) -> Self {
        Self { name: name.into(), status: HealthStatus::Healthy, detail: None, checked_at: Utc::now() }
    }

    pub fn degraded(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { name: name.into(), status: HealthStatus::Degraded, detail: Some(detail.into()), checked_at: Utc::now() }
    }

    pub fn unhealthy(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { name: name.into(), status: HealthStatus::Unhealthy, detail: Some(detail.into()), checked_at: Utc::now() }
    }
}

/// Point-in-time counters summarized into the report (spec §4.2a HNSW
/// observability counters / tombstone-ratio gauge, §4.3a degraded-mode
/// embedding provider flag).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HealthMetrics {
    pub uptime_seconds: u64,
    pub neuron_count: u64,
    pub synapse_count: u64,
    pub hnsw_tombstone_ratio: f64,
    pub embedding_degraded_mode: bool,
    pub pending_sync_conflicts: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall: HealthStatus,
    pub subsystems: Vec<SubsystemHealth>,
    pub metrics: HealthMetrics,
    pub generated_at: DateTime<Utc>,
}

impl HealthReport {
    pub fn new(subsystems: Vec<SubsystemHealth>, metrics: HealthMetrics) -> Self {
        let overall = subsystems
            .iter()
            .map(|s| s.status)
            .fold(HealthStatus::Healthy, HealthStatus::worse);
        Self { overall, subsystems, metrics, generated_at: Utc::now() }
    }
}
