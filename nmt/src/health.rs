use nmt_core::errors::NmtError;
use nmt_metrics::{HealthMetrics, HealthReport, SubsystemHealth};

use crate::Store;

impl Store {
    /// Aggregate health report (spec §3, §6) folding storage, embedding,
    /// sync, and HNSW subsystem checks into one overall status.
    pub fn health(&self) -> Result<HealthReport, NmtError> {
        let mut subsystems = Vec::new();

        subsystems.push(match self.neurons.count() {
            Ok(_) => SubsystemHealth::healthy("storage"),
            Err(e) => SubsystemHealth::unhealthy("storage", e.to_string()),
        });

        subsystems.push(if self.embedder.is_available() {
            SubsystemHealth::healthy("embedding")
        } else {
            SubsystemHealth::degraded("embedding", "using hashed fallback provider")
        });

        let pending_conflicts = self.sync.pending_conflicts().len() as u64;
        subsystems.push(if pending_conflicts == 0 {
            SubsystemHealth::healthy("sync")
        } else {
            SubsystemHealth::degraded("sync", format!("{pending_conflicts} pending conflicts"))
        });

        let tombstone_count = self.graph.index_tombstone_count();
        let index_len = self.graph.index_len().max(1);
        let tombstone_ratio = tombstone_count as f64 / index_len as f64;
        subsystems.push(if tombstone_ratio < 0.5 {
            SubsystemHealth::healthy("hnsw")
        } else {
            SubsystemHealth::degraded("hnsw", format!("tombstone ratio {tombstone_ratio:.2}"))
        });

        let neuron_count = self.neurons.count()? as u64;
        let synapse_count = self.synapses.all()?.len() as u64;

        self.metrics.gauge_set("hnsw.tombstone_ratio", tombstone_ratio);
        self.metrics.gauge_set("store.neuron_count", neuron_count as f64);

        let metrics = HealthMetrics {
            uptime_seconds: self.started_at.elapsed().as_secs(),
            neuron_count,
            synapse_count,
            hnsw_tombstone_ratio: tombstone_ratio,
            embedding_degraded_mode: !self.embedder.is_available(),
            pending_sync_conflicts: pending_conflicts,
        };

        Ok(HealthReport::new(subsystems, metrics))
    }

    pub fn index_snapshot_names(&self) -> Result<Vec<String>, NmtError> {
        Ok(self.index_store.list()?)
    }
}
