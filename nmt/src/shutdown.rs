use std::sync::Arc;

use nmt_core::errors::NmtError;
use nmt_hnsw::HnswIndex;

use crate::Store;

impl Store {
    /// Graceful shutdown (spec §6: SIGINT/SIGTERM stop schedulers, flush
    /// compactions, save the HNSW snapshot, close stores). Idempotent —
    /// the compaction scheduler is only stopped once.
    pub async fn shutdown(self: &Arc<Self>) -> Result<(), NmtError> {
        if let Some(mut scheduler) = self.compaction.lock().unwrap().take() {
            scheduler.stop();
        }

        self.task_queue.shutdown().await?;

        if self.graph.index_tombstone_count() > 0 {
            self.graph.compact_index();
        }

        let rebuilt = HnswIndex::from_snapshot(self.graph.index_snapshot())?;
        self.index_store.save("main", &rebuilt)?;

        self.chunks.compact()?;
        self.neurons.compact()?;
        self.synapses.compact()?;
        self.attractors.compact()?;

        Ok(())
    }
}
