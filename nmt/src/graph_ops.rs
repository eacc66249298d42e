use nmt_core::errors::NmtError;
use nmt_core::models::{ChangeOperation, SynapseType};

use crate::{PruneReport, Store};

impl Store {
    /// `connect` (spec §6): creates a directed synapse (and its mirror
    /// when `bidirectional`), journaling each as an independent create.
    pub fn connect(
        &self,
        source_id: &str,
        target_id: &str,
        synapse_type: SynapseType,
        weight: Option<f64>,
        bidirectional: bool,
    ) -> Result<(String, Option<String>), NmtError> {
        let (forward, backward) = self
            .graph
            .connect(source_id, target_id, synapse_type, weight, bidirectional)?;

        self.sync.record_change(
            "synapse",
            ChangeOperation::Create,
            &forward,
            serde_json::json!({
                "source_id": source_id,
                "target_id": target_id,
                "synapse_type": synapse_type,
                "bidirectional": bidirectional,
            }),
        )?;
        if let Some(back_id) = &backward {
            self.sync.record_change(
                "synapse",
                ChangeOperation::Create,
                back_id,
                serde_json::json!({
                    "source_id": target_id,
                    "target_id": source_id,
                    "synapse_type": synapse_type,
                    "bidirectional": bidirectional,
                }),
            )?;
        }
        self.metrics.counter_inc("graph.connections");
        Ok((forward, backward))
    }

    /// `deleteNeuron` (spec §6): cascades every touching synapse and
    /// tombstones the HNSW node.
    pub fn delete_neuron(&self, id: &str) -> Result<(), NmtError> {
        self.graph.delete_neuron(id)?;
        self.sync
            .record_change("neuron", ChangeOperation::Delete, id, serde_json::json!({}))?;
        self.metrics.counter_inc("graph.deletions");
        Ok(())
    }

    pub fn prune_synapses(
        &self,
        min_weight: f64,
        min_activations: u64,
        dry_run: bool,
    ) -> Result<PruneReport, NmtError> {
        Ok(self.graph.prune_synapses(min_weight, min_activations, dry_run)?)
    }

    /// `recordFeedback`-adjacent online learning (spec §4.3, §8 scenario
    /// 6): nudges the neuron's embedding toward/away from `query_text`.
    pub fn record_feedback(&self, id: &str, query_text: &str, relevant: bool) -> Result<(), NmtError> {
        self.graph
            .record_feedback(id, query_text, relevant, self.embedder.as_ref())?;
        self.sync.record_change(
            "neuron",
            ChangeOperation::Update,
            id,
            serde_json::json!({"feedback_relevant": relevant}),
        )?;
        Ok(())
    }
}
