//! Shared test helpers used across crate test suites: a deterministic
//! embedding provider (no ONNX model required) and builders for the
//! core model types, so each crate's tests aren't rebuilding the same
//! fixture boilerplate.

use std::collections::BTreeSet;

use chrono::Utc;

use nmt_core::models::{
    Attractor, ChangeEntry, ChangeOperation, Neuron, NeuronKind, NeuronMetadata, Synapse,
    SynapseMetadata, SynapseType, VectorClock,
};
use nmt_core::traits::EmbeddingProvider;

pub use nmt_embeddings::providers::HashedEmbeddingProvider as DeterministicEmbeddingProvider;

/// A neuron with a deterministic embedding derived from `id`, suitable
/// for tests that need several distinguishable-but-reproducible neurons.
pub fn make_neuron(id: &str, dimensions: usize) -> Neuron {
    let provider = DeterministicEmbeddingProvider::new(dimensions);
    let embedding = provider.embed(id).expect("hashed embedding never fails");
    Neuron {
        id: id.to_string(),
        embedding,
        chunk_hashes: vec![format!("{id}-chunk-0")],
        merkle_root: format!("{id}-root"),
        metadata: NeuronMetadata::new("test-fixture"),
        outgoing_synapses: Vec::new(),
        incoming_synapses: Vec::new(),
    }
}

pub fn make_transient_neuron(id: &str, dimensions: usize, ttl_seconds: i64) -> Neuron {
    let mut neuron = make_neuron(id, dimensions);
    neuron.metadata.neuron_kind = Some(NeuronKind::Transient { ttl_seconds });
    neuron
}

pub fn make_synapse(source_id: &str, target_id: &str, synapse_type: SynapseType, weight: f64) -> Synapse {
    Synapse {
        id: format!("{source_id}->{target_id}:{synapse_type:?}"),
        source_id: source_id.to_string(),
        target_id: target_id.to_string(),
        synapse_type,
        weight: Synapse::clamp_weight(weight),
        metadata: SynapseMetadata::new(false),
    }
}

pub fn make_attractor(id: &str, name: &str, dimensions: usize) -> Attractor {
    let provider = DeterministicEmbeddingProvider::new(dimensions);
    let embedding = provider.embed(name).expect("hashed embedding never fails");
    let now = Utc::now();
    Attractor {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("test attractor {name}"),
        embedding,
        strength: 1.0,
        probability: 0.5,
        priority: 5,
        deadline: None,
        prerequisites: Vec::new(),
        created_at: now,
        updated_at: now,
        activations: 0,
    }
}

pub fn make_change_entry(entity_type: &str, entity_id: &str, sequence: u64) -> ChangeEntry {
    ChangeEntry {
        sequence,
        entity_type: entity_type.to_string(),
        operation: ChangeOperation::Create,
        entity_id: entity_id.to_string(),
        data: serde_json::json!({ "fixture": true }),
        vector_clock: VectorClock::new(),
        timestamp: Utc::now(),
        node_id: "test-node".to_string(),
        metadata: None,
    }
}

/// Tags commonly exercised by retrieval/graph tests.
pub fn tag_set(tags: &[&str]) -> BTreeSet<String> {
    tags.iter().map(|t| t.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_neuron_produces_unit_norm_embedding() {
        let n = make_neuron("n1", 32);
        assert!((n.embedding_norm() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn same_id_produces_identical_fixtures() {
        let a = make_neuron("n1", 16);
        let b = make_neuron("n1", 16);
        assert_eq!(a.embedding, b.embedding);
    }

    #[test]
    fn make_synapse_clamps_weight() {
        let s = make_synapse("a", "b", SynapseType::Semantic, 5.0);
        assert_eq!(s.weight, 1.0);
    }
}
