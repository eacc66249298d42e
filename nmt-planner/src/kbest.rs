//! Yen-style k-best alternative paths: repeatedly re-run A*, each time
//! adding a fixed penalty to every edge of the previously found paths so
//! the next search is steered away from them rather than forbidden from
//! reusing individual nodes.

use std::collections::HashMap;

use nmt_core::config::PlannerConfig;
use nmt_core::errors::PlannerError;

use crate::astar::{self, PathResult};
use crate::graph::BoundedGraph;

/// Penalty added to every edge of a path once it has been returned, so a
/// later search prefers a different route instead of reusing it outright.
const ALTERNATIVE_EDGE_PENALTY: f64 = 2.0;

/// Finds up to `k` distinct paths from `start` toward `goal_embedding`,
/// ranked by discovery order (each successive search starts from the
/// fully-penalized graph left by the previous finds). Returns fewer than
/// `k` paths if the graph is exhausted before `k` are found.
pub fn k_best_paths(
    bounded: &BoundedGraph,
    start: &str,
    goal_embedding: &[f32],
    config: &PlannerConfig,
    k: usize,
) -> Result<Vec<PathResult>, PlannerError> {
    let mut penalties: HashMap<(String, String), f64> = HashMap::new();
    let mut results = Vec::with_capacity(k);

    for _ in 0..k {
        let found = match astar::search(bounded, start, goal_embedding, config, &penalties) {
            Ok(path) => path,
            Err(_) if !results.is_empty() => break,
            Err(e) => return Err(e),
        };

        for pair in found.path.windows(2) {
            let edge = (pair[0].clone(), pair[1].clone());
            *penalties.entry(edge).or_insert(0.0) += ALTERNATIVE_EDGE_PENALTY;
        }
        results.push(found);
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nmt_core::models::{Neuron, NeuronMetadata, Synapse, SynapseMetadata, SynapseType};
    use nmt_storage::{NeuronStore, SynapseStore};

    fn neuron(id: &str, embedding: Vec<f32>) -> Neuron {
        Neuron {
            id: id.to_string(),
            embedding,
            chunk_hashes: vec![],
            merkle_root: format!("{id}-root"),
            metadata: NeuronMetadata::new("note"),
            outgoing_synapses: vec![],
            incoming_synapses: vec![],
        }
    }

    fn synapse(id: &str, src: &str, tgt: &str, weight: f64) -> Synapse {
        Synapse {
            id: id.to_string(),
            source_id: src.to_string(),
            target_id: tgt.to_string(),
            synapse_type: SynapseType::Semantic,
            weight,
            metadata: SynapseMetadata::new(false),
        }
    }

    #[test]
    fn finds_multiple_routes_when_graph_has_forks() {
        let neurons = NeuronStore::open_in_memory().unwrap();
        let synapses = SynapseStore::open_in_memory().unwrap();
        neurons.put(&neuron("start", vec![1.0, 0.0])).unwrap();
        neurons.put(&neuron("mid_a", vec![0.6, 0.4])).unwrap();
        neurons.put(&neuron("mid_b", vec![0.5, 0.5])).unwrap();
        neurons.put(&neuron("goal", vec![0.0, 1.0])).unwrap();

        synapses.put(&synapse("s1", "start", "mid_a", 0.9)).unwrap();
        synapses.put(&synapse("s2", "start", "mid_b", 0.85)).unwrap();
        synapses.put(&synapse("s3", "mid_a", "goal", 0.9)).unwrap();
        synapses.put(&synapse("s4", "mid_b", "goal", 0.9)).unwrap();

        let config = PlannerConfig {
            goal_similarity_threshold: 0.9,
            ..PlannerConfig::default()
        };
        let bounded = crate::graph::build_bounded(&neurons, &synapses, "start", config.max_depth, config.max_search_nodes, true).unwrap();
        let goal = vec![0.0, 1.0];
        let paths = k_best_paths(&bounded, "start", &goal, &config, 2).unwrap();
        assert_eq!(paths.len(), 2);
        assert_ne!(paths[0].path, paths[1].path);
    }

    #[test]
    fn stops_early_when_no_further_alternatives_exist() {
        let neurons = NeuronStore::open_in_memory().unwrap();
        let synapses = SynapseStore::open_in_memory().unwrap();
        neurons.put(&neuron("start", vec![1.0, 0.0])).unwrap();
        neurons.put(&neuron("goal", vec![0.0, 1.0])).unwrap();
        synapses.put(&synapse("s1", "start", "goal", 0.9)).unwrap();

        let config = PlannerConfig {
            goal_similarity_threshold: 0.9,
            ..PlannerConfig::default()
        };
        let bounded = crate::graph::build_bounded(&neurons, &synapses, "start", config.max_depth, config.max_search_nodes, true).unwrap();
        let goal = vec![0.0, 1.0];
        let paths = k_best_paths(&bounded, "start", &goal, &config, 5).unwrap();
        assert_eq!(paths.len(), 1);
    }
}
