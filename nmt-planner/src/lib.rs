//! Attractor model and A* path planner over the neuron/synapse graph
//! (spec §3 "Attractor" lifecycle, §4.4 "Path planning").
//!
//! [`PlannerEngine`] owns attractor CRUD plus strength decay/pruning, and
//! exposes the three search modes over [`BoundedGraph`]: a single best
//! path ([`PlannerEngine::find_path_to_attractor`]), Yen-style k-best
//! alternatives ([`PlannerEngine::find_alternative_paths`]), and
//! anchor-based bidirectional search
//! ([`PlannerEngine::bidirectional_a_star`]).

mod astar;
mod bidirectional;
mod graph;
mod heuristics;
mod kbest;

pub use astar::PathResult;
pub use graph::BoundedGraph;
pub use heuristics::{calculate_influence, cosine, distance, transition_probabilities};

use chrono::Utc;
use uuid::Uuid;

use nmt_core::config::PlannerConfig;
use nmt_core::errors::PlannerError;
use nmt_core::models::Attractor;
use nmt_storage::{AttractorStore, NeuronStore, SynapseStore};

/// Composes the attractor store with the neuron/synapse graph to provide
/// attractor lifecycle management and embedding-space path planning.
pub struct PlannerEngine {
    attractors: AttractorStore,
    neurons: NeuronStore,
    synapses: SynapseStore,
    config: PlannerConfig,
}

impl PlannerEngine {
    pub fn new(
        attractors: AttractorStore,
        neurons: NeuronStore,
        synapses: SynapseStore,
        config: PlannerConfig,
    ) -> Self {
        Self { attractors, neurons, synapses, config }
    }

    /// Registers a new attractor. `priority` is clamped to `[1, 10]`.
    pub fn create_attractor(
        &self,
        name: String,
        description: String,
        embedding: Vec<f32>,
        priority: u8,
        deadline: Option<chrono::DateTime<Utc>>,
        prerequisites: Vec<String>,
    ) -> Result<Attractor, PlannerError> {
        let now = Utc::now();
        let attractor = Attractor {
            id: Uuid::new_v4().to_string(),
            name,
            description,
            embedding,
            strength: 1.0,
            probability: 1.0,
            priority: priority.clamp(1, 10),
            deadline,
            prerequisites,
            created_at: now,
            updated_at: now,
            activations: 0,
        };
        self.attractors
            .put(&attractor)
            .map_err(|e| PlannerError::InvalidAttractor(e.to_string()))?;
        Ok(attractor)
    }

    pub fn get_attractor(&self, id: &str) -> Result<Attractor, PlannerError> {
        self.attractors
            .get(id)
            .map_err(|e| PlannerError::InvalidAttractor(e.to_string()))?
            .ok_or_else(|| PlannerError::AttractorNotFound(id.to_string()))
    }

    /// Decays every attractor's strength by wall-clock hours since its
    /// last update, recording an activation bump for attractors touched
    /// since then is the caller's job via `record_activation`; this only
    /// ages strength and prunes what falls below threshold. Returns the
    /// ids pruned.
    pub fn decay_and_prune(&self, half_life_hours: f64) -> Result<Vec<String>, PlannerError> {
        let now = Utc::now();
        let mut pruned = Vec::new();
        for mut attractor in self.attractors.all().map_err(|e| PlannerError::InvalidAttractor(e.to_string()))? {
            let elapsed = attractor.hours_since_update(now);
            if elapsed <= 0.0 {
                continue;
            }
            let decay = 0.5_f64.powf(elapsed / half_life_hours.max(0.01));
            attractor.strength = (attractor.strength * decay).max(0.0);
            attractor.updated_at = now;
            if attractor.is_prunable() {
                self.attractors
                    .delete(&attractor.id)
                    .map_err(|e| PlannerError::InvalidAttractor(e.to_string()))?;
                pruned.push(attractor.id);
            } else {
                self.attractors
                    .put(&attractor)
                    .map_err(|e| PlannerError::InvalidAttractor(e.to_string()))?;
            }
        }
        Ok(pruned)
    }

    /// Records that an attractor influenced a retrieval or plan, resetting
    /// its decay clock and bumping its activation count (spec §3).
    pub fn record_activation(&self, id: &str) -> Result<(), PlannerError> {
        let mut attractor = self.get_attractor(id)?;
        attractor.activations += 1;
        attractor.updated_at = Utc::now();
        attractor.strength = (attractor.strength + 0.1).min(1.0);
        self.attractors
            .put(&attractor)
            .map_err(|e| PlannerError::InvalidAttractor(e.to_string()))
    }

    fn bounded_graph(&self, start: &str) -> Result<BoundedGraph, PlannerError> {
        graph::build_bounded(&self.neurons, &self.synapses, start, self.config.max_depth, self.config.max_search_nodes, true)
    }

    /// Best single path from `start` to the named attractor's embedding.
    pub fn find_path_to_attractor(&self, start: &str, attractor_id: &str) -> Result<PathResult, PlannerError> {
        let attractor = self.get_attractor(attractor_id)?;
        let bounded = self.bounded_graph(start)?;
        astar::search(&bounded, start, &attractor.embedding, &self.config, &std::collections::HashMap::new())
    }

    /// Up to `k` distinct paths from `start` to the named attractor.
    pub fn find_alternative_paths(&self, start: &str, attractor_id: &str, k: usize) -> Result<Vec<PathResult>, PlannerError> {
        let attractor = self.get_attractor(attractor_id)?;
        let bounded = self.bounded_graph(start)?;
        kbest::k_best_paths(&bounded, start, &attractor.embedding, &self.config, k)
    }

    /// Anchor-based bidirectional search from `start` to the named
    /// attractor, falling back to plain A* when no anchors are found.
    pub fn bidirectional_a_star(&self, start: &str, attractor_id: &str) -> Result<PathResult, PlannerError> {
        let attractor = self.get_attractor(attractor_id)?;
        let bounded = self.bounded_graph(start)?;
        bidirectional::search(&bounded, &self.neurons, &self.synapses, start, &attractor.embedding, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nmt_core::models::{Neuron, NeuronMetadata, Synapse, SynapseMetadata, SynapseType};

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

    fn engine() -> PlannerEngine {
        PlannerEngine::new(
            AttractorStore::open_in_memory().unwrap(),
            NeuronStore::open_in_memory().unwrap(),
            SynapseStore::open_in_memory().unwrap(),
            PlannerConfig { goal_similarity_threshold: 0.9, ..PlannerConfig::default() },
        )
    }

    #[test]
    fn create_then_find_path_to_attractor() {
        let engine = engine();
        engine.neurons.put(&neuron("start", vec![1.0, 0.0])).unwrap();
        engine.neurons.put(&neuron("goal_node", vec![0.0, 1.0])).unwrap();
        engine.synapses.put(&synapse("s1", "start", "goal_node", 0.95)).unwrap();

        let attractor = engine
            .create_attractor("ship release".to_string(), "".to_string(), vec![0.0, 1.0], 5, None, vec![])
            .unwrap();

        let result = engine.find_path_to_attractor("start", &attractor.id).unwrap();
        assert_eq!(result.path, vec!["start".to_string(), "goal_node".to_string()]);
    }

    #[test]
    fn decay_prunes_weak_untouched_attractors() {
        let engine = engine();
        let attractor = engine
            .create_attractor("fading".to_string(), "".to_string(), vec![1.0, 0.0], 1, None, vec![])
            .unwrap();
        // Force it below the prune threshold directly, bypassing the
        // normal decay curve, to exercise the prune branch deterministically.
        let mut stale = engine.get_attractor(&attractor.id).unwrap();
        stale.strength = 0.005;
        stale.updated_at = Utc::now() - chrono::Duration::hours(1);
        engine.attractors.put(&stale).unwrap();

        let pruned = engine.decay_and_prune(24.0).unwrap();
        assert_eq!(pruned, vec![attractor.id]);
    }

    #[test]
    fn record_activation_resets_decay_clock() {
        let engine = engine();
        let attractor = engine
            .create_attractor("active".to_string(), "".to_string(), vec![1.0, 0.0], 5, None, vec![])
            .unwrap();
        engine.record_activation(&attractor.id).unwrap();
        let updated = engine.get_attractor(&attractor.id).unwrap();
        assert_eq!(updated.activations, 1);
    }
}
