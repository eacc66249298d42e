//! Bidirectional A*: finds "anchor" neurons already close to the goal
//! embedding, walks backward from each anchor along incoming synapses to
//! build a small reachable set, then runs a forward search that stops the
//! instant it touches that set and stitches the two halves together.
//!
//! Meeting in the middle this way keeps the forward search's horizon
//! short when the goal region is deep in the graph, at the cost of the
//! up-front anchor scan. Falls back to plain A* when no anchor is close
//! enough to the goal to be worth anchoring on.

use std::collections::{HashMap, HashSet, VecDeque};

use nmt_core::config::PlannerConfig;
use nmt_core::errors::PlannerError;
use nmt_storage::{NeuronStore, SynapseStore};

use crate::astar::{self, PathResult};
use crate::graph::BoundedGraph;
use crate::heuristics::cosine;

/// A backward path from some node to the anchor it was reached from,
/// recorded as the node sequence `node -> ... -> anchor`.
struct BackwardReach {
    /// node id -> path from that node to its anchor (inclusive of both ends)
    paths: HashMap<String, Vec<String>>,
}

fn backward_bfs(synapses: &SynapseStore, anchor: &str, max_hops: usize, max_nodes: usize) -> Result<BackwardReach, PlannerError> {
    let mut paths: HashMap<String, Vec<String>> = HashMap::new();
    paths.insert(anchor.to_string(), vec![anchor.to_string()]);

    let mut queue: VecDeque<(String, usize)> = VecDeque::new();
    queue.push_back((anchor.to_string(), 0));
    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(anchor.to_string());

    while let Some((current, hops)) = queue.pop_front() {
        if hops >= max_hops || visited.len() >= max_nodes {
            continue;
        }
        let incoming = synapses
            .by_target(&current)
            .map_err(|e| PlannerError::InvalidAttractor(e.to_string()))?;
        for synapse in incoming {
            let predecessor = synapse.source_id.clone();
            if visited.contains(&predecessor) {
                continue;
            }
            if visited.len() >= max_nodes {
                break;
            }
            visited.insert(predecessor.clone());
            let mut path_to_anchor = vec![predecessor.clone()];
            path_to_anchor.extend(paths[&current].iter().cloned());
            paths.insert(predecessor.clone(), path_to_anchor);
            queue.push_back((predecessor, hops + 1));
        }
    }

    Ok(BackwardReach { paths })
}

/// Bidirectional search from `start` toward the region around
/// `goal_embedding`. Picks anchors as neurons whose cosine similarity to
/// the goal exceeds `config.anchor_similarity_threshold`; if none exist,
/// degrades to `astar::search`.
pub fn search(
    bounded: &BoundedGraph,
    neurons: &NeuronStore,
    synapses: &SynapseStore,
    start: &str,
    goal_embedding: &[f32],
    config: &PlannerConfig,
) -> Result<PathResult, PlannerError> {
    let all_neurons = neurons.all().map_err(|e| PlannerError::InvalidAttractor(e.to_string()))?;
    let anchors: Vec<String> = all_neurons
        .iter()
        .filter(|n| n.id != start)
        .filter(|n| cosine(&n.embedding, goal_embedding) > config.anchor_similarity_threshold)
        .map(|n| n.id.clone())
        .collect();

    if anchors.is_empty() {
        return astar::search(bounded, start, goal_embedding, config, &HashMap::new());
    }

    let half_depth = (config.max_depth / 2).max(1);
    let mut reach_map: HashMap<String, Vec<String>> = HashMap::new();
    for anchor in &anchors {
        let reach = backward_bfs(synapses, anchor, half_depth, config.max_search_nodes)?;
        for (node, path) in reach.paths {
            let better = reach_map
                .get(&node)
                .map(|existing| path.len() < existing.len())
                .unwrap_or(true);
            if better {
                reach_map.insert(node, path);
            }
        }
    }

    let stop_nodes: HashSet<String> = reach_map.keys().cloned().collect();
    let core = astar::run(bounded, start, goal_embedding, config, &HashMap::new(), Some(&stop_nodes))?;

    let meeting_node = core.path.last().cloned().unwrap_or_else(|| start.to_string());
    let mut full_path = core.path.clone();
    if let Some(backward_half) = reach_map.get(&meeting_node) {
        full_path.extend(backward_half.iter().skip(1).cloned());
    }

    Ok(astar::summarize(
        bounded,
        &full_path,
        goal_embedding,
        core.nodes_explored,
        &HashMap::new(),
        config.bottleneck_ratio,
    ))
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

    #[test]
    fn stitches_forward_and_backward_halves() {
        let neurons = NeuronStore::open_in_memory().unwrap();
        let synapses = SynapseStore::open_in_memory().unwrap();
        let ids_embeddings = [
            ("start", vec![1.0, 0.0]),
            ("mid", vec![0.6, 0.4]),
            ("near_goal", vec![0.1, 0.9]),
            ("goal", vec![0.0, 1.0]),
        ];
        for (id, e) in ids_embeddings.iter() {
            neurons.put(&neuron(id, e.clone())).unwrap();
        }
        synapses.put(&synapse("s1", "start", "mid", 0.9)).unwrap();
        synapses.put(&synapse("s2", "mid", "near_goal", 0.9)).unwrap();
        synapses.put(&synapse("s3", "near_goal", "goal", 0.9)).unwrap();

        let config = PlannerConfig {
            goal_similarity_threshold: 0.9,
            anchor_similarity_threshold: 0.8,
            max_depth: 10,
            ..PlannerConfig::default()
        };
        let bounded = crate::graph::build_bounded(&neurons, &synapses, "start", config.max_depth, config.max_search_nodes, true).unwrap();
        let goal = vec![0.0, 1.0];
        let result = search(&bounded, &neurons, &synapses, "start", &goal, &config).unwrap();
        assert_eq!(result.path.first().unwrap(), "start");
        assert_eq!(result.path.last().unwrap(), "goal");
    }

    #[test]
    fn falls_back_to_plain_search_without_anchors() {
        let neurons = NeuronStore::open_in_memory().unwrap();
        let synapses = SynapseStore::open_in_memory().unwrap();
        neurons.put(&neuron("start", vec![1.0, 0.0])).unwrap();
        neurons.put(&neuron("goal", vec![0.0, 1.0])).unwrap();
        synapses.put(&synapse("s1", "start", "goal", 0.9)).unwrap();

        let config = PlannerConfig {
            goal_similarity_threshold: 0.9,
            anchor_similarity_threshold: 0.999,
            ..PlannerConfig::default()
        };
        let bounded = crate::graph::build_bounded(&neurons, &synapses, "start", config.max_depth, config.max_search_nodes, true).unwrap();
        let goal = vec![0.0, 1.0];
        let result = search(&bounded, &neurons, &synapses, "start", &goal, &config).unwrap();
        assert_eq!(result.path, vec!["start".to_string(), "goal".to_string()]);
    }
}
