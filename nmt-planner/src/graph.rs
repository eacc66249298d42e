//! Materializes a bounded slice of the neuron/synapse graph as a
//! `petgraph::graph::DiGraph`, so A* can run over a plain in-memory graph
//! instead of hitting the store on every edge relaxation. The per-search
//! embedding cache (spec §4.4 "Caching") is this same structure's node
//! weight map — built once per search and dropped afterward.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};

use nmt_core::errors::{PlannerError, StorageError};
use nmt_storage::{NeuronStore, SynapseStore};

/// A bounded forward (or backward) BFS expansion of the synapse graph,
/// rooted at one neuron, with per-node embeddings cached alongside.
pub struct BoundedGraph {
    pub graph: DiGraph<String, f64>,
    pub index_of: HashMap<String, NodeIndex>,
    pub embeddings: HashMap<String, Vec<f32>>,
}

impl BoundedGraph {
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.index_of.get(id).copied()
    }

    pub fn embedding(&self, id: &str) -> Option<&Vec<f32>> {
        self.embeddings.get(id)
    }
}

/// BFS outward from `root` following outgoing synapses (`SynapseStore::by_source`)
/// when `forward` is true, or incoming synapses (`by_target`) when false —
/// used to walk the reverse graph for bidirectional search. Expansion stops
/// at `max_depth` hops or `max_nodes` visited, whichever comes first.
pub fn build_bounded(
    neurons: &NeuronStore,
    synapses: &SynapseStore,
    root: &str,
    max_depth: usize,
    max_nodes: usize,
    forward: bool,
) -> Result<BoundedGraph, PlannerError> {
    let mut graph = DiGraph::new();
    let mut index_of = HashMap::new();
    let mut embeddings = HashMap::new();
    let mut visited: HashSet<String> = HashSet::new();

    let root_neuron = neurons
        .get(root)
        .map_err(storage_err)?
        .ok_or_else(|| PlannerError::InvalidAttractor(format!("start neuron {root} not found")))?;

    let root_idx = graph.add_node(root.to_string());
    index_of.insert(root.to_string(), root_idx);
    embeddings.insert(root.to_string(), root_neuron.embedding);
    visited.insert(root.to_string());

    let mut queue: VecDeque<(String, usize)> = VecDeque::new();
    queue.push_back((root.to_string(), 0));

    while let Some((current_id, depth)) = queue.pop_front() {
        if depth >= max_depth || visited.len() >= max_nodes {
            continue;
        }

        let edges = if forward {
            synapses.by_source(&current_id).map_err(storage_err)?
        } else {
            synapses.by_target(&current_id).map_err(storage_err)?
        };

        for synapse in edges {
            let neighbor_id = if forward { synapse.target_id.clone() } else { synapse.source_id.clone() };

            if !index_of.contains_key(&neighbor_id) {
                if visited.len() >= max_nodes {
                    break;
                }
                let Some(neighbor) = neurons.get(&neighbor_id).map_err(storage_err)? else {
                    continue;
                };
                let idx = graph.add_node(neighbor_id.clone());
                index_of.insert(neighbor_id.clone(), idx);
                embeddings.insert(neighbor_id.clone(), neighbor.embedding);
                visited.insert(neighbor_id.clone());
                queue.push_back((neighbor_id.clone(), depth + 1));
            }

            let (source_node, target_node) = if forward {
                (current_id.clone(), neighbor_id.clone())
            } else {
                (neighbor_id.clone(), current_id.clone())
            };
            let source_idx = index_of[&source_node];
            let target_idx = index_of[&target_node];
            if graph.find_edge(source_idx, target_idx).is_none() {
                graph.add_edge(source_idx, target_idx, synapse.weight);
            }
        }
    }

    Ok(BoundedGraph { graph, index_of, embeddings })
}

fn storage_err(e: StorageError) -> PlannerError {
    PlannerError::InvalidAttractor(e.to_string())
}
