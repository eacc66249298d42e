//! A* search over a `BoundedGraph` toward a goal embedding (spec §4.4).
//!
//! `cost(u,v) = max(0.01, (1 - w_uv) - bonus(u,v))`, `bonus = 0.5 *
//! max(0, d(u,goal) - d(v,goal))`. The heuristic `h(n) = clamp(1 -
//! cos(v(n), v(goal)), 0, 1)` is clamped because raw `1 - cos` ranges over
//! `[0, 2]` when similarities go negative, and an unclamped heuristic
//! could overestimate the remaining cost and break admissibility.

use std::collections::HashMap;

use petgraph::visit::EdgeRef;

use nmt_core::config::PlannerConfig;
use nmt_core::errors::PlannerError;

use crate::graph::BoundedGraph;
use crate::heuristics::distance;

/// One A*/Yen/bidirectional search result: the path as a sequence of
/// neuron ids, its total cost, how many nodes the search popped, the
/// path's success probability (`product(1 - cost_edge)`), and the edges
/// whose cost exceeds `bottleneck_ratio * mean_edge_cost`.
#[derive(Debug, Clone)]
pub struct PathResult {
    pub path: Vec<String>,
    pub total_cost: f64,
    pub nodes_explored: usize,
    pub path_probability: f64,
    pub bottlenecks: Vec<(String, String)>,
}

/// Min-heap entry ordered by ascending `f`; `Ord` is reversed from the
/// natural `f64` order so `BinaryHeap` (a max-heap) pops the smallest `f`.
#[derive(Clone)]
struct HeapItem {
    f: f64,
    node: String,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f
    }
}
impl Eq for HeapItem {}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other.f.partial_cmp(&self.f).unwrap_or(std::cmp::Ordering::Equal)
    }
}

fn heuristic(embedding: &[f32], goal_embedding: &[f32]) -> f64 {
    distance(embedding, goal_embedding).clamp(0.0, 1.0)
}

/// Result of the core expansion loop before path-statistics are derived:
/// either the normal embedding-similarity goal test fired, or (when
/// `stop_nodes` is given, used by bidirectional search) the search
/// reached one of those nodes directly.
pub(crate) struct CoreResult {
    pub path: Vec<String>,
    pub nodes_explored: usize,
}

/// Shared forward-expansion loop. `stop_nodes`, when given, is checked
/// before the embedding goal test — used by bidirectional search to stop
/// as soon as the forward frontier touches the backward-reachable set.
pub(crate) fn run(
    bounded: &BoundedGraph,
    start: &str,
    goal_embedding: &[f32],
    config: &PlannerConfig,
    edge_penalties: &HashMap<(String, String), f64>,
    stop_nodes: Option<&std::collections::HashSet<String>>,
) -> Result<CoreResult, PlannerError> {
    use std::collections::BinaryHeap;

    let Some(_) = bounded.node_index(start) else {
        return Err(PlannerError::InvalidAttractor(format!(
            "start neuron {start} not present in the search graph"
        )));
    };

    let mut g_score: HashMap<String, f64> = HashMap::new();
    let mut came_from: HashMap<String, String> = HashMap::new();
    let mut depth: HashMap<String, usize> = HashMap::new();
    let mut open = BinaryHeap::new();
    let mut closed: std::collections::HashSet<String> = std::collections::HashSet::new();

    g_score.insert(start.to_string(), 0.0);
    depth.insert(start.to_string(), 0);
    let start_embedding = bounded.embedding(start).ok_or_else(|| {
        PlannerError::InvalidAttractor(format!("no embedding cached for {start}"))
    })?;
    open.push(HeapItem {
        f: config.heuristic_weight * heuristic(start_embedding, goal_embedding),
        node: start.to_string(),
    });

    let mut nodes_explored = 0usize;
    let mut goal_node: Option<String> = None;

    while let Some(item) = open.pop() {
        let current = item.node;
        if !closed.insert(current.clone()) {
            continue;
        }
        nodes_explored += 1;
        if nodes_explored > config.max_search_nodes {
            return Err(PlannerError::MaxNodesExceeded {
                max_nodes: config.max_search_nodes,
            });
        }

        if let Some(stop) = stop_nodes {
            if stop.contains(&current) {
                goal_node = Some(current);
                break;
            }
        } else {
            let current_embedding = bounded.embedding(&current).unwrap();
            if heuristic(current_embedding, goal_embedding) < (1.0 - config.goal_similarity_threshold) {
                goal_node = Some(current);
                break;
            }
        }

        let cur_depth = depth[&current];
        if cur_depth >= config.max_depth {
            continue;
        }

        let Some(cur_idx) = bounded.node_index(&current) else {
            continue;
        };
        let current_embedding = bounded.embedding(&current).unwrap().clone();
        let d_cur = distance(&current_embedding, goal_embedding);

        for edge in bounded.graph.edges(cur_idx) {
            let neighbor_idx = edge.target();
            let neighbor = bounded.graph[neighbor_idx].clone();
            let weight = *edge.weight();
            let neighbor_embedding = match bounded.embedding(&neighbor) {
                Some(e) => e,
                None => continue,
            };
            let d_nbr = distance(neighbor_embedding, goal_embedding);
            let bonus = 0.5 * (d_cur - d_nbr).max(0.0);
            let penalty = edge_penalties
                .get(&(current.clone(), neighbor.clone()))
                .copied()
                .unwrap_or(0.0);
            let cost = (1.0 - weight - bonus).max(0.01) + penalty;

            let tentative_g = g_score[&current] + cost;
            let better = tentative_g < *g_score.get(&neighbor).unwrap_or(&f64::INFINITY);
            if better {
                g_score.insert(neighbor.clone(), tentative_g);
                came_from.insert(neighbor.clone(), current.clone());
                depth.insert(neighbor.clone(), cur_depth + 1);
                let f = tentative_g + config.heuristic_weight * heuristic(neighbor_embedding, goal_embedding);
                open.push(HeapItem { f, node: neighbor });
            }
        }
    }

    let goal = goal_node.ok_or_else(|| PlannerError::NoPath {
        from: start.to_string(),
        to: "goal".to_string(),
    })?;

    let mut path = vec![goal.clone()];
    let mut cursor = goal;
    while let Some(prev) = came_from.get(&cursor) {
        path.push(prev.clone());
        cursor = prev.clone();
    }
    path.reverse();

    Ok(CoreResult { path, nodes_explored })
}

/// Recomputes edge costs along an already-found path (using the same
/// formula `run` used during search) and derives total cost, success
/// probability, and bottleneck edges.
pub(crate) fn summarize(
    bounded: &BoundedGraph,
    path: &[String],
    goal_embedding: &[f32],
    nodes_explored: usize,
    edge_penalties: &HashMap<(String, String), f64>,
    bottleneck_ratio: f64,
) -> PathResult {
    let mut edges: Vec<((String, String), f64)> = Vec::new();
    for pair in path.windows(2) {
        let (u, v) = (&pair[0], &pair[1]);
        let weight = bounded
            .node_index(u)
            .zip(bounded.node_index(v))
            .and_then(|(ui, vi)| bounded.graph.find_edge(ui, vi))
            .map(|e| bounded.graph[e])
            .unwrap_or(0.5);
        let d_cur = distance(bounded.embedding(u).unwrap(), goal_embedding);
        let d_nbr = distance(bounded.embedding(v).unwrap(), goal_embedding);
        let bonus = 0.5 * (d_cur - d_nbr).max(0.0);
        let penalty = edge_penalties.get(&(u.clone(), v.clone())).copied().unwrap_or(0.0);
        let cost = (1.0 - weight - bonus).max(0.01) + penalty;
        edges.push(((u.clone(), v.clone()), cost));
    }

    let total_cost: f64 = edges.iter().map(|(_, c)| c).sum();
    let mean_cost = if edges.is_empty() { 0.0 } else { total_cost / edges.len() as f64 };
    let bottlenecks = edges
        .iter()
        .filter(|(_, c)| mean_cost > 0.0 && *c > bottleneck_ratio * mean_cost)
        .map(|(e, _)| e.clone())
        .collect();
    let path_probability = edges.iter().map(|(_, c)| (1.0 - c).max(0.0)).product();

    PathResult {
        path: path.to_vec(),
        total_cost,
        nodes_explored,
        path_probability,
        bottlenecks,
    }
}

/// Plain A* from `start` to the region where `cos(embedding, goal) >
/// goal_similarity_threshold`, bounded by `config.max_depth` (hop count)
/// and `config.max_search_nodes` (nodes popped).
pub fn search(
    bounded: &BoundedGraph,
    start: &str,
    goal_embedding: &[f32],
    config: &PlannerConfig,
    edge_penalties: &HashMap<(String, String), f64>,
) -> Result<PathResult, PlannerError> {
    let core = run(bounded, start, goal_embedding, config, edge_penalties, None)?;
    Ok(summarize(
        bounded,
        &core.path,
        goal_embedding,
        core.nodes_explored,
        edge_penalties,
        config.bottleneck_ratio,
    ))
}
