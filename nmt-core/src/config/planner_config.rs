use serde::{Deserialize, Serialize};

use super::defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub max_depth: usize,
    pub max_search_nodes: usize,
    pub heuristic_weight: f64,
    pub goal_similarity_threshold: f64,
    pub anchor_similarity_threshold: f64,
    pub bottleneck_ratio: f64,
    pub semantic_weight: f64,
    pub gradient_weight: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_depth: ASTAR_MAX_DEPTH,
            max_search_nodes: ASTAR_MAX_SEARCH_NODES,
            heuristic_weight: ASTAR_HEURISTIC_WEIGHT,
            goal_similarity_threshold: 0.9,
            anchor_similarity_threshold: 0.85,
            bottleneck_ratio: 1.5,
            semantic_weight: 0.4,
            gradient_weight: 0.6,
        }
    }
}
