use serde::{Deserialize, Serialize};

use super::defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub auto_connect_k: usize,
    pub auto_connect_threshold: f32,
    pub hebbian_rate: f64,
    pub inhibitory_rate: f64,
    pub working_memory_capacity: usize,
    pub episode_buffer_capacity: usize,
    pub pattern_complete_iterations: usize,
    pub pattern_complete_alpha: f64,
    pub dopamine_floor: f64,
    pub dopamine_decay: f64,
    pub dopamine_positive_delta: f64,
    pub dopamine_negative_delta: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            auto_connect_k: 5,
            auto_connect_threshold: 0.75,
            hebbian_rate: HEBBIAN_RATE,
            inhibitory_rate: INHIBITORY_RATE,
            working_memory_capacity: WORKING_MEMORY_CAPACITY,
            episode_buffer_capacity: EPISODE_BUFFER_CAPACITY,
            pattern_complete_iterations: 3,
            pattern_complete_alpha: 0.3,
            dopamine_floor: 0.1,
            dopamine_decay: 0.9,
            dopamine_positive_delta: 0.3,
            dopamine_negative_delta: 0.15,
        }
    }
}
