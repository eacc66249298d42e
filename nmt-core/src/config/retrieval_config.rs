use serde::{Deserialize, Serialize};

use super::defaults::{RESULT_CAP_RETURNED, RESULT_CAP_TOTAL};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub default_k: usize,
    pub default_threshold: f32,
    pub bm25_k1: f64,
    /// Keyword weight bands by query-token count: (max_tokens, weight).
    /// Looked up in order; the last band with max_tokens == usize::MAX
    /// catches everything else.
    pub keyword_weight_bands: Vec<(usize, f64)>,
    pub co_activation_boost: f64,
    pub inhibitory_penalty: f64,
    pub working_memory_boost: f64,
    pub result_cap_total: usize,
    pub result_cap_returned: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_k: 10,
            default_threshold: 0.0,
            bm25_k1: 1.5,
            keyword_weight_bands: vec![(3, 0.15), (7, 0.25), (usize::MAX, 0.35)],
            co_activation_boost: 0.10,
            inhibitory_penalty: 0.08,
            working_memory_boost: 0.15,
            result_cap_total: RESULT_CAP_TOTAL,
            result_cap_returned: RESULT_CAP_RETURNED,
        }
    }
}

impl RetrievalConfig {
    /// Adaptive keyword weight per spec §4.3 step 5.
    pub fn keyword_weight_for(&self, token_count: usize) -> f64 {
        for (max_tokens, weight) in &self.keyword_weight_bands {
            if token_count <= *max_tokens {
                return *weight;
            }
        }
        self.keyword_weight_bands
            .last()
            .map(|(_, w)| *w)
            .unwrap_or(0.35)
    }
}
