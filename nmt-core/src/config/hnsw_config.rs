use serde::{Deserialize, Serialize};

use super::defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HnswConfig {
    pub m: usize,
    pub ef_construction: usize,
    pub ef_search: usize,
    pub tombstone_threshold: usize,
}

impl Default for HnswConfig {
    fn default() -> Self {
        Self {
            m: HNSW_M,
            ef_construction: HNSW_EF_CONSTRUCTION,
            ef_search: HNSW_EF_SEARCH,
            tombstone_threshold: HNSW_TOMBSTONE_THRESHOLD,
        }
    }
}

impl HnswConfig {
    /// `mL = 1 / ln(M)`, the level-generation scale factor.
    pub fn level_multiplier(&self) -> f64 {
        1.0 / (self.m as f64).ln()
    }
}
