use serde::{Deserialize, Serialize};

use super::defaults::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkMode {
    Fixed,
    ContentDefined,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    pub mode: ChunkMode,
    pub fixed_chunk_size: usize,
    pub min_chunk_size: usize,
    pub max_chunk_size: usize,
    /// Rolling-fingerprint boundary mask; a boundary is declared when
    /// `fingerprint & mask == 0`.
    pub cdc_mask: u64,
    pub cdc_window: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            mode: ChunkMode::Fixed,
            fixed_chunk_size: CHUNK_SIZE_FIXED,
            min_chunk_size: CDC_MIN_CHUNK,
            max_chunk_size: CDC_MAX_CHUNK,
            cdc_mask: CDC_MASK,
            cdc_window: CDC_WINDOW,
        }
    }
}
