use serde::{Deserialize, Serialize};

use super::defaults::EMBEDDING_DIMENSIONS;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// "onnx" tries a local quantized transformer; "hashed" forces the
    /// deterministic fallback. "auto" tries onnx then falls back.
    pub provider: String,
    pub dimensions: usize,
    /// Bounded LRU cache of embeddings keyed by SHA3-256 of input text.
    pub cache_capacity: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "auto".to_string(),
            dimensions: EMBEDDING_DIMENSIONS,
            cache_capacity: 1000,
        }
    }
}
