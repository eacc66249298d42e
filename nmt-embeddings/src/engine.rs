//! Wraps a provider chain and the two-tier cache behind one
//! `EmbeddingProvider` implementation, so the rest of the system never
//! needs to know whether an embedding came from ONNX, the hashed
//! fallback, or cache.

use std::path::Path;

use nmt_core::config::EmbeddingConfig;
use nmt_core::errors::EmbeddingError;
use nmt_core::traits::EmbeddingProvider;

use crate::cache::{CacheCoordinator, CacheHitTier};
use crate::providers::HashedEmbeddingProvider;

#[cfg(feature = "onnx")]
use crate::providers::OnnxEmbeddingProvider;

pub struct EmbeddingEngine {
    provider: Box<dyn EmbeddingProvider>,
    cache: CacheCoordinator,
    dimensions: usize,
}

impl EmbeddingEngine {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let provider = Self::select_provider(config)?;
        let cache = CacheCoordinator::new(config.cache_capacity as u64)?;
        Ok(Self {
            provider,
            cache,
            dimensions: config.dimensions,
        })
    }

    pub fn new_with_db_path(
        config: &EmbeddingConfig,
        cache_db_path: impl AsRef<Path>,
    ) -> Result<Self, EmbeddingError> {
        let provider = Self::select_provider(config)?;
        let cache =
            CacheCoordinator::new_with_db_path(config.cache_capacity as u64, cache_db_path)?;
        Ok(Self {
            provider,
            cache,
            dimensions: config.dimensions,
        })
    }

    /// "onnx" requires the feature compiled in and a model path; "hashed"
    /// always succeeds; "auto" tries onnx and falls back to hashed on any
    /// failure to load, rather than surfacing an error.
    fn select_provider(config: &EmbeddingConfig) -> Result<Box<dyn EmbeddingProvider>, EmbeddingError> {
        match config.provider.as_str() {
            "hashed" => Ok(Box::new(HashedEmbeddingProvider::new(config.dimensions))),
            "onnx" => Self::load_onnx(config.dimensions).map_err(|e| e),
            _ => match Self::load_onnx(config.dimensions) {
                Ok(provider) => Ok(provider),
                Err(_) => Ok(Box::new(HashedEmbeddingProvider::new(config.dimensions))),
            },
        }
    }

    #[cfg(feature = "onnx")]
    fn load_onnx(dimensions: usize) -> Result<Box<dyn EmbeddingProvider>, EmbeddingError> {
        let path = std::env::var("NMT_EMBEDDING_MODEL_PATH").map_err(|_| {
            EmbeddingError::ProviderUnavailable("NMT_EMBEDDING_MODEL_PATH not set".into())
        })?;
        let provider = OnnxEmbeddingProvider::load(path, dimensions)?;
        Ok(Box::new(provider))
    }

    #[cfg(not(feature = "onnx"))]
    fn load_onnx(_dimensions: usize) -> Result<Box<dyn EmbeddingProvider>, EmbeddingError> {
        Err(EmbeddingError::ProviderUnavailable(
            "onnx feature not compiled in".into(),
        ))
    }

    pub fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed(text)
    }

    pub fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Whether the configured primary provider (as opposed to the hashed
    /// fallback baked into every chain) is actually serving embeddings.
    pub fn is_available(&self) -> bool {
        self.provider.name() != "hashed-fallback"
    }

    pub fn last_cache_hit_tier(&self, text: &str) -> Result<CacheHitTier, EmbeddingError> {
        Ok(self.cache.get(text)?.1)
    }
}

impl EmbeddingProvider for EmbeddingEngine {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let (cached, _tier) = self.cache.get(text)?;
        if let Some(v) = cached {
            return Ok(v);
        }
        let embedding = self.provider.embed(text)?;
        self.cache.put(text, &embedding)?;
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        self.provider.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EmbeddingConfig {
        EmbeddingConfig {
            provider: "hashed".to_string(),
            dimensions: 32,
            cache_capacity: 100,
        }
    }

    #[test]
    fn hashed_provider_is_used_when_requested() {
        let engine = EmbeddingEngine::new(&config()).unwrap();
        assert_eq!(engine.name(), "hashed-fallback");
        assert!(!engine.is_available());
    }

    #[test]
    fn auto_falls_back_to_hashed_without_onnx_model() {
        let mut cfg = config();
        cfg.provider = "auto".to_string();
        let engine = EmbeddingEngine::new(&cfg).unwrap();
        assert_eq!(engine.name(), "hashed-fallback");
    }

    #[test]
    fn repeated_embed_of_same_text_is_served_from_cache() {
        let engine = EmbeddingEngine::new(&config()).unwrap();
        let a = engine.embed("cache me").unwrap();
        let b = engine.embed("cache me").unwrap();
        assert_eq!(a, b);
    }
}
