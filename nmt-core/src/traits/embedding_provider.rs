use crate::errors::EmbeddingError;

/// The single capability the rest of the system needs from an embedding
/// backend: turn text into a unit-norm vector of a fixed dimension.
/// Model choice, batching, and caching are implementation details behind
/// this trait (spec §9 "embedding provider polymorphism").
pub trait EmbeddingProvider: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    fn dimensions(&self) -> usize;

    /// Human-readable name, surfaced in health reports and degraded-mode
    /// events (e.g. "onnx-minilm", "hashed-fallback").
    fn name(&self) -> &str;
}
