/// Errors from the embedding provider capability.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("failed to encode text: {0}")]
    EncodeFailed(String),
}
