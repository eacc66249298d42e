use super::StorageError;

/// Errors from the neuron graph manager.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("neuron not found: {0}")]
    NeuronNotFound(String),

    #[error("synapse not found: {0}")]
    SynapseNotFound(String),

    #[error("referential integrity violation: {0}")]
    ReferentialIntegrity(String),

    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("storage layer error: {0}")]
    Storage(String),

    #[error("vector index error: {0}")]
    Index(String),

    #[error("embedding provider error: {0}")]
    Embedding(String),
}

impl From<StorageError> for GraphError {
    fn from(e: StorageError) -> Self {
        GraphError::Storage(e.to_string())
    }
}
