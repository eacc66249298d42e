/// Errors from the HNSW vector index.
#[derive(Debug, thiserror::Error)]
pub enum HnswError {
    #[error("duplicate id inserted into index: {0}")]
    DuplicateId(String),

    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("index snapshot is corrupted: {0}")]
    IndexCorrupted(String),

    #[error("index is empty")]
    EmptyIndex,

    #[error("id not present in index: {0}")]
    NotFound(String),
}
