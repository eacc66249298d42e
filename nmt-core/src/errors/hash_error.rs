/// Errors from the chunk + Merkle commitment engine.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("chunk hash mismatch: expected {expected}, computed {computed}")]
    ChunkHashMismatch { expected: String, computed: String },

    #[error("merkle root mismatch: expected {expected}, computed {computed}")]
    MerkleMismatch { expected: String, computed: String },

    #[error("invalid merkle proof: {0}")]
    InvalidProof(String),

    #[error("empty chunk sequence, cannot build a tree")]
    EmptyTree,

    #[error("leaf index {index} out of bounds for {len} leaves")]
    LeafIndexOutOfBounds { index: usize, len: usize },

    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}
