use super::{
    EmbeddingError, GraphError, HashError, HnswError, JournalError, PlannerError, SchedulerError,
    StorageError, SyncError,
};

/// Coarse classification used by callers to decide how to react to an
/// error (retry, surface to the user, treat as normal control flow, ...).
/// See spec §7: NotFound / InvalidInput / IntegrityFailure / Conflict /
/// Transient / Fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    IntegrityFailure,
    Conflict,
    Transient,
    Fatal,
}

/// Top-level error type for the memory store. All subsystem errors convert
/// into this via `From` impls, the way `CortexError` aggregates its
/// subsystems.
#[derive(Debug, thiserror::Error)]
pub enum NmtError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("concurrency error: {0}")]
    Concurrency(String),

    #[error("hash/merkle error: {0}")]
    Hash(#[from] HashError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("hnsw error: {0}")]
    Hnsw(#[from] HnswError),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("planner error: {0}")]
    Planner(#[from] PlannerError),

    #[error("journal error: {0}")]
    Journal(#[from] JournalError),

    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

pub type NmtResult<T> = Result<T, NmtError>;

impl NmtError {
    /// Classify this error per the taxonomy in spec §7.
    pub fn kind(&self) -> ErrorKind {
        match self {
            NmtError::NotFound(_) => ErrorKind::NotFound,
            NmtError::Storage(StorageError::NotFound(_)) => ErrorKind::NotFound,
            NmtError::Graph(GraphError::NeuronNotFound(_) | GraphError::SynapseNotFound(_)) => {
                ErrorKind::NotFound
            }
            NmtError::Hnsw(HnswError::NotFound(_)) => ErrorKind::NotFound,
            NmtError::Planner(PlannerError::AttractorNotFound(_)) => ErrorKind::NotFound,

            NmtError::InvalidInput(_)
            | NmtError::Config(_)
            | NmtError::Hnsw(HnswError::DuplicateId(_) | HnswError::DimensionMismatch { .. })
            | NmtError::Embedding(EmbeddingError::DimensionMismatch { .. })
            | NmtError::Graph(GraphError::DimensionMismatch { .. })
            | NmtError::Hash(HashError::DimensionMismatch { .. })
            | NmtError::Planner(PlannerError::InvalidAttractor(_)) => ErrorKind::InvalidInput,

            NmtError::Hash(
                HashError::ChunkHashMismatch { .. }
                | HashError::MerkleMismatch { .. }
                | HashError::InvalidProof(_)
                | HashError::EmptyTree
                | HashError::LeafIndexOutOfBounds { .. },
            )
            | NmtError::Storage(StorageError::Corruption(_))
            | NmtError::Journal(
                JournalError::EntryCorrupted { .. } | JournalError::MetaCorrupted,
            ) => ErrorKind::IntegrityFailure,

            NmtError::Sync(SyncError::UnresolvedConflict { .. }) => ErrorKind::Conflict,

            NmtError::Storage(StorageError::Io(_) | StorageError::Sqlite(_))
            | NmtError::Scheduler(SchedulerError::TaskFailed(_)) => ErrorKind::Transient,

            NmtError::Storage(StorageError::Fatal(_) | StorageError::PathEscape(_)) => {
                ErrorKind::Fatal
            }

            _ => ErrorKind::InvalidInput,
        }
    }

    /// Whether this error class is worth retrying with exponential backoff
    /// (spec §7: Transient, 3 attempts, 100ms base).
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }
}
