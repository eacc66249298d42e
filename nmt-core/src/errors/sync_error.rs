use super::{JournalError, StorageError};

/// Errors from the CRDT-style synchronization kernel.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("vector clock value out of range: {0}")]
    InvalidClockValue(String),

    #[error("conflict could not be resolved for entity {entity_id}")]
    UnresolvedConflict { entity_id: String },

    #[error("no resolver registered for strategy {0}")]
    NoResolver(String),

    #[error("storage layer error: {0}")]
    Storage(String),

    #[error("journal error: {0}")]
    Journal(String),

    #[error("malformed change entry for entity {entity_id}: {reason}")]
    MalformedEntry { entity_id: String, reason: String },

    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),
}

impl From<StorageError> for SyncError {
    fn from(e: StorageError) -> Self {
        SyncError::Storage(e.to_string())
    }
}

impl From<JournalError> for SyncError {
    fn from(e: JournalError) -> Self {
        SyncError::Journal(e.to_string())
    }
}
