/// Errors from the persistent KV stores.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("sqlite error: {0}")]
    Sqlite(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("store corruption: {0}")]
    Corruption(String),

    #[error("path escapes data directory: {0}")]
    PathEscape(String),

    #[error("data directory could not be opened: {0}")]
    Fatal(String),
}
