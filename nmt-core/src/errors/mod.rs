mod embedding_error;
mod graph_error;
mod hash_error;
mod hnsw_error;
mod journal_error;
mod nmt_error;
mod planner_error;
mod scheduler_error;
mod storage_error;
mod sync_error;

pub use embedding_error::EmbeddingError;
pub use graph_error::GraphError;
pub use hash_error::HashError;
pub use hnsw_error::HnswError;
pub use journal_error::JournalError;
pub use nmt_error::{ErrorKind, NmtError, NmtResult};
pub use planner_error::PlannerError;
pub use scheduler_error::SchedulerError;
pub use storage_error::StorageError;
pub use sync_error::SyncError;
