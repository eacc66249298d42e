/// Errors from the compaction scheduler / serial task queue.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("background task failed: {0}")]
    TaskFailed(String),

    #[error("scheduler already running")]
    AlreadyRunning,
}
