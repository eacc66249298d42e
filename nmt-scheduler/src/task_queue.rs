//! Single-consumer, bounded fire-and-forget task queue (spec §4.3 "step 7"
//! reinforcement dispatch). Grounded on `drift-storage::batch::BatchWriter`'s
//! channel-plus-dedicated-worker shape, adapted to a tokio mpsc channel and
//! a spawned task instead of a native thread, since this crate sits behind
//! the workspace's async runtime rather than driving its own.

use std::sync::Arc;

use nmt_core::errors::SchedulerError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// One unit of work the queue will run in submission order. Boxed so the
/// queue can carry arbitrary reinforcement closures (`reinforce_co_activation`,
/// `inhibit_co_activation`, `encode_episode`, ...) without a generic queue
/// per closure type.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

enum Command {
    Run(Task),
    Drain(tokio::sync::oneshot::Sender<()>),
}

/// Accepts tasks via `submit` and runs them one at a time, in order, on a
/// dedicated background task. Tasks that panic are caught individually so
/// one bad reinforcement update cannot wedge the queue.
pub struct SerialTaskQueue {
    tx: mpsc::Sender<Command>,
    worker: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl SerialTaskQueue {
    pub fn new(capacity: usize) -> Arc<Self> {
        let (tx, mut rx) = mpsc::channel(capacity);
        let worker = tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                match command {
                    Command::Run(task) => {
                        if let Err(panic) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(task)) {
                            tracing::error!(?panic, "serial task queue: task panicked");
                        }
                    }
                    Command::Drain(ack) => {
                        let _ = ack.send(());
                    }
                }
            }
        });
        Arc::new(Self { tx, worker: std::sync::Mutex::new(Some(worker)) })
    }

    /// Enqueues a task without waiting for it to run. Fire-and-forget:
    /// errors only if the queue itself has been shut down.
    pub fn submit(&self, task: Task) -> Result<(), SchedulerError> {
        self.tx
            .try_send(Command::Run(task))
            .map_err(|e| SchedulerError::TaskFailed(e.to_string()))
    }

    /// Waits until every task submitted before this call has run.
    pub async fn drain(&self) -> Result<(), SchedulerError> {
        let (ack_tx, ack_rx) = tokio::sync::oneshot::channel();
        self.tx
            .send(Command::Drain(ack_tx))
            .await
            .map_err(|e| SchedulerError::TaskFailed(e.to_string()))?;
        ack_rx.await.map_err(|e| SchedulerError::TaskFailed(e.to_string()))
    }

    /// Drains whatever is already queued, then aborts the worker task.
    /// Safe to call with other `Arc<SerialTaskQueue>` clones outstanding.
    pub async fn shutdown(&self) -> Result<(), SchedulerError> {
        self.drain().await?;
        if let Some(worker) = self.worker.lock().expect("worker mutex poisoned").take() {
            worker.abort();
        }
        Ok(())
    }
}
