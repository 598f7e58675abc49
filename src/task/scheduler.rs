//! Bounded worker-pool scheduler.
//!
//! Every enqueued task is spawned on the tokio runtime right away and then
//! waits for one of `max-workers` permits before it executes. Lifecycle events
//! are reported on an mpsc channel.

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use tokio::runtime::Handle;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;

use super::traits::{Task, TaskScheduler};
use crate::config::SchedulerConfig;
use crate::error::{RecselError, Result};

/// Lifecycle event of a scheduled task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    /// Task acquired a worker and began executing.
    Started { task_id: u64, title: String },
    /// Task finished successfully.
    Completed { task_id: u64, title: String },
    /// Task returned an error or panicked.
    Failed { task_id: u64, title: String, error: String },
}

impl TaskEvent {
    pub fn task_id(&self) -> u64 {
        match self {
            Self::Started { task_id, .. } | Self::Completed { task_id, .. } | Self::Failed { task_id, .. } => *task_id,
        }
    }
}

/// Handle to a spawned task.
struct RunningTask {
    title: String,
    handle: JoinHandle<()>,
}

/// Runs tasks concurrently, at most `max_workers` at a time.
pub struct WorkerPoolScheduler {
    permits: Arc<Semaphore>,
    event_tx: mpsc::Sender<TaskEvent>,
    running: Mutex<HashMap<u64, RunningTask>>,
}

/// Text of a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

impl WorkerPoolScheduler {
    /// Create a scheduler and the receiving end of its event channel.
    pub fn new(config: &SchedulerConfig) -> (Self, mpsc::Receiver<TaskEvent>) {
        let (event_tx, event_rx) = mpsc::channel(config.event_capacity.max(1));
        let scheduler = Self {
            permits: Arc::new(Semaphore::new(config.max_workers.max(1))),
            event_tx,
            running: Mutex::new(HashMap::new()),
        };
        (scheduler, event_rx)
    }

    fn running(&self) -> MutexGuard<'_, HashMap<u64, RunningTask>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of tasks spawned and not yet reaped
    pub fn running_count(&self) -> usize {
        self.running().len()
    }

    /// Titles of tasks spawned and not yet reaped
    pub fn running_titles(&self) -> Vec<String> {
        self.running().values().map(|t| t.title.clone()).collect()
    }

    /// Drop handles of finished tasks, returning how many were reaped.
    pub async fn reap_completed(&self) -> usize {
        let finished: Vec<(u64, RunningTask)> = {
            let mut running = self.running();
            let ids: Vec<u64> = running
                .iter()
                .filter(|(_, t)| t.handle.is_finished())
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter()
                .filter_map(|id| running.remove(&id).map(|t| (id, t)))
                .collect()
        };

        let count = finished.len();
        for (task_id, task) in finished {
            if let Err(e) = task.handle.await {
                tracing::error!(task_id, title = %task.title, error = ?e, "Task join failed");
            }
        }
        count
    }

    /// Wait until every task, including tasks enqueued by running tasks, has finished.
    pub async fn wait_idle(&self) {
        loop {
            let drained: Vec<(u64, RunningTask)> = self.running().drain().collect();
            if drained.is_empty() {
                return;
            }
            for (task_id, task) in drained {
                if let Err(e) = task.handle.await {
                    tracing::error!(task_id, title = %task.title, error = ?e, "Task join failed");
                }
            }
        }
    }

    /// Abort all running tasks, returning how many were aborted.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<(u64, RunningTask)> = self.running().drain().collect();
        for (task_id, task) in &drained {
            tracing::info!(task_id, title = %task.title, "Cancelling task");
            task.handle.abort();
        }
        drained.len()
    }
}

impl TaskScheduler for WorkerPoolScheduler {
    fn enqueue(&self, task: Arc<dyn Task>) -> Result<()> {
        let runtime = Handle::try_current().map_err(|e| RecselError::Scheduler(e.to_string()))?;

        let task_id = task.id();
        let title = task.title().to_string();
        let permits = Arc::clone(&self.permits);
        let event_tx = self.event_tx.clone();

        tracing::debug!(task_id, title = %title, "Enqueueing task");

        let handle = runtime.spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    let _ = event_tx
                        .send(TaskEvent::Failed {
                            task_id,
                            title: task.title().to_string(),
                            error: e.to_string(),
                        })
                        .await;
                    return;
                }
            };

            let title = task.title().to_string();
            let _ = event_tx
                .send(TaskEvent::Started {
                    task_id,
                    title: title.clone(),
                })
                .await;

            let outcome = AssertUnwindSafe(task.execute()).catch_unwind().await;
            let event = match outcome {
                Ok(Ok(())) => {
                    tracing::info!(task_id, title = %title, "Task completed");
                    TaskEvent::Completed { task_id, title }
                }
                Ok(Err(e)) => {
                    tracing::error!(task_id, title = %title, error = %e, "Task failed");
                    TaskEvent::Failed {
                        task_id,
                        title,
                        error: e.to_string(),
                    }
                }
                Err(payload) => {
                    let error = panic_message(payload.as_ref());
                    tracing::error!(task_id, title = %title, error = %error, "Task panicked");
                    TaskEvent::Failed { task_id, title, error }
                }
            };
            let _ = event_tx.send(event).await;
        });

        self.running().insert(task_id, RunningTask { title, handle });
        Ok(())
    }
}
