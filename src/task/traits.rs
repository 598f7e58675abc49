//! Task and scheduler interfaces.

use std::sync::Arc;

use async_trait::async_trait;

use super::context::TaskContext;
use super::monitor::TaskMonitor;
use crate::error::Result;

/// A unit of background work run by a [`TaskScheduler`].
#[async_trait]
pub trait Task: Send + Sync {
    /// Process-unique id
    fn id(&self) -> u64;

    /// Title shown while the task runs
    fn title(&self) -> &str;

    fn context(&self) -> &TaskContext;

    fn monitor(&self) -> &TaskMonitor;

    async fn execute(&self) -> Result<()>;

    /// Carry over the log of the task that scheduled this one.
    fn inherit_log(&self, prior: &dyn Task) {
        self.monitor().inherit(prior.monitor().messages());
    }
}

/// Accepts tasks for asynchronous execution.
pub trait TaskScheduler: Send + Sync {
    fn enqueue(&self, task: Arc<dyn Task>) -> Result<()>;
}
