//! Follow-on training after a successful selection.

use std::sync::Arc;

use async_trait::async_trait;

use super::context::TaskContext;
use super::monitor::TaskMonitor;
use super::traits::Task;
use crate::error::Result;
use crate::id::generate_task_id;

/// Trains the active recommenders of a session.
#[async_trait]
pub trait TrainingStage: Send + Sync {
    async fn train(&self, context: &TaskContext, monitor: &TaskMonitor) -> Result<()>;
}

/// Task wrapper around a [`TrainingStage`].
pub struct TrainingTask {
    id: u64,
    context: TaskContext,
    monitor: TaskMonitor,
    stage: Arc<dyn TrainingStage>,
}

impl TrainingTask {
    pub const TITLE: &'static str = "Training recommenders...";

    pub fn new(context: TaskContext, stage: Arc<dyn TrainingStage>) -> Self {
        Self {
            id: generate_task_id(),
            context,
            monitor: TaskMonitor::new("TrainingTask"),
            stage,
        }
    }
}

#[async_trait]
impl Task for TrainingTask {
    fn id(&self) -> u64 {
        self.id
    }

    fn title(&self) -> &str {
        Self::TITLE
    }

    fn context(&self) -> &TaskContext {
        &self.context
    }

    fn monitor(&self) -> &TaskMonitor {
        &self.monitor
    }

    async fn execute(&self) -> Result<()> {
        let owner = self.context.session_owner()?;
        tracing::info!(
            task_id = self.id,
            user = %owner.username,
            trigger = %self.context.trigger,
            "Starting training"
        );
        self.stage.train(&self.context, &self.monitor).await
    }
}
