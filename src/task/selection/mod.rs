//! Recommender selection.
//!
//! A selection run walks every enabled layer of a project, evaluates the
//! layer's recommenders and persists which of them are active. If anything
//! ended up active, a training task is scheduled for the same session.
//!
//! Recommender plugins are untrusted. Errors, panics and timeouts raised while
//! building or evaluating one recommender are reported for that recommender and
//! the run continues with the next one. Each evaluation runs on its own
//! thread under the configured deadline, so an engine that blocks instead of
//! awaiting still times out.

mod loader;
pub mod policy;

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

pub use loader::CorpusLoader;
use policy::Preflight;

use super::context::TaskContext;
use super::monitor::TaskMonitor;
use super::scheduler::panic_message;
use super::services::RecommendationServices;
use super::training::TrainingTask;
use super::traits::Task;
use crate::domain::{AnnotatedDocument, EvaluatedRecommender, EvaluationResult, Recommender, RecommenderEvent, User};
use crate::engine::RecommendationEngine;
use crate::error::{RecselError, Result};
use crate::id::generate_task_id;
use crate::split::PercentageBasedSplitter;

const SOURCE: &str = "SelectionTask";

/// How a selection run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// No recommender was found to evaluate
    NothingToDo,
    /// Recommenders were evaluated but none is active
    NothingActivated,
    /// A training task was enqueued
    TrainingScheduled,
}

/// Decision for one recommender and whether it came out of the activation policy.
enum Verdict {
    /// Settled up front or decided from an evaluation result
    Decided(EvaluatedRecommender),
    /// The recommender's tool is not registered; nothing was evaluated
    MissingFactory(EvaluatedRecommender),
}

/// Evaluates recommenders and decides which of them stay active.
pub struct SelectionTask {
    id: u64,
    context: TaskContext,
    monitor: TaskMonitor,
    services: RecommendationServices,
    outcome: Mutex<Option<SelectionOutcome>>,
}

impl SelectionTask {
    pub const TITLE: &'static str = "Activating trainable recommenders...";

    /// Create a selection task; the context must name a session owner.
    pub fn new(context: TaskContext, services: RecommendationServices) -> Result<Self> {
        context.session_owner()?;
        Ok(Self {
            id: generate_task_id(),
            context,
            monitor: TaskMonitor::new(SOURCE),
            services,
            outcome: Mutex::new(None),
        })
    }

    /// Outcome of the last completed run
    pub fn outcome(&self) -> Option<SelectionOutcome> {
        *self.outcome.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run the selection once.
    pub async fn run(&self) -> Result<SelectionOutcome> {
        let owner = self.context.session_owner()?.clone();
        let project = &self.context.project;
        let started = Instant::now();

        let splitter = PercentageBasedSplitter::from_config(&self.services.config.split)?;
        let corpus = CorpusLoader::new(
            Arc::clone(&self.services.documents),
            project.clone(),
            self.context.data_owner.clone(),
        );

        let layers = self.services.repository.list_annotation_layers(project).await?;
        self.monitor.set_max_progress(layers.len());

        let mut seen_recommender = false;
        for layer in &layers {
            self.monitor.increment_progress();

            if !layer.enabled {
                continue;
            }

            let recommenders = self.services.repository.list_recommenders(layer).await?;
            if recommenders.is_empty() {
                tracing::trace!(user = %owner.username, layer = %layer.ui_name, "No recommenders, skipping selection");
                continue;
            }

            let mut evaluated = Vec::with_capacity(recommenders.len());
            for stale in &recommenders {
                let Some(recommender) = self.freshen(&owner, stale).await else {
                    continue;
                };

                if !seen_recommender {
                    tracing::info!(user = %owner.username, trigger = %self.context.trigger, "Starting selection");
                    self.monitor
                        .info(format!("Starting selection triggered by [{}]", self.context.trigger));
                    seen_recommender = true;
                }

                self.monitor.info(recommender.name.clone());
                let evaluation_started = Instant::now();
                let attempt = AssertUnwindSafe(self.evaluate(&owner, &recommender, &corpus, &splitter))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|payload| {
                        Err(RecselError::PluginPanic {
                            recommender: recommender.name.clone(),
                            message: panic_message(payload.as_ref()),
                        })
                    });

                match attempt {
                    Ok(Verdict::MissingFactory(decision)) => evaluated.push(decision),
                    Ok(Verdict::Decided(decision)) => {
                        self.services.events.publish(RecommenderEvent::evaluation_result(
                            &recommender,
                            &owner.username,
                            decision.evaluation_result().cloned(),
                            evaluation_started.elapsed().as_millis() as u64,
                            decision.is_active(),
                        ));
                        evaluated.push(decision);
                    }
                    Err(e) => self.report_failure(&owner, &recommender, &e),
                }
            }

            self.services
                .activation
                .set_evaluated_recommenders(&owner, layer, evaluated);

            tracing::info!(user = %owner.username, layer = %layer.ui_name, "Evaluation complete");
            self.services
                .events
                .publish(RecommenderEvent::evaluation_complete(project, &owner.username, SOURCE));
        }

        if !seen_recommender {
            tracing::trace!(user = %owner.username, "No recommenders configured, skipping training");
            return Ok(SelectionOutcome::NothingToDo);
        }

        if !self.services.activation.has_active_recommenders(&owner, project) {
            tracing::debug!(user = %owner.username, "No recommenders active, skipping training");
            return Ok(SelectionOutcome::NothingActivated);
        }

        let duration_ms = started.elapsed().as_millis() as u64;
        tracing::debug!(task_id = self.id, user = %owner.username, duration_ms, "Selection complete");
        self.monitor.info(format!("Selection complete ({} ms).", duration_ms));

        self.schedule_training()?;
        Ok(SelectionOutcome::TrainingScheduled)
    }

    /// Current configuration of a recommender, or `None` if it is gone or disabled.
    async fn freshen(&self, owner: &User, stale: &Recommender) -> Option<Recommender> {
        let recommender = match self.services.repository.get_recommender(stale.id).await {
            Ok(Some(recommender)) => recommender,
            Ok(None) => {
                tracing::info!(
                    user = %owner.username,
                    recommender = %stale.name,
                    "Recommender no longer available, skipping"
                );
                return None;
            }
            Err(e) => {
                tracing::warn!(
                    user = %owner.username,
                    recommender = %stale.name,
                    error = %e,
                    "Cannot refresh recommender, skipping"
                );
                return None;
            }
        };

        if !recommender.enabled {
            tracing::debug!(user = %owner.username, recommender = %recommender.name, "Disabled, skipping");
            return None;
        }

        Some(recommender)
    }

    async fn evaluate(
        &self,
        owner: &User,
        recommender: &Recommender,
        corpus: &CorpusLoader,
        splitter: &PercentageBasedSplitter,
    ) -> Result<Verdict> {
        let factory = match policy::preflight(recommender, &self.services.factories) {
            Preflight::MissingFactory(decision) => {
                tracing::error!(
                    user = %owner.username,
                    recommender = %recommender.name,
                    tool = %recommender.tool,
                    "No recommender factory available"
                );
                self.services.events.publish(RecommenderEvent::missing_factory(
                    &self.context.project,
                    &owner.username,
                    SOURCE,
                    &recommender.tool,
                ));
                return Ok(Verdict::MissingFactory(decision));
            }
            Preflight::Settled(decision) => {
                self.narrate(recommender, &decision);
                return Ok(Verdict::Decided(decision));
            }
            Preflight::Evaluate(factory) => factory,
        };

        tracing::info!(user = %owner.username, recommender = %recommender.name, "Evaluating...");
        let engine = factory.build(recommender).map_err(|e| attribute(recommender, e))?;
        let documents = corpus.get().await?;

        let timeout = self.services.config.evaluation.timeout();
        let pending = spawn_evaluation(recommender, engine, documents, splitter.clone())?;
        let result = tokio::time::timeout(timeout, pending)
            .await
            .map_err(|_| RecselError::EvaluationTimeout {
                recommender: recommender.name.clone(),
                timeout_ms: self.services.config.evaluation.timeout_ms,
            })?
            .map_err(|e| attribute(recommender, e))?;

        let decision = policy::decide(recommender.clone(), result);
        self.narrate(recommender, &decision);
        Ok(Verdict::Decided(decision))
    }

    fn narrate(&self, recommender: &Recommender, decision: &EvaluatedRecommender) {
        let skipped = decision
            .evaluation_result()
            .is_some_and(|r| r.is_evaluation_skipped());

        if decision.is_active() {
            tracing::info!(recommender = %recommender.name, reason = %decision.reason(), "Activated");
            self.monitor
                .info(format!("Recommender [{}] activated: {}", recommender.name, decision.reason()));
        } else if skipped {
            tracing::info!(recommender = %recommender.name, reason = %decision.reason(), "Not activated");
            self.monitor
                .warn(format!("Recommender [{}] not activated: {}", recommender.name, decision.reason()));
        } else {
            tracing::info!(recommender = %recommender.name, reason = %decision.reason(), "Not activated");
            self.monitor
                .info(format!("Recommender [{}] not activated: {}", recommender.name, decision.reason()));
        }
    }

    fn report_failure(&self, owner: &User, recommender: &Recommender, error: &RecselError) {
        tracing::error!(
            user = %owner.username,
            recommender = %recommender.name,
            error = %error,
            "Evaluation failed"
        );
        self.monitor
            .error(format!("Evaluation of recommender [{}] failed: {}", recommender.name, error));
        self.services.events.publish(RecommenderEvent::evaluation_failed(
            &self.context.project,
            &owner.username,
            SOURCE,
            &recommender.name,
            &error.to_string(),
        ));
    }

    fn schedule_training(&self) -> Result<()> {
        let training = TrainingTask::new(
            self.context.retrigger("SelectionTask after activating recommenders"),
            Arc::clone(&self.services.training),
        );
        training.inherit_log(self);
        self.services.scheduler.enqueue(Arc::new(training))
    }
}

/// Start an engine evaluation on a dedicated thread.
///
/// Engines may block instead of awaiting, so the evaluation is driven on its
/// own thread through the current runtime's handle. The returned future
/// resolves when the thread reports back. Dropping it abandons the thread,
/// which then runs to completion unobserved.
fn spawn_evaluation(
    recommender: &Recommender,
    engine: Box<dyn RecommendationEngine>,
    documents: Arc<Vec<AnnotatedDocument>>,
    splitter: PercentageBasedSplitter,
) -> Result<impl Future<Output = Result<EvaluationResult>> + Send + 'static> {
    let runtime = Handle::try_current().map_err(|e| RecselError::Scheduler(e.to_string()))?;
    let (tx, rx) = oneshot::channel();
    let name = recommender.name.clone();

    let thread_name = name.clone();
    std::thread::Builder::new()
        .name(format!("evaluate-{}", recommender.id))
        .spawn(move || {
            let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
                runtime.block_on(engine.evaluate(&documents, &splitter))
            }))
            .unwrap_or_else(|payload| {
                Err(RecselError::PluginPanic {
                    recommender: thread_name,
                    message: panic_message(payload.as_ref()),
                })
            });
            // The receiver is gone once the deadline passed
            let _ = tx.send(outcome);
        })?;

    Ok(async move {
        rx.await
            .unwrap_or_else(|_| Err(RecselError::plugin(name, "evaluation thread exited without a result")))
    })
}

/// Attribute an engine error to the recommender that raised it.
fn attribute(recommender: &Recommender, error: RecselError) -> RecselError {
    if error.is_plugin_fault() {
        error
    } else {
        RecselError::plugin(recommender.name.clone(), error.to_string())
    }
}

#[async_trait]
impl Task for SelectionTask {
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
        let outcome = self.run().await?;
        tracing::debug!(task_id = self.id, outcome = ?outcome, "Selection finished");
        *self.outcome.lock().unwrap_or_else(PoisonError::into_inner) = Some(outcome);
        Ok(())
    }
}
