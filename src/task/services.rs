//! Shared collaborators of the recommendation tasks.

use std::sync::Arc;

use crate::config::SelectionConfig;
use crate::engine::FactoryRegistry;
use crate::service::{ActiveRecommenders, DocumentSource, EventPublisher, RecommenderRepository, TracingEventPublisher};

use super::training::TrainingStage;
use super::traits::TaskScheduler;

/// Everything a selection or training task needs from its environment.
#[derive(Clone)]
pub struct RecommendationServices {
    pub repository: Arc<dyn RecommenderRepository>,
    pub documents: Arc<dyn DocumentSource>,
    pub factories: Arc<FactoryRegistry>,
    pub activation: Arc<ActiveRecommenders>,
    pub events: Arc<dyn EventPublisher>,
    pub scheduler: Arc<dyn TaskScheduler>,
    pub training: Arc<dyn TrainingStage>,
    pub config: Arc<SelectionConfig>,
}

impl RecommendationServices {
    /// Services with a fresh activation store, log-only events and default configuration.
    pub fn new(
        repository: Arc<dyn RecommenderRepository>,
        documents: Arc<dyn DocumentSource>,
        factories: Arc<FactoryRegistry>,
        scheduler: Arc<dyn TaskScheduler>,
        training: Arc<dyn TrainingStage>,
    ) -> Self {
        Self {
            repository,
            documents,
            factories,
            activation: Arc::new(ActiveRecommenders::new()),
            events: Arc::new(TracingEventPublisher),
            scheduler,
            training,
            config: Arc::new(SelectionConfig::default()),
        }
    }

    pub fn with_activation(mut self, activation: Arc<ActiveRecommenders>) -> Self {
        self.activation = activation;
        self
    }

    pub fn with_events(mut self, events: Arc<dyn EventPublisher>) -> Self {
        self.events = events;
        self
    }

    pub fn with_config(mut self, config: SelectionConfig) -> Self {
        self.config = Arc::new(config);
        self
    }
}

impl std::fmt::Debug for RecommendationServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationServices")
            .field("factories", &self.factories)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
