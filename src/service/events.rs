//! Outbound recommender events.

use tokio::sync::mpsc;

use crate::domain::{LogLevel, RecommenderEvent};

/// Receives events produced during selection.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: RecommenderEvent);
}

/// Forwards events into a bounded channel; events are dropped when it is full.
#[derive(Debug, Clone)]
pub struct ChannelEventPublisher {
    tx: mpsc::Sender<RecommenderEvent>,
}

impl ChannelEventPublisher {
    /// Create a publisher and the receiving end of its channel.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<RecommenderEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl EventPublisher for ChannelEventPublisher {
    fn publish(&self, event: RecommenderEvent) {
        if let Err(e) = self.tx.try_send(event) {
            match e {
                mpsc::error::TrySendError::Full(event) => {
                    tracing::warn!(event_type = event.event_type(), "Event channel full, dropping event");
                }
                mpsc::error::TrySendError::Closed(event) => {
                    tracing::debug!(event_type = event.event_type(), "Event channel closed");
                }
            }
        }
    }
}

/// Writes events to the log at their own severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventPublisher;

impl EventPublisher for TracingEventPublisher {
    fn publish(&self, event: RecommenderEvent) {
        match &event {
            RecommenderEvent::EvaluationResult {
                recommender_name,
                user,
                active,
                duration_ms,
                ..
            } => {
                tracing::info!(
                    recommender = %recommender_name,
                    user = %user,
                    active,
                    duration_ms,
                    "Recommender evaluated"
                );
            }
            RecommenderEvent::Notification(notification) => {
                let message = &notification.message.message;
                match event.level() {
                    LogLevel::Error => {
                        tracing::error!(event_type = %notification.event_type, user = %notification.user, "{message}")
                    }
                    LogLevel::Warn => {
                        tracing::warn!(event_type = %notification.event_type, user = %notification.user, "{message}")
                    }
                    LogLevel::Info => {
                        tracing::info!(event_type = %notification.event_type, user = %notification.user, "{message}")
                    }
                }
            }
        }
    }
}
