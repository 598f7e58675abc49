//! Events published while selecting recommenders.

use serde::{Deserialize, Serialize};

use super::evaluation::EvaluationResult;
use super::log_message::{LogLevel, LogMessage};
use super::project::Project;
use super::recommender::Recommender;
use crate::id::now_ms;

/// Event type constants
pub mod event_types {
    pub const EVALUATION_RESULT: &str = "recommender.evaluation_result";
    pub const EVALUATION_COMPLETE: &str = "selection.evaluation_complete";
    pub const EVALUATION_FAILED: &str = "recommender.evaluation_failed";
    pub const MISSING_FACTORY: &str = "recommender.missing_factory";
}

/// A user-visible notification about a selection run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskNotification {
    /// Event type (e.g., "recommender.evaluation_failed")
    pub event_type: String,
    pub project_id: i64,
    /// Acting user
    pub user: String,
    pub message: LogMessage,
    /// Unix timestamp in milliseconds
    pub created_at: i64,
}

/// Everything the selection stage tells the outside world about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecommenderEvent {
    /// A recommender was evaluated and a decision was made
    EvaluationResult {
        recommender_id: i64,
        recommender_name: String,
        project_id: i64,
        user: String,
        result: Option<EvaluationResult>,
        duration_ms: u64,
        active: bool,
    },
    /// Notification to render for the user
    Notification(TaskNotification),
}

impl RecommenderEvent {
    fn notification(event_type: &str, project: &Project, user: &str, message: LogMessage) -> Self {
        Self::Notification(TaskNotification {
            event_type: event_type.to_string(),
            project_id: project.id,
            user: user.to_string(),
            message,
            created_at: now_ms(),
        })
    }

    /// Create a recommender.evaluation_result event
    pub fn evaluation_result(
        recommender: &Recommender,
        user: &str,
        result: Option<EvaluationResult>,
        duration_ms: u64,
        active: bool,
    ) -> Self {
        Self::EvaluationResult {
            recommender_id: recommender.id,
            recommender_name: recommender.name.clone(),
            project_id: recommender.project_id,
            user: user.to_string(),
            result,
            duration_ms,
            active,
        }
    }

    /// Create a selection.evaluation_complete notification
    pub fn evaluation_complete(project: &Project, user: &str, source: &str) -> Self {
        Self::notification(
            event_types::EVALUATION_COMPLETE,
            project,
            user,
            LogMessage::info(source, "Evaluation complete"),
        )
    }

    /// Create a recommender.evaluation_failed notification
    pub fn evaluation_failed(project: &Project, user: &str, source: &str, recommender_name: &str, error: &str) -> Self {
        Self::notification(
            event_types::EVALUATION_FAILED,
            project,
            user,
            LogMessage::error(
                source,
                format!("Evaluation of recommender [{}] failed: {}", recommender_name, error),
            ),
        )
    }

    /// Create a recommender.missing_factory notification
    pub fn missing_factory(project: &Project, user: &str, source: &str, tool: &str) -> Self {
        Self::notification(
            event_types::MISSING_FACTORY,
            project,
            user,
            LogMessage::error(source, format!("No recommender factory available for {}", tool)),
        )
    }

    /// Event type string of this event
    pub fn event_type(&self) -> &str {
        match self {
            Self::EvaluationResult { .. } => event_types::EVALUATION_RESULT,
            Self::Notification(n) => &n.event_type,
        }
    }

    /// Severity to show the user
    pub fn level(&self) -> LogLevel {
        match self {
            Self::EvaluationResult { .. } => LogLevel::Info,
            Self::Notification(n) => n.message.level,
        }
    }

    /// Check if this event reports a failure
    pub fn is_failure(&self) -> bool {
        self.event_type() == event_types::EVALUATION_FAILED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AnnotationLayer;

    fn project() -> Project {
        Project::new(7, "demo")
    }

    #[test]
    fn test_evaluation_result_event() {
        let rec = Recommender::new(1, "ner", "tool", AnnotationLayer::new(3, 7, "ne"), "value");
        let event = RecommenderEvent::evaluation_result(&rec, "alice", None, 12, true);
        assert_eq!(event.event_type(), event_types::EVALUATION_RESULT);
        assert_eq!(event.level(), LogLevel::Info);
        assert!(!event.is_failure());
        match event {
            RecommenderEvent::EvaluationResult {
                recommender_id,
                project_id,
                active,
                ..
            } => {
                assert_eq!(recommender_id, 1);
                assert_eq!(project_id, 7);
                assert!(active);
            }
            _ => panic!("expected evaluation result"),
        }
    }

    #[test]
    fn test_evaluation_failed_names_recommender() {
        let event = RecommenderEvent::evaluation_failed(&project(), "alice", "SelectionTask", "ner", "boom");
        assert!(event.is_failure());
        assert_eq!(event.level(), LogLevel::Error);
        let RecommenderEvent::Notification(n) = event else {
            panic!("expected notification");
        };
        assert_eq!(n.user, "alice");
        assert_eq!(n.project_id, 7);
        assert!(n.message.message.contains("[ner]"));
        assert!(n.message.message.contains("boom"));
    }

    #[test]
    fn test_missing_factory() {
        let event = RecommenderEvent::missing_factory(&project(), "bob", "SelectionTask", "crf");
        assert_eq!(event.event_type(), event_types::MISSING_FACTORY);
        let RecommenderEvent::Notification(n) = event else {
            panic!("expected notification");
        };
        assert_eq!(n.message.message, "No recommender factory available for crf");
    }

    #[test]
    fn test_evaluation_complete() {
        let event = RecommenderEvent::evaluation_complete(&project(), "bob", "SelectionTask");
        assert_eq!(event.event_type(), event_types::EVALUATION_COMPLETE);
        assert_eq!(event.level(), LogLevel::Info);
    }

    #[test]
    fn test_serialization_is_tagged() {
        let event = RecommenderEvent::evaluation_complete(&project(), "bob", "SelectionTask");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "notification");
        assert_eq!(json["event_type"], event_types::EVALUATION_COMPLETE);
    }
}
