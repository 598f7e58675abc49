//! Activation decision for a single recommender.

use serde::{Deserialize, Serialize};

use super::evaluation::EvaluationResult;
use super::recommender::Recommender;

/// A recommender together with its activation decision and the reason for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedRecommender {
    recommender: Recommender,
    evaluation_result: Option<EvaluationResult>,
    active: bool,
    reason: String,
}

impl EvaluatedRecommender {
    /// Activated because its evaluation met the threshold
    pub fn make_active(recommender: Recommender, result: EvaluationResult, reason: impl Into<String>) -> Self {
        Self {
            recommender,
            evaluation_result: Some(result),
            active: true,
            reason: reason.into(),
        }
    }

    /// Activated without evaluating (always-on or not evaluable)
    pub fn make_active_without_evaluation(recommender: Recommender, reason: impl Into<String>) -> Self {
        Self {
            recommender,
            evaluation_result: None,
            active: true,
            reason: reason.into(),
        }
    }

    /// Deactivated on the basis of an evaluation
    pub fn make_inactive(recommender: Recommender, result: EvaluationResult, reason: impl Into<String>) -> Self {
        Self {
            recommender,
            evaluation_result: Some(result),
            active: false,
            reason: reason.into(),
        }
    }

    /// Deactivated without evaluating (bad settings, missing tool)
    pub fn make_inactive_without_evaluation(recommender: Recommender, reason: impl Into<String>) -> Self {
        Self {
            recommender,
            evaluation_result: None,
            active: false,
            reason: reason.into(),
        }
    }

    pub fn recommender(&self) -> &Recommender {
        &self.recommender
    }

    pub fn evaluation_result(&self) -> Option<&EvaluationResult> {
        self.evaluation_result.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AnnotationLayer;

    fn recommender() -> Recommender {
        Recommender::new(1, "ner", "string-matcher", AnnotationLayer::new(3, 7, "ne"), "value")
    }

    #[test]
    fn test_active_with_evaluation() {
        let er = EvaluatedRecommender::make_active(recommender(), EvaluationResult::skipped(), "ok");
        assert!(er.is_active());
        assert!(er.evaluation_result().is_some());
        assert_eq!(er.reason(), "ok");
    }

    #[test]
    fn test_active_without_evaluation() {
        let er = EvaluatedRecommender::make_active_without_evaluation(recommender(), "always");
        assert!(er.is_active());
        assert!(er.evaluation_result().is_none());
    }

    #[test]
    fn test_inactive_variants() {
        let with = EvaluatedRecommender::make_inactive(recommender(), EvaluationResult::skipped(), "low");
        assert!(!with.is_active());
        assert!(with.evaluation_result().is_some());

        let without = EvaluatedRecommender::make_inactive_without_evaluation(recommender(), "bad");
        assert!(!without.is_active());
        assert!(without.evaluation_result().is_none());
        assert_eq!(without.recommender().name, "ner");
    }
}
