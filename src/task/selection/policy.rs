//! Activation decision for one recommender.
//!
//! Decisions are made in a fixed order, the first match winning:
//! 1. no factory for the tool: inactive
//! 2. factory rejects the layer/feature: inactive
//! 3. always selected: active
//! 4. tool not evaluable: active
//! 5. otherwise evaluate and compare the F1 score against the threshold
//!
//! Steps 1 to 4 are settled by [`preflight`]; step 5 by [`decide`] once an
//! evaluation result exists.

use std::sync::Arc;

use crate::domain::{EvaluatedRecommender, EvaluationResult, Recommender};
use crate::engine::{FactoryRegistry, RecommendationEngineFactory};

pub const REASON_INVALID_LAYER_OR_FEATURE: &str = "Invalid layer or feature";
pub const REASON_ALWAYS_SELECTED: &str = "Always selected";
pub const REASON_NOT_EVALUABLE: &str = "Not evaluable";

/// What to do with a recommender before any evaluation runs.
pub enum Preflight {
    /// The recommender's tool is not registered
    MissingFactory(EvaluatedRecommender),
    /// Decided without evaluating
    Settled(EvaluatedRecommender),
    /// Evaluate with an engine from this factory
    Evaluate(Arc<dyn RecommendationEngineFactory>),
}

pub fn preflight(recommender: &Recommender, factories: &FactoryRegistry) -> Preflight {
    let Some(factory) = factories.factory_for(recommender) else {
        return Preflight::MissingFactory(EvaluatedRecommender::make_inactive_without_evaluation(
            recommender.clone(),
            missing_factory_reason(&recommender.tool),
        ));
    };

    if !factory.accepts(&recommender.layer, &recommender.feature) {
        return Preflight::Settled(EvaluatedRecommender::make_inactive_without_evaluation(
            recommender.clone(),
            REASON_INVALID_LAYER_OR_FEATURE,
        ));
    }

    if recommender.always_selected {
        return Preflight::Settled(EvaluatedRecommender::make_active_without_evaluation(
            recommender.clone(),
            REASON_ALWAYS_SELECTED,
        ));
    }

    if !factory.is_evaluable() {
        return Preflight::Settled(EvaluatedRecommender::make_active_without_evaluation(
            recommender.clone(),
            REASON_NOT_EVALUABLE,
        ));
    }

    Preflight::Evaluate(factory)
}

/// Decide on a recommender from its evaluation result.
///
/// A skipped evaluation activates when the threshold is `<= 0`, scoring 0.
/// Otherwise the F1 score must reach the threshold; a tie activates.
pub fn decide(recommender: Recommender, result: EvaluationResult) -> EvaluatedRecommender {
    let threshold = recommender.threshold;

    if result.is_evaluation_skipped() {
        if recommender.evaluation_is_optional() {
            let reason = above_threshold_reason(0.0, threshold);
            return EvaluatedRecommender::make_active(recommender, result, reason);
        }
        let reason = failed_evaluation_reason(result.error_reason());
        return EvaluatedRecommender::make_inactive(recommender, result, reason);
    }

    let score = result.f1_score();
    if score >= threshold {
        let reason = above_threshold_reason(score, threshold);
        EvaluatedRecommender::make_active(recommender, result, reason)
    } else {
        let reason = format!("Score {} < threshold {}", format_number(score), format_number(threshold));
        EvaluatedRecommender::make_inactive(recommender, result, reason)
    }
}

pub fn missing_factory_reason(tool: &str) -> String {
    format!("No recommender factory available for {}", tool)
}

fn above_threshold_reason(score: f64, threshold: f64) -> String {
    format!("Score {} >= threshold {}", format_number(score), format_number(threshold))
}

fn failed_evaluation_reason(error: Option<&str>) -> String {
    format!("Evaluation could not be performed: {}", error.unwrap_or("unknown reason"))
}

/// Print with at most four decimals and no trailing zeros.
pub fn format_number(value: f64) -> String {
    let fixed = format!("{:.4}", value);
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    match trimmed {
        "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnnotatedDocument, AnnotationLayer, LabelPair};
    use crate::engine::RecommendationEngine;
    use crate::error::Result;
    use crate::split::DataSplitter;
    use async_trait::async_trait;

    struct NeverEngine;

    #[async_trait]
    impl RecommendationEngine for NeverEngine {
        async fn evaluate(&self, _: &[AnnotatedDocument], _: &dyn DataSplitter) -> Result<EvaluationResult> {
            Ok(EvaluationResult::skipped())
        }
    }

    struct TestFactory {
        accepts: bool,
        evaluable: bool,
    }

    impl RecommendationEngineFactory for TestFactory {
        fn id(&self) -> &str {
            "test"
        }

        fn accepts(&self, _layer: &AnnotationLayer, _feature: &str) -> bool {
            self.accepts
        }

        fn is_evaluable(&self) -> bool {
            self.evaluable
        }

        fn build(&self, _recommender: &Recommender) -> Result<Box<dyn RecommendationEngine>> {
            Ok(Box::new(NeverEngine))
        }
    }

    fn registry(accepts: bool, evaluable: bool) -> FactoryRegistry {
        FactoryRegistry::new().with_factory(Arc::new(TestFactory { accepts, evaluable }))
    }

    fn recommender(tool: &str) -> Recommender {
        Recommender::new(1, "ner", tool, AnnotationLayer::new(3, 1, "Entity"), "value")
    }

    fn scored(pairs: &[(&str, &str)]) -> EvaluationResult {
        let pairs = pairs.iter().map(|(gold, predicted)| LabelPair::new(*gold, *predicted)).collect();
        EvaluationResult::evaluated(pairs, 10, 3)
    }

    #[test]
    fn test_missing_factory_first() {
        let rec = recommender("unknown").always_selected();
        match preflight(&rec, &registry(true, true)) {
            Preflight::MissingFactory(e) => {
                assert!(!e.is_active());
                assert!(e.evaluation_result().is_none());
                assert_eq!(e.reason(), "No recommender factory available for unknown");
            }
            _ => panic!("expected missing factory"),
        }
    }

    #[test]
    fn test_invalid_layer_beats_always_selected() {
        let rec = recommender("test").always_selected();
        match preflight(&rec, &registry(false, true)) {
            Preflight::Settled(e) => {
                assert!(!e.is_active());
                assert_eq!(e.reason(), REASON_INVALID_LAYER_OR_FEATURE);
            }
            _ => panic!("expected settled"),
        }
    }

    #[test]
    fn test_always_selected_and_not_evaluable_activate() {
        let always = recommender("test").always_selected();
        assert!(matches!(
            preflight(&always, &registry(true, true)),
            Preflight::Settled(e) if e.is_active() && e.evaluation_result().is_none()
        ));

        let plain = recommender("test");
        assert!(matches!(
            preflight(&plain, &registry(true, false)),
            Preflight::Settled(e) if e.is_active() && e.reason() == REASON_NOT_EVALUABLE
        ));
        assert!(matches!(preflight(&plain, &registry(true, true)), Preflight::Evaluate(_)));
    }

    #[test]
    fn test_skipped_with_optional_threshold_activates() {
        for threshold in [0.0, -1.0] {
            let e = decide(recommender("test").with_threshold(threshold), EvaluationResult::skipped());
            assert!(e.is_active());
            assert!(e.evaluation_result().is_some());
        }
        let e = decide(recommender("test"), EvaluationResult::skipped());
        assert_eq!(e.reason(), "Score 0 >= threshold 0");
    }

    #[test]
    fn test_skipped_with_threshold_deactivates() {
        let e = decide(
            recommender("test").with_threshold(0.5),
            EvaluationResult::skipped_with_reason("Not enough data"),
        );
        assert!(!e.is_active());
        assert!(e.evaluation_result().is_some());
        assert_eq!(e.reason(), "Evaluation could not be performed: Not enough data");

        let e = decide(recommender("test").with_threshold(0.5), EvaluationResult::skipped());
        assert_eq!(e.reason(), "Evaluation could not be performed: unknown reason");
    }

    #[test]
    fn test_tie_activates() {
        let e = decide(
            recommender("test").with_threshold(0.5),
            scored(&[("A", "A"), ("B", "B"), ("C", "D")]),
        );
        assert!(e.is_active());
        assert_eq!(e.reason(), "Score 0.5 >= threshold 0.5");
    }

    #[test]
    fn test_below_threshold() {
        let e = decide(
            recommender("test").with_threshold(0.9),
            scored(&[("A", "A"), ("A", "A"), ("A", "B")]),
        );
        assert!(!e.is_active());
        assert_eq!(e.reason(), "Score 0.4 < threshold 0.9");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(0.25), "0.25");
        assert_eq!(format_number(2.0 / 3.0), "0.6667");
        assert_eq!(format_number(-0.00001), "0");
        assert_eq!(format_number(-0.5), "-0.5");
    }
}
