//! Recommender plugin interfaces.

use async_trait::async_trait;

use crate::domain::{AnnotatedDocument, AnnotationLayer, EvaluationResult, Recommender};
use crate::error::Result;
use crate::split::DataSplitter;

/// A built recommender, ready to evaluate against a corpus.
#[async_trait]
pub trait RecommendationEngine: Send + Sync {
    /// Evaluate on `documents`, splitting the evaluation units with `splitter`.
    ///
    /// Too little data is not an error: return [`EvaluationResult::skipped`] instead.
    async fn evaluate(&self, documents: &[AnnotatedDocument], splitter: &dyn DataSplitter) -> Result<EvaluationResult>;
}

/// Factory for one tool kind.
pub trait RecommendationEngineFactory: Send + Sync {
    /// Tool identifier recommenders refer to
    fn id(&self) -> &str;

    /// Human-readable tool name
    fn name(&self) -> &str {
        self.id()
    }

    /// Whether the tool can predict `feature` on `layer`
    fn accepts(&self, layer: &AnnotationLayer, feature: &str) -> bool;

    /// Whether the tool supports evaluation at all
    fn is_evaluable(&self) -> bool {
        true
    }

    /// Build an engine for a recommender configuration
    fn build(&self, recommender: &Recommender) -> Result<Box<dyn RecommendationEngine>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LabelPair, LayerType};
    use crate::split::{PercentageBasedSplitter, SplitOutcome, split_units};

    // Evaluates by predicting the majority training label for every test unit
    struct MajorityEngine {
        layer_id: i64,
        feature: String,
    }

    #[async_trait]
    impl RecommendationEngine for MajorityEngine {
        async fn evaluate(
            &self,
            documents: &[AnnotatedDocument],
            splitter: &dyn DataSplitter,
        ) -> Result<EvaluationResult> {
            let labels: Vec<String> = documents
                .iter()
                .flat_map(|d| d.annotations_on(self.layer_id))
                .filter_map(|a| a.feature(&self.feature).map(str::to_string))
                .collect();

            let split = match split_units(splitter, labels) {
                SplitOutcome::Split(split) => split,
                SplitOutcome::Skipped(reason) => return Ok(EvaluationResult::skipped_with_reason(reason)),
            };

            let majority = split.train[0].clone();
            let pairs = split
                .test
                .iter()
                .map(|gold| LabelPair::new(gold.clone(), majority.clone()))
                .collect();
            Ok(EvaluationResult::evaluated(pairs, split.train.len(), split.test.len()))
        }
    }

    struct MajorityFactory;

    impl RecommendationEngineFactory for MajorityFactory {
        fn id(&self) -> &str {
            "majority"
        }

        fn accepts(&self, layer: &AnnotationLayer, _feature: &str) -> bool {
            layer.layer_type == LayerType::Span
        }

        fn build(&self, recommender: &Recommender) -> Result<Box<dyn RecommendationEngine>> {
            Ok(Box::new(MajorityEngine {
                layer_id: recommender.layer.id,
                feature: recommender.feature.clone(),
            }))
        }
    }

    fn corpus(labels: &[&str]) -> Vec<AnnotatedDocument> {
        use crate::domain::{Annotation, DocumentRef};
        vec![AnnotatedDocument {
            document: DocumentRef::new(1, 7, "doc"),
            user: "alice".to_string(),
            text: "x".repeat(labels.len()),
            annotations: labels
                .iter()
                .enumerate()
                .map(|(i, l)| Annotation::new(3, i, i + 1).with_feature("value", *l))
                .collect(),
        }]
    }

    #[test]
    fn test_factory_defaults() {
        let factory = MajorityFactory;
        assert_eq!(factory.name(), "majority");
        assert!(factory.is_evaluable());
        assert!(factory.accepts(&AnnotationLayer::new(3, 7, "ne"), "value"));
        assert!(!factory.accepts(&AnnotationLayer::new(3, 7, "rel").with_type(LayerType::Relation), "value"));
    }

    #[tokio::test]
    async fn test_engine_evaluates_with_splitter() {
        let layer = AnnotationLayer::new(3, 7, "ne");
        let recommender = Recommender::new(1, "maj", "majority", layer, "value");
        let engine = MajorityFactory.build(&recommender).unwrap();
        let splitter = PercentageBasedSplitter::new(0.2, 10).unwrap();

        let docs = corpus(&["A", "A", "A", "A", "A", "A", "A", "A", "A", "B"]);
        let result = engine.evaluate(&docs, &splitter).await.unwrap();
        assert!(!result.is_evaluation_skipped());
        assert_eq!(result.test_set_size, 2);
        assert_eq!(result.accuracy(), 0.5);
    }

    #[tokio::test]
    async fn test_engine_skips_on_small_corpus() {
        let layer = AnnotationLayer::new(3, 7, "ne");
        let recommender = Recommender::new(1, "maj", "majority", layer, "value");
        let engine = MajorityFactory.build(&recommender).unwrap();
        let splitter = PercentageBasedSplitter::new(0.2, 10).unwrap();

        let result = engine.evaluate(&corpus(&["A", "B"]), &splitter).await.unwrap();
        assert!(result.is_evaluation_skipped());
        assert!(result.error_reason().unwrap().contains("Not enough data"));
    }
}
