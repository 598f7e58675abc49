//! Recommender tools available to dry-run selections.
//!
//! - `replay`: replays recorded held-out predictions through the splitter
//! - `majority`: predicts the most frequent training label of the corpus

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use recsel::domain::{AnnotatedDocument, AnnotationLayer, EvaluationResult, LabelPair, LayerType, Recommender};
use recsel::engine::{RecommendationEngine, RecommendationEngineFactory};
use recsel::error::Result;
use recsel::split::{DataSplitter, SplitOutcome, split_units};
use recsel::task::{TaskContext, TaskMonitor, TrainingStage};

/// Evaluates recommenders with predictions recorded beforehand.
pub struct ReplayFactory {
    recordings: HashMap<i64, Vec<LabelPair>>,
}

impl ReplayFactory {
    pub fn new(recordings: HashMap<i64, Vec<LabelPair>>) -> Self {
        Self { recordings }
    }
}

impl RecommendationEngineFactory for ReplayFactory {
    fn id(&self) -> &str {
        "replay"
    }

    fn name(&self) -> &str {
        "Recorded predictions"
    }

    fn accepts(&self, layer: &AnnotationLayer, feature: &str) -> bool {
        layer.layer_type != LayerType::Chain && !feature.is_empty()
    }

    fn build(&self, recommender: &Recommender) -> Result<Box<dyn RecommendationEngine>> {
        Ok(Box::new(ReplayEngine {
            pairs: self.recordings.get(&recommender.id).cloned().unwrap_or_default(),
        }))
    }
}

struct ReplayEngine {
    pairs: Vec<LabelPair>,
}

#[async_trait]
impl RecommendationEngine for ReplayEngine {
    async fn evaluate(&self, _documents: &[AnnotatedDocument], splitter: &dyn DataSplitter) -> Result<EvaluationResult> {
        Ok(match split_units(splitter, self.pairs.iter().cloned()) {
            SplitOutcome::Skipped(reason) => EvaluationResult::skipped_with_reason(reason),
            SplitOutcome::Split(split) => {
                let (train, test) = (split.train.len(), split.test.len());
                EvaluationResult::evaluated(split.test, train, test)
            }
        })
    }
}

/// Baseline that always predicts the most frequent training label.
pub struct MajorityFactory;

impl RecommendationEngineFactory for MajorityFactory {
    fn id(&self) -> &str {
        "majority"
    }

    fn name(&self) -> &str {
        "Majority label baseline"
    }

    fn accepts(&self, layer: &AnnotationLayer, feature: &str) -> bool {
        layer.layer_type == LayerType::Span && !feature.is_empty()
    }

    fn build(&self, recommender: &Recommender) -> Result<Box<dyn RecommendationEngine>> {
        Ok(Box::new(MajorityEngine {
            layer_id: recommender.layer.id,
            feature: recommender.feature.clone(),
        }))
    }
}

struct MajorityEngine {
    layer_id: i64,
    feature: String,
}

#[async_trait]
impl RecommendationEngine for MajorityEngine {
    async fn evaluate(&self, documents: &[AnnotatedDocument], splitter: &dyn DataSplitter) -> Result<EvaluationResult> {
        let labels: Vec<String> = documents
            .iter()
            .flat_map(|d| d.annotations_on(self.layer_id))
            .filter_map(|a| a.feature(&self.feature).map(str::to_string))
            .collect();

        let split = match split_units(splitter, labels) {
            SplitOutcome::Split(split) => split,
            SplitOutcome::Skipped(reason) => return Ok(EvaluationResult::skipped_with_reason(reason)),
        };

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for label in &split.train {
            *counts.entry(label.as_str()).or_default() += 1;
        }
        // Ties go to the alphabetically first label
        let Some(majority) = counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(label, _)| label.to_string())
        else {
            return Ok(EvaluationResult::skipped_with_reason("Training set is empty"));
        };

        let pairs = split
            .test
            .iter()
            .map(|gold| LabelPair::new(gold.clone(), majority.clone()))
            .collect();
        Ok(EvaluationResult::evaluated(pairs, split.train.len(), split.test.len()))
    }
}

/// Training stage of a dry run: notes what would be trained.
pub struct DryRunTraining;

#[async_trait]
impl TrainingStage for DryRunTraining {
    async fn train(&self, context: &TaskContext, monitor: &TaskMonitor) -> Result<()> {
        let owner = context.session_owner()?;
        log::info!(
            "Dry run: skipping training for {} in project {}",
            owner.username,
            context.project.name
        );
        monitor.info(format!(
            "Training skipped in dry run for [{}] in project [{}]",
            owner.username, context.project.name
        ));
        Ok(())
    }
}
