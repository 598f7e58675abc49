//! Evaluation results produced by running a recommender over held-out data.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Gold label and predicted label of one held-out unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelPair {
    pub gold: String,
    pub predicted: String,
}

impl LabelPair {
    pub fn new(gold: impl Into<String>, predicted: impl Into<String>) -> Self {
        Self {
            gold: gold.into(),
            predicted: predicted.into(),
        }
    }
}

/// Outcome of evaluating a recommender. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Whether there was too little data to evaluate
    pub skipped: bool,
    /// Why the evaluation was skipped, if known
    pub error_reason: Option<String>,
    pub training_set_size: usize,
    pub test_set_size: usize,
    /// Gold/predicted labels of the held-out units
    pub label_pairs: Vec<LabelPair>,
}

impl EvaluationResult {
    /// Create a result from the labels of an evaluation run
    pub fn evaluated(label_pairs: Vec<LabelPair>, training_set_size: usize, test_set_size: usize) -> Self {
        Self {
            skipped: false,
            error_reason: None,
            training_set_size,
            test_set_size,
            label_pairs,
        }
    }

    /// Create a skipped result without a reason
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            error_reason: None,
            training_set_size: 0,
            test_set_size: 0,
            label_pairs: Vec::new(),
        }
    }

    /// Create a skipped result with a reason
    pub fn skipped_with_reason(reason: impl Into<String>) -> Self {
        Self {
            error_reason: Some(reason.into()),
            ..Self::skipped()
        }
    }

    pub fn is_evaluation_skipped(&self) -> bool {
        self.skipped
    }

    pub fn error_reason(&self) -> Option<&str> {
        self.error_reason.as_deref()
    }

    /// All labels seen in either gold or predicted position, sorted.
    pub fn labels(&self) -> BTreeSet<&str> {
        self.label_pairs
            .iter()
            .flat_map(|p| [p.gold.as_str(), p.predicted.as_str()])
            .collect()
    }

    /// Share of held-out units whose prediction matches the gold label.
    pub fn accuracy(&self) -> f64 {
        if self.label_pairs.is_empty() {
            return 0.0;
        }
        let correct = self.label_pairs.iter().filter(|p| p.gold == p.predicted).count();
        correct as f64 / self.label_pairs.len() as f64
    }

    /// Macro-averaged precision over all labels.
    pub fn precision(&self) -> f64 {
        self.macro_average(|counts| counts.precision())
    }

    /// Macro-averaged recall over all labels.
    pub fn recall(&self) -> f64 {
        self.macro_average(|counts| counts.recall())
    }

    /// Macro-averaged F1 over all labels; 0 when nothing was evaluated.
    pub fn f1_score(&self) -> f64 {
        self.macro_average(|counts| counts.f1())
    }

    fn macro_average(&self, metric: impl Fn(&LabelCounts) -> f64) -> f64 {
        let labels = self.labels();
        if labels.is_empty() {
            return 0.0;
        }
        let sum: f64 = labels.iter().map(|label| metric(&self.counts_for(label))).sum();
        sum / labels.len() as f64
    }

    fn counts_for(&self, label: &str) -> LabelCounts {
        let mut counts = LabelCounts::default();
        for pair in &self.label_pairs {
            match (pair.gold == label, pair.predicted == label) {
                (true, true) => counts.tp += 1,
                (false, true) => counts.fp += 1,
                (true, false) => counts.fn_ += 1,
                (false, false) => {}
            }
        }
        counts
    }
}

#[derive(Debug, Default)]
struct LabelCounts {
    tp: usize,
    fp: usize,
    fn_: usize,
}

impl LabelCounts {
    fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 { 0.0 } else { 2.0 * p * r / (p + r) }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<LabelPair> {
        raw.iter().map(|(g, p)| LabelPair::new(*g, *p)).collect()
    }

    #[test]
    fn test_perfect_score() {
        let result = EvaluationResult::evaluated(pairs(&[("PER", "PER"), ("LOC", "LOC")]), 8, 2);
        assert!(!result.is_evaluation_skipped());
        assert_eq!(result.f1_score(), 1.0);
        assert_eq!(result.accuracy(), 1.0);
    }

    #[test]
    fn test_macro_f1() {
        // PER: tp=2 fp=1 fn=0 -> f1 0.8; LOC: tp=1 fp=0 fn=1 -> f1 2/3
        let result = EvaluationResult::evaluated(
            pairs(&[("PER", "PER"), ("PER", "PER"), ("LOC", "LOC"), ("LOC", "PER")]),
            16,
            4,
        );
        let expected = (0.8 + 2.0 / 3.0) / 2.0;
        assert!((result.f1_score() - expected).abs() < 1e-9);
        assert_eq!(result.accuracy(), 0.75);
    }

    #[test]
    fn test_precision_and_recall() {
        let result = EvaluationResult::evaluated(pairs(&[("A", "A"), ("A", "B")]), 0, 2);
        // A: p=1 r=0.5; B: p=0 r=0
        assert!((result.precision() - 0.5).abs() < 1e-9);
        assert!((result.recall() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_empty_evaluation_scores_zero() {
        let result = EvaluationResult::evaluated(Vec::new(), 0, 0);
        assert_eq!(result.f1_score(), 0.0);
        assert_eq!(result.accuracy(), 0.0);
    }

    #[test]
    fn test_skipped() {
        let result = EvaluationResult::skipped();
        assert!(result.is_evaluation_skipped());
        assert_eq!(result.error_reason(), None);

        let result = EvaluationResult::skipped_with_reason("not enough data");
        assert!(result.is_evaluation_skipped());
        assert_eq!(result.error_reason(), Some("not enough data"));
    }

    #[test]
    fn test_labels_sorted_and_unique() {
        let result = EvaluationResult::evaluated(pairs(&[("B", "A"), ("A", "C")]), 0, 2);
        let labels: Vec<_> = result.labels().into_iter().collect();
        assert_eq!(labels, vec!["A", "B", "C"]);
    }
}
