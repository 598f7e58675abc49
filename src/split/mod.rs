//! Train/test splitting of evaluation data.
//!
//! A splitter assigns every unit (document, sentence, annotation - whatever the
//! recommender evaluates on) to either the training or the held-out test set.
//! Splitting is a pure function of unit position, so repeated evaluations over
//! the same corpus produce the same split.

mod percentage;

pub use percentage::PercentageBasedSplitter;

/// Which side of the split a unit lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetSet {
    Train,
    Test,
}

/// Deterministic assignment of units to training and test sets.
pub trait DataSplitter: Send + Sync {
    /// Target set of the unit at `index`
    fn target_set(&self, index: usize) -> TargetSet;

    /// Fewest units for which a split is meaningful
    fn min_units(&self) -> usize;
}

/// Units partitioned into training and held-out sets.
#[derive(Debug, Clone, PartialEq)]
pub struct Split<T> {
    pub train: Vec<T>,
    pub test: Vec<T>,
}

/// Result of splitting: either a usable split or the reason evaluation must be skipped.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitOutcome<T> {
    Split(Split<T>),
    Skipped(String),
}

impl<T> SplitOutcome<T> {
    pub fn is_skipped(&self) -> bool {
        matches!(self, SplitOutcome::Skipped(_))
    }
}

/// Partition `units` with `splitter`, skipping when there is too little data.
pub fn split_units<T>(splitter: &dyn DataSplitter, units: impl IntoIterator<Item = T>) -> SplitOutcome<T> {
    let units: Vec<T> = units.into_iter().collect();
    let total = units.len();
    if total < splitter.min_units() {
        return SplitOutcome::Skipped(format!(
            "Not enough data to evaluate: {} units, at least {} required",
            total,
            splitter.min_units()
        ));
    }

    let mut split = Split {
        train: Vec::new(),
        test: Vec::new(),
    };
    for (index, unit) in units.into_iter().enumerate() {
        match splitter.target_set(index) {
            TargetSet::Train => split.train.push(unit),
            TargetSet::Test => split.test.push(unit),
        }
    }

    if split.train.is_empty() || split.test.is_empty() {
        return SplitOutcome::Skipped("Training or test set is empty".to_string());
    }

    SplitOutcome::Split(split)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AllTrain;

    impl DataSplitter for AllTrain {
        fn target_set(&self, _index: usize) -> TargetSet {
            TargetSet::Train
        }

        fn min_units(&self) -> usize {
            1
        }
    }

    #[test]
    fn test_empty_test_set_is_skipped() {
        let outcome = split_units(&AllTrain, vec!["a", "b"]);
        assert_eq!(outcome, SplitOutcome::Skipped("Training or test set is empty".to_string()));
    }

    #[test]
    fn test_skip_message_mentions_counts() {
        let splitter = PercentageBasedSplitter::new(0.2, 10).unwrap();
        let SplitOutcome::Skipped(reason) = split_units(&splitter, 0..3) else {
            panic!("expected skip");
        };
        assert!(reason.contains("3 units"));
        assert!(reason.contains("at least 10"));
    }
}
