//! Block-wise percentage splitter.

use crate::config::SplitConfig;
use crate::error::{RecselError, Result};

use super::{DataSplitter, TargetSet};

/// Splits units in consecutive blocks of `increment`, holding out the last
/// `round(increment * held_out_ratio)` units of every block.
///
/// Fewer than `increment` units are not enough to evaluate.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentageBasedSplitter {
    held_out_ratio: f64,
    increment: usize,
    test_per_block: usize,
}

impl PercentageBasedSplitter {
    /// Create a splitter holding out `held_out_ratio` of every block of `increment` units.
    pub fn new(held_out_ratio: f64, increment: usize) -> Result<Self> {
        if !(held_out_ratio > 0.0 && held_out_ratio < 1.0) {
            return Err(RecselError::InvalidArgument(format!(
                "held-out ratio must be in (0, 1), got {}",
                held_out_ratio
            )));
        }
        if increment == 0 {
            return Err(RecselError::InvalidArgument("increment must be > 0".to_string()));
        }

        let raw = (increment as f64 * held_out_ratio).round() as usize;
        let test_per_block = raw.clamp(1, increment.saturating_sub(1).max(1));

        Ok(Self {
            held_out_ratio,
            increment,
            test_per_block,
        })
    }

    pub fn from_config(config: &SplitConfig) -> Result<Self> {
        Self::new(config.held_out_ratio, config.increment)
    }

    pub fn held_out_ratio(&self) -> f64 {
        self.held_out_ratio
    }

    pub fn increment(&self) -> usize {
        self.increment
    }
}

impl DataSplitter for PercentageBasedSplitter {
    fn target_set(&self, index: usize) -> TargetSet {
        let position = index % self.increment;
        if position < self.increment - self.test_per_block {
            TargetSet::Train
        } else {
            TargetSet::Test
        }
    }

    fn min_units(&self) -> usize {
        self.increment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::{SplitOutcome, split_units};

    #[test]
    fn test_rejects_bad_arguments() {
        assert!(PercentageBasedSplitter::new(0.0, 10).is_err());
        assert!(PercentageBasedSplitter::new(1.0, 10).is_err());
        assert!(PercentageBasedSplitter::new(0.2, 0).is_err());
    }

    #[test]
    fn test_one_block() {
        let splitter = PercentageBasedSplitter::new(0.2, 10).unwrap();
        let targets: Vec<_> = (0..10).map(|i| splitter.target_set(i)).collect();
        assert!(targets[..8].iter().all(|t| *t == TargetSet::Train));
        assert!(targets[8..].iter().all(|t| *t == TargetSet::Test));
    }

    #[test]
    fn test_partial_last_block() {
        let splitter = PercentageBasedSplitter::new(0.2, 10).unwrap();
        let SplitOutcome::Split(split) = split_units(&splitter, 0..25) else {
            panic!("expected a split");
        };
        assert_eq!(split.test, vec![8, 9, 18, 19]);
        assert_eq!(split.train.len(), 21);
    }

    #[test]
    fn test_insufficient_units_are_skipped() {
        let splitter = PercentageBasedSplitter::new(0.2, 10).unwrap();
        let outcome = split_units(&splitter, 0..9);
        assert!(outcome.is_skipped());
    }

    #[test]
    fn test_deterministic() {
        let splitter = PercentageBasedSplitter::new(0.3, 7).unwrap();
        let a = split_units(&splitter, 0..50);
        let b = split_units(&splitter, 0..50);
        assert_eq!(a, b);
    }

    #[test]
    fn test_always_holds_out_and_trains_something() {
        // A tiny ratio still holds out one unit per block
        let splitter = PercentageBasedSplitter::new(0.01, 5).unwrap();
        assert_eq!(splitter.target_set(4), TargetSet::Test);
        assert_eq!(splitter.target_set(3), TargetSet::Train);

        // A huge ratio still trains on one unit per block
        let splitter = PercentageBasedSplitter::new(0.99, 5).unwrap();
        assert_eq!(splitter.target_set(0), TargetSet::Train);
        assert_eq!(splitter.target_set(1), TargetSet::Test);
    }

    #[test]
    fn test_from_config() {
        let splitter = PercentageBasedSplitter::from_config(&SplitConfig::default()).unwrap();
        assert_eq!(splitter.increment(), 10);
        assert_eq!(splitter.held_out_ratio(), 0.2);
        assert_eq!(splitter.min_units(), 10);
    }
}
