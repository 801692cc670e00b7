//! Adaptive Baseline Estimation
//!
//! The baseline is the "normal" openness level of the current run. While
//! history is short it is the mean of all smoothed values; once more than
//! [`BASELINE_WARMUP`] values exist it switches to the median of the whole
//! history, which resists prolonged closures better than a sliding mean.

use crate::statistics;

/// History length after which the median replaces the mean
pub const BASELINE_WARMUP: usize = 30;

/// Baseline tracker over the full smoothed history of one run
#[derive(Debug, Clone, Default)]
pub struct BaselineTracker {
    /// Smoothed values in arrival order
    history: Vec<f64>,
    /// Same values kept sorted for the median
    sorted: Vec<f64>,
}

impl BaselineTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a smoothed value and return the updated baseline
    ///
    /// Equal to recomputing mean or median over the entire history.
    pub fn update(&mut self, smoothed: f64) -> f64 {
        self.history.push(smoothed);
        let pos = self
            .sorted
            .partition_point(|v| v.total_cmp(&smoothed).is_le());
        self.sorted.insert(pos, smoothed);
        self.baseline()
    }

    /// Current baseline; zero before any value
    pub fn baseline(&self) -> f64 {
        if self.history.len() > BASELINE_WARMUP {
            statistics::median_sorted(&self.sorted)
        } else {
            statistics::mean(&self.history)
        }
    }

    /// Whether the median is in effect
    pub fn is_warmed_up(&self) -> bool {
        self.history.len() > BASELINE_WARMUP
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_mean_during_warmup() {
        let mut tracker = BaselineTracker::new();
        tracker.update(0.2);
        assert_eq!(tracker.update(0.4), 0.30000000000000004);
        assert!(!tracker.is_warmed_up());
    }

    #[test]
    fn test_median_after_warmup() {
        let mut tracker = BaselineTracker::new();
        for _ in 0..BASELINE_WARMUP {
            tracker.update(0.5);
        }
        // 31st value: median of thirty 0.5s and one 0.0
        let baseline = tracker.update(0.0);
        assert!(tracker.is_warmed_up());
        assert_eq!(baseline, 0.5);
    }

    #[test]
    fn test_exactly_warmup_values_still_mean() {
        let mut tracker = BaselineTracker::new();
        for _ in 0..BASELINE_WARMUP - 1 {
            tracker.update(1.0);
        }
        let baseline = tracker.update(0.0);
        assert_eq!(tracker.len(), BASELINE_WARMUP);
        assert!((baseline - 29.0 / 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_baseline() {
        assert_eq!(BaselineTracker::new().baseline(), 0.0);
    }

    proptest! {
        #[test]
        fn test_equals_full_recomputation(values in proptest::collection::vec(0.0f64..1.0, 1..80)) {
            let mut tracker = BaselineTracker::new();
            for (i, &v) in values.iter().enumerate() {
                let got = tracker.update(v);
                let history = &values[..=i];
                let expected = if history.len() > BASELINE_WARMUP {
                    statistics::median(history)
                } else {
                    statistics::mean(history)
                };
                prop_assert_eq!(got, expected);
            }
        }
    }
}
