//! Screening analysis results and classification

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::DetectorOutput;
use crate::ScreeningConfig;

/// Guard for the blink-rate division on an empty run (seconds)
pub const MIN_DURATION_SEC: f64 = 1e-6;

/// Per-frame trace of the stateful stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSample {
    pub kept_index: u64,
    pub time_sec: f64,
    pub openness_raw: f64,
    pub openness_smoothed: f64,
    pub baseline: f64,
    pub threshold: f64,
}

/// An accepted blink
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlinkEvent {
    /// Time the eye reopened (seconds into the analysis timeline)
    pub end_time_sec: f64,
    /// Closing to reopening (milliseconds)
    pub duration_ms: u64,
}

/// Screening label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreeningLabel {
    #[serde(rename = "Normal")]
    Normal,
    #[serde(rename = "Dry Eye Risk")]
    DryEyeRisk,
}

impl ScreeningLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScreeningLabel::Normal => "Normal",
            ScreeningLabel::DryEyeRisk => "Dry Eye Risk",
        }
    }
}

impl fmt::Display for ScreeningLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complete screening result for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    /// Analyzed video length (seconds)
    pub duration_sec: f64,
    pub blink_count: usize,
    /// Blinks per minute
    pub blink_rate_bpm: f64,
    /// Mean inter-blink interval (seconds), 0 without at least two blinks
    pub mean_ibi_sec: f64,
    /// Longest inter-blink interval (seconds)
    pub max_ibi_sec: f64,
    /// Longest stretch the eye stayed open (seconds)
    pub max_eye_open_sec: f64,
    pub label: ScreeningLabel,
}

/// Aggregates blink events into inter-blink-interval statistics
#[derive(Debug, Clone, Default)]
pub struct IntervalAccumulator {
    events: Vec<BlinkEvent>,
    sum_ibi: f64,
    ibi_count: usize,
    max_ibi: f64,
    max_eye_open: f64,
}

impl IntervalAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one detector update
    pub fn observe(&mut self, output: &DetectorOutput) {
        if let Some(open) = output.open_duration_sec {
            self.max_eye_open = self.max_eye_open.max(open);
        }
        if let Some(event) = output.blink {
            self.record(event);
        }
    }

    /// Record an accepted blink; events must arrive in time order
    pub fn record(&mut self, event: BlinkEvent) {
        if let Some(prev) = self.events.last() {
            let ibi = event.end_time_sec - prev.end_time_sec;
            self.max_ibi = self.max_ibi.max(ibi);
            self.sum_ibi += ibi;
            self.ibi_count += 1;
        }
        self.events.push(event);
    }

    pub fn events(&self) -> &[BlinkEvent] {
        &self.events
    }

    pub fn blink_count(&self) -> usize {
        self.events.len()
    }

    pub fn mean_ibi_sec(&self) -> f64 {
        if self.ibi_count > 0 {
            self.sum_ibi / self.ibi_count as f64
        } else {
            0.0
        }
    }

    pub fn max_ibi_sec(&self) -> f64 {
        self.max_ibi
    }

    pub fn max_eye_open_sec(&self) -> f64 {
        self.max_eye_open
    }

    /// Build the final result for a run of `duration_sec`
    pub fn summarize(&self, duration_sec: f64, config: &ScreeningConfig) -> ScreeningResult {
        let blink_count = self.blink_count();
        let blink_rate_bpm = blink_rate(blink_count, duration_sec);
        let max_ibi_sec = self.max_ibi_sec();

        ScreeningResult {
            duration_sec,
            blink_count,
            blink_rate_bpm,
            mean_ibi_sec: self.mean_ibi_sec(),
            max_ibi_sec,
            max_eye_open_sec: self.max_eye_open_sec(),
            label: classify(blink_rate_bpm, max_ibi_sec, config),
        }
    }
}

/// Blinks per minute, with a zero duration treated as a tiny positive one
pub fn blink_rate(blink_count: usize, duration_sec: f64) -> f64 {
    blink_count as f64 * (60.0 / duration_sec.max(MIN_DURATION_SEC))
}

/// Either a low blink rate or one long interval is enough to flag risk
pub fn classify(blink_rate_bpm: f64, max_ibi_sec: f64, config: &ScreeningConfig) -> ScreeningLabel {
    if blink_rate_bpm < config.min_blinks_per_minute || max_ibi_sec > config.max_allowed_ibi_seconds {
        ScreeningLabel::DryEyeRisk
    } else {
        ScreeningLabel::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(end_time_sec: f64) -> BlinkEvent {
        BlinkEvent {
            end_time_sec,
            duration_ms: 120,
        }
    }

    #[test]
    fn test_no_blinks() {
        let acc = IntervalAccumulator::new();
        let result = acc.summarize(2.0, &ScreeningConfig::default());
        assert_eq!(result.blink_count, 0);
        assert_eq!(result.blink_rate_bpm, 0.0);
        assert_eq!(result.mean_ibi_sec, 0.0);
        assert_eq!(result.max_ibi_sec, 0.0);
        assert_eq!(result.label, ScreeningLabel::DryEyeRisk);
    }

    #[test]
    fn test_single_blink_has_no_interval() {
        let mut acc = IntervalAccumulator::new();
        acc.record(event(1.0));
        assert_eq!(acc.blink_count(), 1);
        assert_eq!(acc.mean_ibi_sec(), 0.0);
        assert_eq!(acc.max_ibi_sec(), 0.0);
    }

    #[test]
    fn test_interval_statistics() {
        let mut acc = IntervalAccumulator::new();
        for t in [1.0, 3.0, 4.0, 9.0] {
            acc.record(event(t));
        }
        // Intervals 2, 1, 5
        assert!((acc.mean_ibi_sec() - 8.0 / 3.0).abs() < 1e-12);
        assert_eq!(acc.max_ibi_sec(), 5.0);
    }

    #[test]
    fn test_observe_tracks_open_duration() {
        let mut acc = IntervalAccumulator::new();
        for open in [Some(0.5), None, Some(2.5), Some(1.0)] {
            acc.observe(&DetectorOutput {
                state: crate::EyeState::Open,
                blink: None,
                open_duration_sec: open,
            });
        }
        assert_eq!(acc.max_eye_open_sec(), 2.5);
    }

    #[test]
    fn test_zero_duration_rate_is_guarded() {
        assert_eq!(blink_rate(0, 0.0), 0.0);
        assert!(blink_rate(3, 0.0).is_finite());
        assert_eq!(blink_rate(10, 30.0), 20.0);
    }

    #[test]
    fn test_classify_disjunction() {
        let config = ScreeningConfig::default();
        assert_eq!(classify(20.0, 3.0, &config), ScreeningLabel::Normal);
        assert_eq!(classify(9.9, 3.0, &config), ScreeningLabel::DryEyeRisk);
        assert_eq!(classify(20.0, 10.5, &config), ScreeningLabel::DryEyeRisk);
        // Boundaries: rate equal to the minimum and IBI equal to the maximum pass
        assert_eq!(classify(10.0, 10.0, &config), ScreeningLabel::Normal);
    }

    #[test]
    fn test_classify_uses_configured_thresholds() {
        let config = ScreeningConfig {
            min_blinks_per_minute: 25.0,
            ..Default::default()
        };
        assert_eq!(classify(20.0, 3.0, &config), ScreeningLabel::DryEyeRisk);
    }

    #[test]
    fn test_label_strings() {
        assert_eq!(ScreeningLabel::DryEyeRisk.to_string(), "Dry Eye Risk");
        assert_eq!(
            serde_json::to_string(&ScreeningLabel::Normal).unwrap(),
            "\"Normal\""
        );
        assert_eq!(
            serde_json::from_str::<ScreeningLabel>("\"Dry Eye Risk\"").unwrap(),
            ScreeningLabel::DryEyeRisk
        );
    }
}
