//! Blink detection state machine

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analysis::BlinkEvent;
use crate::ScreeningConfig;

/// Eye state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EyeState {
    #[default]
    Open,
    /// Blink in progress
    Closing,
}

/// What one update produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorOutput {
    /// State after the update
    pub state: EyeState,
    /// Accepted blink ending at this sample
    pub blink: Option<BlinkEvent>,
    /// Open-eye duration observed at this sample (seconds), if the eye
    /// was open when it arrived
    pub open_duration_sec: Option<f64>,
}

/// Threshold-crossing blink detector with duration and refractory filters
///
/// Closing starts on `smoothed < threshold` outside the refractory
/// window; reopening happens on `smoothed >= threshold`, so a value
/// exactly at threshold counts as open.
#[derive(Debug, Clone)]
pub struct BlinkDetector {
    min_blink_ms: i64,
    max_blink_ms: i64,
    refractory_ms: i64,
    state: EyeState,
    blink_start_ms: i64,
    /// None until the first closure ends, so nothing is blocked at start
    last_blink_end_ms: Option<i64>,
    eye_open_start_sec: f64,
    last_time_sec: Option<f64>,
    rejected: u64,
}

impl BlinkDetector {
    pub fn new(config: &ScreeningConfig) -> Self {
        Self {
            min_blink_ms: config.min_blink_ms as i64,
            max_blink_ms: config.max_blink_ms as i64,
            refractory_ms: config.refractory_ms as i64,
            state: EyeState::Open,
            blink_start_ms: 0,
            last_blink_end_ms: None,
            eye_open_start_sec: 0.0,
            last_time_sec: None,
            rejected: 0,
        }
    }

    /// Evaluate one sample; samples must arrive in order
    pub fn update(&mut self, smoothed: f64, threshold: f64, time_sec: f64) -> DetectorOutput {
        if let Some(last) = self.last_time_sec {
            if time_sec < last {
                warn!(
                    "Sample time went backwards ({:.3}s after {:.3}s)",
                    time_sec, last
                );
            }
        }
        self.last_time_sec = Some(time_sec);

        let open_duration_sec = match self.state {
            EyeState::Open => Some(time_sec - self.eye_open_start_sec),
            EyeState::Closing => None,
        };

        let now_ms = (time_sec * 1000.0) as i64;
        let mut blink = None;

        match self.state {
            EyeState::Open => {
                if smoothed < threshold && self.refractory_elapsed(now_ms) {
                    self.state = EyeState::Closing;
                    self.blink_start_ms = now_ms;
                }
            }
            EyeState::Closing => {
                if smoothed >= threshold {
                    let duration_ms = now_ms - self.blink_start_ms;
                    self.state = EyeState::Open;
                    self.last_blink_end_ms = Some(now_ms);

                    if (self.min_blink_ms..=self.max_blink_ms).contains(&duration_ms) {
                        debug!("Blink accepted at {:.3}s ({} ms)", time_sec, duration_ms);
                        self.eye_open_start_sec = time_sec;
                        blink = Some(BlinkEvent {
                            end_time_sec: time_sec,
                            duration_ms: duration_ms as u64,
                        });
                    } else {
                        self.rejected += 1;
                        debug!(
                            "Closure rejected at {:.3}s ({} ms outside {}..={} ms)",
                            time_sec, duration_ms, self.min_blink_ms, self.max_blink_ms
                        );
                    }
                }
            }
        }

        DetectorOutput {
            state: self.state,
            blink,
            open_duration_sec,
        }
    }

    fn refractory_elapsed(&self, now_ms: i64) -> bool {
        match self.last_blink_end_ms {
            Some(end_ms) => now_ms - end_ms > self.refractory_ms,
            None => true,
        }
    }

    pub fn state(&self) -> EyeState {
        self.state
    }

    /// Closures that ended outside the valid duration bounds
    pub fn rejected_closures(&self) -> u64 {
        self.rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FPS: f64 = 15.0;

    fn detector() -> BlinkDetector {
        BlinkDetector::new(&ScreeningConfig::default())
    }

    /// Feed values against a fixed threshold; returns accepted blinks
    fn run(detector: &mut BlinkDetector, values: &[f64], threshold: f64) -> Vec<BlinkEvent> {
        values
            .iter()
            .enumerate()
            .filter_map(|(k, &v)| detector.update(v, threshold, k as f64 / FPS).blink)
            .collect()
    }

    #[test]
    fn test_short_dip_is_a_blink() {
        let mut d = detector();
        // Closes at sample 3 (200 ms), reopens at sample 5 (333 ms)
        let values = [0.5, 0.5, 0.5, 0.1, 0.1, 0.5, 0.5];
        let blinks = run(&mut d, &values, 0.3);
        assert_eq!(blinks.len(), 1);
        assert_eq!(blinks[0].duration_ms, 133);
        assert!((blinks[0].end_time_sec - 5.0 / FPS).abs() < 1e-12);
        assert_eq!(d.state(), EyeState::Open);
    }

    #[test]
    fn test_value_at_threshold_is_open() {
        let mut d = detector();
        let out = d.update(0.3, 0.3, 0.0);
        assert_eq!(out.state, EyeState::Open);

        d.update(0.1, 0.3, 1.0);
        let out = d.update(0.3, 0.3, 1.2);
        assert_eq!(out.state, EyeState::Open);
        assert!(out.blink.is_some());
    }

    #[test]
    fn test_too_long_closure_is_dropped() {
        let mut d = detector();
        let mut values = vec![0.5; 3];
        values.extend(vec![0.1; 8]); // 533 ms
        values.extend(vec![0.5; 3]);
        assert!(run(&mut d, &values, 0.3).is_empty());
        assert_eq!(d.state(), EyeState::Open);
        assert_eq!(d.rejected_closures(), 1);
    }

    #[test]
    fn test_too_short_closure_is_dropped() {
        let mut d = detector();
        // Closes at 66 ms, reopens at 133 ms: 67 ms < 80 ms
        let values = [0.5, 0.1, 0.5, 0.5];
        assert!(run(&mut d, &values, 0.3).is_empty());
        assert_eq!(d.rejected_closures(), 1);
    }

    #[test]
    fn test_refractory_blocks_quick_reclosure() {
        let mut d = detector();
        // Blink ends at sample 4 (266 ms); next dip at sample 6 (400 ms) is
        // only 134 ms later and must wait until more than 250 ms have passed.
        let values = [0.5, 0.5, 0.1, 0.1, 0.5, 0.5, 0.1, 0.1, 0.5, 0.5];
        let blinks = run(&mut d, &values, 0.3);
        assert_eq!(blinks.len(), 1);
    }

    #[test]
    fn test_refractory_retries_on_later_samples() {
        let mut d = detector();
        d.update(0.1, 0.3, 0.0);
        assert!(d.update(0.5, 0.3, 0.1).blink.is_some());
        // Inside refractory: stays open
        assert_eq!(d.update(0.1, 0.3, 0.2).state, EyeState::Open);
        // 300 ms after the blink ended: closes
        assert_eq!(d.update(0.1, 0.3, 0.4).state, EyeState::Closing);
    }

    #[test]
    fn test_rejected_closure_still_starts_refractory() {
        let mut d = detector();
        d.update(0.1, 0.3, 0.0);
        // 500 ms closure, rejected
        assert!(d.update(0.5, 0.3, 0.5).blink.is_none());
        assert_eq!(d.update(0.1, 0.3, 0.6).state, EyeState::Open);
    }

    #[test]
    fn test_open_duration_tracks_last_accepted_blink() {
        let mut d = detector();
        assert_eq!(d.update(0.5, 0.3, 0.0).open_duration_sec, Some(0.0));
        assert_eq!(d.update(0.5, 0.3, 2.0).open_duration_sec, Some(2.0));

        d.update(0.1, 0.3, 2.1);
        assert_eq!(d.update(0.1, 0.3, 2.2).open_duration_sec, None);
        // Reopening sample is evaluated before the transition
        assert_eq!(d.update(0.5, 0.3, 2.3).open_duration_sec, None);

        let out = d.update(0.5, 0.3, 3.3).open_duration_sec.unwrap();
        assert!((out - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejected_closure_keeps_open_start() {
        let mut d = detector();
        d.update(0.5, 0.3, 0.0);
        d.update(0.1, 0.3, 1.0);
        d.update(0.5, 0.3, 1.02); // 20 ms, rejected
        let out = d.update(0.5, 0.3, 4.0).open_duration_sec.unwrap();
        assert!((out - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_backwards_time_is_tolerated() {
        let mut d = detector();
        d.update(0.1, 0.3, 1.0);
        // Negative duration falls below the minimum
        let out = d.update(0.5, 0.3, 0.5);
        assert_eq!(out.state, EyeState::Open);
        assert!(out.blink.is_none());
    }
}
