//! Screening configuration

use serde::{Deserialize, Serialize};

use crate::ScreeningError;

/// Screening configuration
///
/// Supplied once per run and never mutated. Every field has a default,
/// so callers may override any subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningConfig {
    /// Analysis stops after this much video (seconds)
    pub max_analysis_seconds: f64,

    /// Analysis frame rate after downsampling
    pub target_fps: f64,

    /// Centered ROI size as a fraction of frame width and height
    pub roi_scale: f64,

    /// Canny hysteresis bounds
    pub canny_low: f32,
    pub canny_high: f32,

    /// Moving average window (samples)
    pub smooth_window: usize,

    /// Fraction of baseline below which the eye counts as closing
    pub threshold_factor: f64,

    /// Valid blink duration bounds (milliseconds)
    pub min_blink_ms: u64,
    pub max_blink_ms: u64,

    /// Minimum gap after a blink ends before another may start (milliseconds)
    pub refractory_ms: u64,

    /// Blink rate below this is flagged (blinks per minute)
    pub min_blinks_per_minute: f64,

    /// Inter-blink interval above this is flagged (seconds)
    pub max_allowed_ibi_seconds: f64,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            max_analysis_seconds: 60.0,
            target_fps: 15.0,
            roi_scale: 0.35,
            canny_low: 40.0,
            canny_high: 120.0,
            smooth_window: 7,
            threshold_factor: 0.65,
            min_blink_ms: 80,
            max_blink_ms: 350,
            refractory_ms: 250,
            min_blinks_per_minute: 10.0,
            max_allowed_ibi_seconds: 10.0,
        }
    }
}

impl ScreeningConfig {
    /// Create strict config (flags more subjects)
    pub fn strict() -> Self {
        Self {
            min_blinks_per_minute: 12.0,
            max_allowed_ibi_seconds: 8.0,
            ..Default::default()
        }
    }

    /// Create lenient config (flags fewer subjects)
    pub fn lenient() -> Self {
        Self {
            min_blinks_per_minute: 8.0,
            max_allowed_ibi_seconds: 12.0,
            ..Default::default()
        }
    }

    /// Maximum number of frames analyzed in one run
    pub fn max_samples(&self) -> u64 {
        (self.max_analysis_seconds * self.target_fps).max(0.0) as u64
    }

    /// Check every value once, before a pipeline is built
    pub fn validate(&self) -> Result<(), ScreeningError> {
        if !(self.target_fps.is_finite() && self.target_fps > 0.0) {
            return Err(ScreeningError::Config(format!(
                "target_fps must be positive, got {}",
                self.target_fps
            )));
        }
        if self.smooth_window == 0 {
            return Err(ScreeningError::Config(
                "smooth_window must be at least 1".into(),
            ));
        }
        if !(self.roi_scale > 0.0 && self.roi_scale <= 1.0) {
            return Err(ScreeningError::Config(format!(
                "roi_scale must lie in (0, 1], got {}",
                self.roi_scale
            )));
        }
        if !(self.max_analysis_seconds.is_finite() && self.max_analysis_seconds > 0.0) {
            return Err(ScreeningError::Config(format!(
                "max_analysis_seconds must be positive, got {}",
                self.max_analysis_seconds
            )));
        }
        if self.max_samples() == 0 {
            return Err(ScreeningError::Config(format!(
                "max_analysis_seconds {} at {} fps leaves no frame to analyze",
                self.max_analysis_seconds, self.target_fps
            )));
        }
        if !(self.threshold_factor.is_finite() && self.threshold_factor > 0.0) {
            return Err(ScreeningError::Config(format!(
                "threshold_factor must be positive, got {}",
                self.threshold_factor
            )));
        }
        if self.min_blink_ms > self.max_blink_ms {
            return Err(ScreeningError::Config(format!(
                "min_blink_ms ({}) exceeds max_blink_ms ({})",
                self.min_blink_ms, self.max_blink_ms
            )));
        }
        if self.canny_low.is_nan() || self.canny_high.is_nan() || self.canny_low > self.canny_high {
            return Err(ScreeningError::Config(format!(
                "canny_low ({}) must not exceed canny_high ({})",
                self.canny_low, self.canny_high
            )));
        }
        Ok(())
    }
}
