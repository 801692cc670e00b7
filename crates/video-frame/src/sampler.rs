//! Frame-rate sampling
//!
//! Decoded frames arrive at the source rate; analysis runs at a lower
//! target rate. The sampler keeps every `step`-th frame and stops once
//! the analysis window is full.

use tracing::debug;

/// Source rate assumed when the container reports an unusable value
pub const FALLBACK_SOURCE_FPS: f64 = 30.0;

/// Outcome of offering one decoded frame to the sampler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleDecision {
    /// Analyze this frame; carries its zero-based kept index
    Keep(u64),
    /// Not on the stride
    Skip,
    /// The analysis window is full, no further frames are kept
    Exhausted,
}

/// Stride-based frame sampler with a hard cap on kept frames
#[derive(Debug, Clone)]
pub struct FrameSampler {
    step: u64,
    max_kept: u64,
    /// Decoded frames offered so far
    offered: u64,
    /// Frames kept so far
    kept: u64,
}

impl FrameSampler {
    /// Create a sampler for the given source rate, analysis rate and window
    pub fn new(source_fps: f64, target_fps: f64, max_analysis_seconds: f64) -> Self {
        let source_fps = if source_fps.is_finite() && source_fps > 1.0 {
            source_fps
        } else {
            FALLBACK_SOURCE_FPS
        };

        let step = (source_fps / target_fps).round_ties_even().max(1.0) as u64;
        let max_kept = (max_analysis_seconds * target_fps).max(0.0) as u64;

        debug!(
            "Frame sampler: source {:.2} fps, target {:.2} fps, step={}, max_kept={}",
            source_fps, target_fps, step, max_kept
        );

        Self {
            step,
            max_kept,
            offered: 0,
            kept: 0,
        }
    }

    /// Offer the next decoded frame in arrival order
    pub fn admit(&mut self) -> SampleDecision {
        self.offered += 1;

        if self.offered % self.step != 0 {
            return SampleDecision::Skip;
        }

        match self.claim_slot() {
            Some(index) => SampleDecision::Keep(index),
            None => SampleDecision::Exhausted,
        }
    }

    /// Reserve the next kept index for a frame that was sampled upstream
    pub fn claim_slot(&mut self) -> Option<u64> {
        if self.is_exhausted() {
            return None;
        }
        let index = self.kept;
        self.kept += 1;
        Some(index)
    }

    /// Whether the kept-frame cap has been reached
    pub fn is_exhausted(&self) -> bool {
        self.kept >= self.max_kept
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn max_kept(&self) -> u64 {
        self.max_kept
    }

    pub fn kept(&self) -> u64 {
        self.kept
    }
}
