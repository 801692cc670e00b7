//! Video Frame Library for Blink Screening
//!
//! Provides the frame-level front of the screening pipeline:
//! - Decoded RGB frames with grayscale conversion and cropping
//! - Frame-rate sampling down to the analysis rate
//! - Centered region-of-interest extraction

pub mod frame;
pub mod roi;
pub mod sampler;

pub use frame::VideoFrame;
pub use roi::{RoiExtractor, RoiRect};
pub use sampler::{FrameSampler, SampleDecision, FALLBACK_SOURCE_FPS};

use thiserror::Error;

/// Frame error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    #[error("RGB buffer holds {actual} bytes, expected {expected} for {width}x{height}")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Region of interest is empty: {width}x{height} frame at scale {scale}")]
    EmptyRegion { width: u32, height: u32, scale: f64 },

    #[error("ROI scale {0} is outside (0, 1]")]
    InvalidScale(f64),
}
