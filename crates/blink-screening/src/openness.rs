//! Edge-density openness estimation
//!
//! An open eye shows iris, lash and lid-fold boundaries inside the ROI;
//! a closed lid is comparatively smooth. Openness is the fraction of ROI
//! pixels the edge detector marks, a proxy rather than an anatomical
//! measurement.
//!
//! The only smoothing is the fixed sigma 1.4 Gaussian blur Canny applies
//! to its input. Gradient strength is the L2 magnitude of
//! the Sobel responses, so thresholds are on that scale.

use image::GrayImage;
use imageproc::edges::canny;
use video_frame::{RoiExtractor, VideoFrame};

use crate::{ScreeningConfig, ScreeningError};

/// Computes a scalar openness value in [0, 1] per frame
#[derive(Debug, Clone)]
pub struct OpennessEstimator {
    roi: RoiExtractor,
    canny_low: f32,
    canny_high: f32,
}

impl OpennessEstimator {
    pub fn new(config: &ScreeningConfig) -> Result<Self, ScreeningError> {
        Ok(Self {
            roi: RoiExtractor::new(config.roi_scale)?,
            canny_low: config.canny_low,
            canny_high: config.canny_high,
        })
    }

    /// Crop the centered ROI of a full frame and measure it
    pub fn estimate(&self, frame: &VideoFrame) -> Result<f64, ScreeningError> {
        let region = self.roi.extract(frame)?;
        Ok(self.estimate_region(&region))
    }

    /// Measure an already extracted region
    pub fn estimate_region(&self, region: &VideoFrame) -> f64 {
        self.edge_density(&region.to_gray_image())
    }

    /// Fraction of pixels Canny marks as edges
    pub fn edge_density(&self, gray: &GrayImage) -> f64 {
        let total = gray.width() as usize * gray.height() as usize;
        if total == 0 {
            return 0.0;
        }

        let edges = canny(gray, self.canny_low, self.canny_high);
        let edge_pixels = edges.pixels().filter(|p| p.0[0] > 0).count();

        edge_pixels as f64 / total as f64
    }
}
