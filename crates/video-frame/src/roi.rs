//! Centered region-of-interest extraction

use crate::{FrameError, VideoFrame};

/// Pixel rectangle inside a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoiRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Crops a fixed-proportion region centered in each frame
#[derive(Debug, Clone, Copy)]
pub struct RoiExtractor {
    scale: f64,
}

impl RoiExtractor {
    /// Create an extractor; `scale` must lie in (0, 1]
    pub fn new(scale: f64) -> Result<Self, FrameError> {
        if !(scale > 0.0 && scale <= 1.0) {
            return Err(FrameError::InvalidScale(scale));
        }
        Ok(Self { scale })
    }

    /// Compute the centered rectangle for a frame of the given size
    pub fn rect(&self, width: u32, height: u32) -> Result<RoiRect, FrameError> {
        let rh = (height as f64 * self.scale).round() as u32;
        let rw = (width as f64 * self.scale).round() as u32;

        if rh == 0 || rw == 0 {
            return Err(FrameError::EmptyRegion {
                width,
                height,
                scale: self.scale,
            });
        }

        Ok(RoiRect {
            x: (width - rw) / 2,
            y: (height - rh) / 2,
            width: rw,
            height: rh,
        })
    }

    /// Extract the centered region from a frame
    pub fn extract(&self, frame: &VideoFrame) -> Result<VideoFrame, FrameError> {
        let rect = self.rect(frame.width(), frame.height())?;
        frame
            .crop(rect.x, rect.y, rect.width, rect.height)
            .ok_or(FrameError::EmptyRegion {
                width: frame.width(),
                height: frame.height(),
                scale: self.scale,
            })
    }
}
