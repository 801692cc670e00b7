//! Blink Screening
//!
//! Dry-eye risk screening from recorded eye video:
//! - Frame sampling down to the analysis rate
//! - Edge-density openness of a centered eye region
//! - Moving-average smoothing and adaptive baseline
//! - Threshold-crossing blink detection with duration and refractory filters
//! - Inter-blink-interval statistics and risk classification
//!
//! Each video gets its own [`ScreeningPipeline`]; the stateful stages are
//! order-dependent and never shared between runs.

pub mod analysis;
pub mod config;
pub mod openness;
pub mod state;

pub use analysis::{
    classify, AnalysisSample, BlinkEvent, IntervalAccumulator, ScreeningLabel, ScreeningResult,
};
pub use config::ScreeningConfig;
pub use openness::OpennessEstimator;
pub use state::{BlinkDetector, DetectorOutput, EyeState};

use signal_filter::{BaselineTracker, FilterError, MovingAverage};
use thiserror::Error;
use tracing::{debug, info};
use video_frame::{FrameError, FrameSampler, SampleDecision, VideoFrame};

/// Screening error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScreeningError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No frames were supplied")]
    EmptyInput,

    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),
}

/// One screening run over one video
pub struct ScreeningPipeline {
    config: ScreeningConfig,
    sampler: FrameSampler,
    estimator: OpennessEstimator,
    smoother: MovingAverage,
    baseline: BaselineTracker,
    detector: BlinkDetector,
    intervals: IntervalAccumulator,
    /// Frames or openness values offered, kept or not
    inputs: u64,
}

impl ScreeningPipeline {
    /// Create a pipeline for a source of the given frame rate
    ///
    /// A source rate of 1 or less is treated as unknown.
    pub fn new(config: ScreeningConfig, source_fps: f64) -> Result<Self, ScreeningError> {
        config.validate()?;

        Ok(Self {
            sampler: FrameSampler::new(source_fps, config.target_fps, config.max_analysis_seconds),
            estimator: OpennessEstimator::new(&config)?,
            smoother: MovingAverage::new(config.smooth_window)?,
            baseline: BaselineTracker::new(),
            detector: BlinkDetector::new(&config),
            intervals: IntervalAccumulator::new(),
            inputs: 0,
            config,
        })
    }

    /// Offer the next decoded frame
    ///
    /// Returns the sample when the frame was analyzed, `None` when it was
    /// skipped by the stride or the analysis window is already full.
    pub fn process_frame(
        &mut self,
        frame: &VideoFrame,
    ) -> Result<Option<AnalysisSample>, ScreeningError> {
        self.inputs += 1;

        let kept_index = match self.sampler.admit() {
            SampleDecision::Keep(index) => index,
            SampleDecision::Skip => return Ok(None),
            SampleDecision::Exhausted => {
                debug!("Analysis window full, ignoring frame {}", frame.sequence());
                return Ok(None);
            }
        };

        let openness = self.estimator.estimate(frame)?;
        Ok(Some(self.advance(kept_index, openness)))
    }

    /// Feed an openness value computed upstream for an already sampled frame
    pub fn push_openness(&mut self, openness: f64) -> Option<AnalysisSample> {
        self.inputs += 1;
        let kept_index = self.sampler.claim_slot()?;
        Some(self.advance(kept_index, openness))
    }

    fn advance(&mut self, kept_index: u64, openness_raw: f64) -> AnalysisSample {
        let time_sec = kept_index as f64 / self.config.target_fps;

        let openness_smoothed = self.smoother.filter(openness_raw);
        let baseline = self.baseline.update(openness_smoothed);
        let threshold = baseline * self.config.threshold_factor;

        let output = self.detector.update(openness_smoothed, threshold, time_sec);
        self.intervals.observe(&output);

        if self.sampler.is_exhausted() {
            debug!("Reached {} analyzed frames", self.sampler.kept());
        }

        AnalysisSample {
            kept_index,
            time_sec,
            openness_raw,
            openness_smoothed,
            baseline,
            threshold,
        }
    }

    /// Whether the analysis window is full; further input is ignored
    pub fn is_saturated(&self) -> bool {
        self.sampler.is_exhausted()
    }

    /// Frames analyzed so far
    pub fn samples_kept(&self) -> u64 {
        self.sampler.kept()
    }

    /// Accepted blinks so far, in time order
    pub fn blinks(&self) -> &[BlinkEvent] {
        self.intervals.events()
    }

    /// Close the run and produce its result
    pub fn finish(self) -> Result<ScreeningResult, ScreeningError> {
        if self.inputs == 0 {
            return Err(ScreeningError::EmptyInput);
        }

        let duration_sec = self.sampler.kept() as f64 / self.config.target_fps;
        let result = self.intervals.summarize(duration_sec, &self.config);

        info!(
            "Screening complete: {:.2}s analyzed, {} blinks ({:.2}/min, {} rejected), max IBI {:.2}s -> {}",
            result.duration_sec,
            result.blink_count,
            result.blink_rate_bpm,
            self.detector.rejected_closures(),
            result.max_ibi_sec,
            result.label
        );

        Ok(result)
    }
}

/// Screen a whole frame sequence in one call
///
/// Stops pulling frames once the analysis window is full.
pub fn screen_frames<I>(
    frames: I,
    source_fps: f64,
    config: ScreeningConfig,
) -> Result<ScreeningResult, ScreeningError>
where
    I: IntoIterator<Item = VideoFrame>,
{
    let mut pipeline = ScreeningPipeline::new(config, source_fps)?;
    for frame in frames {
        pipeline.process_frame(&frame)?;
        if pipeline.is_saturated() {
            break;
        }
    }
    pipeline.finish()
}
