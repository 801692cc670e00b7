//! Signal Filtering for Openness Traces
//!
//! Provides the order-dependent filters of the screening pipeline:
//! a trailing moving average and an adaptive mean/median baseline.

mod baseline;
mod error;
mod smoother;
pub mod statistics;

pub use baseline::{BaselineTracker, BASELINE_WARMUP};
pub use error::FilterError;
pub use smoother::MovingAverage;
