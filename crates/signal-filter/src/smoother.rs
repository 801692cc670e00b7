//! Moving Average Filter for Openness Smoothing

use std::collections::VecDeque;

use crate::error::FilterError;
use crate::statistics;

/// Trailing simple moving average
///
/// Until the window fills, the output is the mean of every value seen so
/// far; afterwards it is the mean of exactly the last `size` values.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    window: VecDeque<f64>,
    size: usize,
}

impl MovingAverage {
    /// Create a new moving average with given window size
    pub fn new(size: usize) -> Result<Self, FilterError> {
        if size == 0 {
            return Err(FilterError::ZeroWindow);
        }
        Ok(Self {
            window: VecDeque::with_capacity(size),
            size,
        })
    }

    /// Add a value and get the smoothed output
    pub fn filter(&mut self, value: f64) -> f64 {
        if self.window.len() == self.size {
            self.window.pop_front();
        }
        self.window.push_back(value);

        // Recomputed from the buffer, oldest first, so no drift accumulates.
        let (front, back) = self.window.as_slices();
        let sum = front.iter().chain(back).sum::<f64>();
        sum / self.window.len() as f64
    }

    /// Number of values currently in the window
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Reset the filter
    pub fn reset(&mut self) {
        self.window.clear();
    }
}
