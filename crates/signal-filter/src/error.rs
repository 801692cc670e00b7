//! Filter Error Types

use thiserror::Error;

/// Errors during filter construction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// Moving average window of zero samples
    #[error("Smoothing window must hold at least one sample")]
    ZeroWindow,
}
