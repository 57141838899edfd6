//! Error types for triangular coding

use std::collections::TryReserveError;
use thiserror::Error;

/// Result type for triangular coding operations
pub type Result<T> = std::result::Result<T, BttcError>;

/// Errors that can occur while building or subdividing a grid
#[derive(Error, Debug)]
pub enum BttcError {
    /// Grid side is not of the form 2^m+1 with m >= 1
    #[error("grid size {size} is not of the form 2^m+1 (m >= 1)")]
    InvalidSize { size: usize },

    /// Row stride shorter than a logical row
    #[error("pitch {pitch} is smaller than grid size {size}")]
    InvalidPitch { pitch: usize, size: usize },

    /// Sample buffer cannot address every grid point
    #[error("sample buffer holds {actual} values but the grid needs {required}")]
    GridTooSmall { required: usize, actual: usize },

    /// Sub-window does not fit inside the parent buffer's rows
    #[error("window of size {size} at ({x}, {y}) does not fit a pitch of {pitch}")]
    WindowOutOfBounds {
        x: usize,
        y: usize,
        size: usize,
        pitch: usize,
    },

    /// Row-wise input is ragged or not square
    #[error("grid must be square: {rows} rows, row {row} has {len} values")]
    NotSquare { rows: usize, row: usize, len: usize },

    /// NaN or infinite sample inside the grid
    #[error("sample at ({x}, {y}) is not finite")]
    NonFiniteSample { x: usize, y: usize },

    /// Threshold is negative or not a number
    #[error("threshold must be a finite non-negative number, got {0}")]
    InvalidThreshold(f64),

    /// Work list or face list could not grow
    #[error("failed to grow node buffer: {0}")]
    Allocation(#[from] TryReserveError),
}

impl BttcError {
    /// True for errors caused by the caller's input rather than resource exhaustion
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, BttcError::Allocation(_))
    }
}
