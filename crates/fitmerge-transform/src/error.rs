//! Error types for table transformations.

use thiserror::Error;

/// Errors raised by interpolation, resampling and alignment.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Column not found in DataFrame.
    #[error("column '{column}' not found in DataFrame")]
    ColumnNotFound { column: String },

    /// Group keys do not line up with the table rows.
    #[error("expected {expected} group keys, got {actual}")]
    KeyLengthMismatch { expected: usize, actual: usize },

    /// Target frequency must be positive.
    #[error("invalid target frequency {frequency} Hz")]
    InvalidFrequency { frequency: u32 },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for transformations.
pub type Result<T> = std::result::Result<T, TransformError>;
