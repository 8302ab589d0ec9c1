//! Error types for normalization, merging and orchestration.

use std::path::PathBuf;

use thiserror::Error;

use fitmerge_ingest::IngestError;
use fitmerge_transform::TransformError;

/// Errors raised by the pipeline stages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Reading, writing or moving a file failed.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// A table transformation failed.
    #[error(transparent)]
    Transform(#[from] TransformError),

    // === Source Errors ===
    /// The base source file is absent; nothing can be merged without it.
    #[error("base table not found: {path}")]
    BaseMissing { path: PathBuf },

    /// Required columns are absent from a source table.
    #[error("{path}: missing required columns: {}", columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },

    /// A source table contributes none of the columns it is read for.
    #[error("{path}: no usable columns")]
    NoUsableColumns { path: PathBuf },

    // === Run Control ===
    /// The user declined to continue.
    #[error("aborted: {reason}")]
    Aborted { reason: String },

    /// The output file exists and overwriting was declined.
    #[error("output already exists: {path}")]
    OutputExists { path: PathBuf },

    // === DataFrame Errors ===
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl CoreError {
    /// True when the run stopped because the user said no.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. } | Self::OutputExists { .. })
    }
}

impl From<polars::prelude::PolarsError> for CoreError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
