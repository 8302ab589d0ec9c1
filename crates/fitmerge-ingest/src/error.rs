//! Error types for data ingestion.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading, writing or moving files.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// CSV file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A copy, move, delete or mkdir failed.
    #[error("{operation} failed for {path}: {source}")]
    Filesystem {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Glob pattern could not be compiled.
    #[error("invalid glob pattern '{pattern}': {message}")]
    Glob { pattern: String, message: String },

    // === CSV Format Errors ===
    /// CSV could not be parsed, even with malformed-record skipping.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// CSV file is empty or has no header.
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    /// No line within the scan window contains the expected keywords.
    #[error("could not detect header row in {path} (looked for {keywords})")]
    NoHeaderDetected { path: PathBuf, keywords: String },

    /// File uses an encoding we cannot decode.
    #[error("unsupported encoding {encoding} in {path}")]
    UnsupportedEncoding {
        path: PathBuf,
        encoding: &'static str,
    },

    /// Failed to write a CSV file.
    #[error("failed to write CSV {path}: {message}")]
    CsvWrite { path: PathBuf, message: String },

    // === DataFrame Errors ===
    /// Column not found in DataFrame.
    #[error("column '{column}' not found in DataFrame")]
    ColumnNotFound { column: String },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl IngestError {
    /// Builds a read error, mapping `NotFound` to [`IngestError::FileNotFound`].
    pub fn read(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::FileRead {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// True when the file exists but its content is unusable.
    pub fn is_file_format(&self) -> bool {
        matches!(
            self,
            Self::CsvParse { .. }
                | Self::EmptyCsv { .. }
                | Self::NoHeaderDetected { .. }
                | Self::UnsupportedEncoding { .. }
        )
    }
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
