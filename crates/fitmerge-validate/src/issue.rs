//! Validation issue types.
//!
//! Each variant carries only the data it needs. Severity is decided by
//! [`Issue::severity`] from the variant and the run mode.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Issue severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Blocks the table.
    Error,
    /// Reported, does not block.
    Warning,
}

impl Severity {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warning => "Warning",
        }
    }
}

/// Error taxonomy an issue belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    MissingColumn,
    InvalidDataType,
    Timestamp,
    SamplingFrequency,
    DataGap,
    FileFormat,
}

impl IssueKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingColumn => "missing-column",
            Self::InvalidDataType => "invalid-data-type",
            Self::Timestamp => "timestamp",
            Self::SamplingFrequency => "sampling-frequency",
            Self::DataGap => "data-gap",
            Self::FileFormat => "file-format",
        }
    }
}

/// Share of a column's rows holding non-numeric text above which the column
/// is an error.
pub const INVALID_RATIO_LIMIT: f64 = 0.5;

/// Validation issue - each variant carries only its needed data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Issue {
    // Structure
    /// Table has no rows.
    EmptyTable,
    /// File could not be read or parsed.
    FileFormat { reason: String },

    // Presence checks
    /// Required columns are absent.
    MissingColumns {
        columns: Vec<String>,
        /// Up to ten of the columns that are present.
        available: Vec<String>,
        /// Present columns matching a missing one except for case.
        suggestions: Vec<String>,
    },
    /// Optional columns are absent.
    MissingOptionalColumns { columns: Vec<String> },

    // Type checks
    /// Numeric column contains values that cannot be parsed.
    NonNumericValues {
        column: String,
        invalid_count: u64,
        /// Length of the column, blanks included.
        row_count: u64,
        samples: Vec<String>,
    },

    // Timestamp checks
    NegativeTimestamps {
        column: String,
        count: u64,
        first_row: usize,
    },
    /// Time goes backwards between consecutive rows.
    NonMonotonicTimestamps {
        column: String,
        count: u64,
        first_row: usize,
    },
    DuplicateTimestamps {
        column: String,
        count: u64,
        first_row: usize,
    },

    // Rate checks
    SamplingFrequency {
        column: String,
        expected_hz: f64,
        detected_hz: f64,
        tolerance: f64,
    },

    // Gap checks
    /// A run of missing values reached the threshold.
    DataGap {
        column: String,
        length: usize,
        threshold: usize,
        /// First row of the run, when known.
        start_row: Option<usize>,
    },
}

impl Issue {
    pub fn kind(&self) -> IssueKind {
        match self {
            Issue::EmptyTable | Issue::FileFormat { .. } => IssueKind::FileFormat,
            Issue::MissingColumns { .. } | Issue::MissingOptionalColumns { .. } => {
                IssueKind::MissingColumn
            }
            Issue::NonNumericValues { .. } => IssueKind::InvalidDataType,
            Issue::NegativeTimestamps { .. }
            | Issue::NonMonotonicTimestamps { .. }
            | Issue::DuplicateTimestamps { .. } => IssueKind::Timestamp,
            Issue::SamplingFrequency { .. } => IssueKind::SamplingFrequency,
            Issue::DataGap { .. } => IssueKind::DataGap,
        }
    }

    /// Column the issue is keyed to, if any.
    pub fn column(&self) -> Option<&str> {
        match self {
            Issue::EmptyTable | Issue::FileFormat { .. } => None,
            Issue::MissingColumns { columns, .. } | Issue::MissingOptionalColumns { columns } => {
                columns.first().map(String::as_str)
            }
            Issue::NonNumericValues { column, .. }
            | Issue::NegativeTimestamps { column, .. }
            | Issue::NonMonotonicTimestamps { column, .. }
            | Issue::DuplicateTimestamps { column, .. }
            | Issue::SamplingFrequency { column, .. }
            | Issue::DataGap { column, .. } => Some(column),
        }
    }

    /// Count of occurrences (if applicable).
    pub fn count(&self) -> Option<u64> {
        match self {
            Issue::NonNumericValues { invalid_count, .. } => Some(*invalid_count),
            Issue::NegativeTimestamps { count, .. }
            | Issue::NonMonotonicTimestamps { count, .. }
            | Issue::DuplicateTimestamps { count, .. } => Some(*count),
            Issue::DataGap { length, .. } => Some(*length as u64),
            Issue::MissingColumns { columns, .. } | Issue::MissingOptionalColumns { columns } => {
                Some(columns.len() as u64)
            }
            _ => None,
        }
    }

    /// First offending row, where one exists.
    pub fn row(&self) -> Option<usize> {
        match self {
            Issue::NegativeTimestamps { first_row, .. }
            | Issue::NonMonotonicTimestamps { first_row, .. }
            | Issue::DuplicateTimestamps { first_row, .. } => Some(*first_row),
            Issue::DataGap { start_row, .. } => *start_row,
            _ => None,
        }
    }

    /// Severity of this issue. In fail-fast mode timestamp, rate and gap
    /// findings are errors.
    pub fn severity(&self, fail_fast: bool) -> Severity {
        match self {
            Issue::EmptyTable | Issue::FileFormat { .. } | Issue::MissingColumns { .. } => {
                Severity::Error
            }
            Issue::MissingOptionalColumns { .. } => Severity::Warning,
            Issue::NonNumericValues {
                invalid_count,
                row_count,
                ..
            } => {
                let ratio = if *row_count == 0 {
                    0.0
                } else {
                    *invalid_count as f64 / *row_count as f64
                };
                if ratio > INVALID_RATIO_LIMIT {
                    Severity::Error
                } else {
                    Severity::Warning
                }
            }
            Issue::NegativeTimestamps { .. }
            | Issue::NonMonotonicTimestamps { .. }
            | Issue::DuplicateTimestamps { .. }
            | Issue::SamplingFrequency { .. }
            | Issue::DataGap { .. } => {
                if fail_fast {
                    Severity::Error
                } else {
                    Severity::Warning
                }
            }
        }
    }

    /// Format message with issue-specific data.
    pub fn message(&self) -> String {
        match self {
            Issue::EmptyTable => "Table has no rows".to_string(),
            Issue::FileFormat { reason } => format!("File could not be read: {reason}"),
            Issue::MissingColumns {
                columns,
                available,
                suggestions,
            } => {
                let mut message = format!(
                    "Missing required columns: {}. Available: {}",
                    columns.join(", "),
                    available.join(", ")
                );
                if !suggestions.is_empty() {
                    message.push_str(&format!(" (did you mean {}?)", suggestions.join(", ")));
                }
                message
            }
            Issue::MissingOptionalColumns { columns } => {
                format!("Missing optional columns: {}", columns.join(", "))
            }
            Issue::NonNumericValues {
                column,
                invalid_count,
                row_count,
                samples,
            } => {
                let sample_str = if samples.is_empty() {
                    String::new()
                } else {
                    format!(" (e.g., {})", samples.join(", "))
                };
                format!(
                    "Column {column} has {invalid_count} of {row_count} values that are not numeric{sample_str}"
                )
            }
            Issue::NegativeTimestamps {
                column,
                count,
                first_row,
            } => format!("Column {column} has {count} negative timestamps (first at row {first_row})"),
            Issue::NonMonotonicTimestamps {
                column,
                count,
                first_row,
            } => format!(
                "Column {column} decreases {count} times (first at row {first_row})"
            ),
            Issue::DuplicateTimestamps {
                column,
                count,
                first_row,
            } => format!(
                "Column {column} has {count} duplicate timestamps (first at row {first_row})"
            ),
            Issue::SamplingFrequency {
                column,
                expected_hz,
                detected_hz,
                tolerance,
            } => format!(
                "Sampling rate from {column} is {detected_hz:.2} Hz, expected {expected_hz:.2} Hz ± {:.0}%",
                tolerance * 100.0
            ),
            Issue::DataGap {
                column,
                length,
                threshold,
                start_row,
            } => match start_row {
                Some(row) => format!(
                    "Column {column} has {length} consecutive missing values starting at row {row} (threshold {threshold})"
                ),
                None => format!(
                    "Column {column} has {length} consecutive missing values (threshold {threshold})"
                ),
            },
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}
