//! Shared utilities for fitmerge crates.
//!
//! Cell conversions, column extraction and the missing-value run scan used by
//! the interpolator, the merge engine and the validator.

pub mod cell;
pub mod columns;
pub mod runs;

pub use cell::{
    any_to_f64, any_to_i64, any_to_string, format_numeric, is_missing, parse_f64,
    parse_f64_lenient, parse_i64,
};
pub use columns::{
    TIME_COLUMN_NAMES, column_f64, column_names, column_strings, complete_rows, f64_column,
    filter_rows, i64_column, is_numeric_dtype, is_time_column, missing_mask, numeric_column_names,
    resize_column, shift_up, string_column,
};
pub use runs::{GapScan, NullRun, null_runs, scan_column_gaps, scan_gaps};
