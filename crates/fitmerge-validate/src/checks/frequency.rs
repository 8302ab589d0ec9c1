//! Sampling-rate check.

use polars::prelude::DataFrame;

use fitmerge_transform::detect_sampling_rate;

use crate::issue::Issue;

/// Check the detected rate is within `tolerance` (a fraction) of `expected_hz`.
///
/// Tables with fewer than two rows carry no rate and pass.
pub fn check(
    df: &DataFrame,
    time_column: &str,
    expected_hz: f64,
    tolerance: f64,
) -> Option<Issue> {
    if df.height() < 2 || expected_hz <= 0.0 {
        return None;
    }
    let detected_hz = detect_sampling_rate(df, time_column);
    if (detected_hz - expected_hz).abs() <= expected_hz * tolerance {
        return None;
    }
    Some(Issue::SamplingFrequency {
        column: time_column.to_string(),
        expected_hz,
        detected_hz,
        tolerance,
    })
}
