//! Time-window alignment across tables.

use polars::prelude::DataFrame;
use tracing::{debug, warn};

use fitmerge_common::{column_f64, filter_rows};

use crate::error::Result;

/// Restricts every table to the time window all of them cover.
///
/// The window is `[max of the minimums, min of the maximums]` over the
/// tables that have `time_column`. Tables without it are returned as-is,
/// as are all tables when none has it.
pub fn align_time_series(frames: &[DataFrame], time_column: &str) -> Result<Vec<DataFrame>> {
    let ranges: Vec<Option<(f64, f64)>> = frames
        .iter()
        .map(|df| time_range(df, time_column))
        .collect();

    let window = ranges.iter().flatten().fold(None, |acc, &(lo, hi)| match acc {
        None => Some((lo, hi)),
        Some((start, end)) => Some((f64::max(start, lo), f64::min(end, hi))),
    });
    let Some((start, end)) = window else {
        return Ok(frames.to_vec());
    };
    if start > end {
        warn!(time_column, start, end, "tables share no common time window");
    }
    debug!(time_column, start, end, "aligning tables");

    frames
        .iter()
        .zip(&ranges)
        .map(|(df, range)| {
            if range.is_none() && df.column(time_column).is_err() {
                return Ok(df.clone());
            }
            let keep: Vec<bool> = df
                .column(time_column)
                .map(|column| {
                    column_f64(column)
                        .into_iter()
                        .map(|time| time.is_some_and(|t| t >= start && t <= end))
                        .collect()
                })
                .unwrap_or_else(|_| vec![true; df.height()]);
            Ok(filter_rows(df, &keep)?)
        })
        .collect()
}

fn time_range(df: &DataFrame, time_column: &str) -> Option<(f64, f64)> {
    let column = df.column(time_column).ok()?;
    column_f64(column)
        .into_iter()
        .flatten()
        .fold(None, |acc, t| match acc {
            None => Some((t, t)),
            Some((lo, hi)) => Some((f64::min(lo, t), f64::max(hi, t))),
        })
}
