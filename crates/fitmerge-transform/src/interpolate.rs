//! Bounded-gap interpolation.
//!
//! Short dropouts are sensor noise and get filled. Runs longer than
//! `max_gap` are real data loss and stay missing.

use polars::prelude::DataFrame;
use tracing::debug;

use fitmerge_common::{
    NullRun, column_f64, f64_column, is_time_column, null_runs, numeric_column_names,
};
use fitmerge_model::InterpolationMethod;

use crate::error::{Result, TransformError};

/// Fills runs of missing values no longer than `max_gap`.
///
/// Applies to the numeric columns except time columns, or to `columns` when
/// given. Returns the filled table and the number of values written.
pub fn interpolate_time_gaps(
    df: &DataFrame,
    method: InterpolationMethod,
    max_gap: usize,
    columns: Option<&[String]>,
) -> Result<(DataFrame, usize)> {
    if method == InterpolationMethod::None || max_gap == 0 {
        return Ok((df.clone(), 0));
    }

    let targets: Vec<String> = match columns {
        Some(names) => names.to_vec(),
        None => numeric_column_names(df)
            .into_iter()
            .filter(|name| !is_time_column(name))
            .collect(),
    };

    let mut result = df.clone();
    let mut total = 0usize;
    for name in &targets {
        let column = df
            .column(name)
            .map_err(|_| TransformError::ColumnNotFound {
                column: name.clone(),
            })?;
        let mut values = column_f64(column);
        let filled = fill_gaps(&mut values, method, max_gap);
        if filled > 0 {
            debug!(column = %name, filled, "interpolated gaps");
            result.with_column(f64_column(name, values))?;
            total += filled;
        }
    }
    Ok((result, total))
}

/// Fills every missing run of at most `max_gap` values in place.
///
/// Longer runs are left missing. Returns the number of values written.
pub fn fill_gaps(values: &mut [Option<f64>], method: InterpolationMethod, max_gap: usize) -> usize {
    if method == InterpolationMethod::None {
        return 0;
    }
    let mask: Vec<bool> = values.iter().map(Option::is_none).collect();
    null_runs(&mask)
        .into_iter()
        .filter(|run| run.len <= max_gap)
        .map(|run| fill_run(values, run, method))
        .sum()
}

fn fill_run(values: &mut [Option<f64>], run: NullRun, method: InterpolationMethod) -> usize {
    let before = run
        .start
        .checked_sub(1)
        .and_then(|idx| values.get(idx).copied().flatten());
    let after = values.get(run.end()).copied().flatten();
    let steps = (run.len + 1) as f64;

    for k in 0..run.len {
        let value = match (method, before, after) {
            (InterpolationMethod::Linear, Some(a), Some(b)) => {
                a + (b - a) * (k + 1) as f64 / steps
            }
            // edges have a single neighbour to extend
            (InterpolationMethod::Linear | InterpolationMethod::ForwardFill, Some(a), _) => a,
            (InterpolationMethod::Linear | InterpolationMethod::BackwardFill, _, Some(b)) => b,
            _ => return 0,
        };
        values[run.start + k] = Some(value);
    }
    run.len
}
