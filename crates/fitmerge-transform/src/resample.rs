//! Frequency resampling and rate detection.

use std::collections::BTreeMap;
use std::fmt;

use polars::prelude::{Column, DataFrame};
use serde::{Deserialize, Serialize};
use tracing::debug;

use fitmerge_common::{
    column_f64, column_strings, f64_column, i64_column, is_numeric_dtype, string_column,
};

use crate::error::{Result, TransformError};

/// Per-bucket aggregation of numeric columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggMethod {
    #[default]
    Mean,
    First,
    Last,
    Median,
}

impl AggMethod {
    pub fn label(self) -> &'static str {
        match self {
            AggMethod::Mean => "mean",
            AggMethod::First => "first",
            AggMethod::Last => "last",
            AggMethod::Median => "median",
        }
    }

    /// Aggregates the present values; `None` when there are none.
    pub fn apply(self, values: &[f64]) -> Option<f64> {
        match self {
            AggMethod::Mean if values.is_empty() => None,
            AggMethod::Mean => Some(values.iter().sum::<f64>() / values.len() as f64),
            AggMethod::First => values.first().copied(),
            AggMethod::Last => values.last().copied(),
            AggMethod::Median => median(values),
        }
    }
}

impl fmt::Display for AggMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Median of a slice, `None` when empty.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Groups rows by `keys` and aggregates each group.
///
/// Numeric columns use `agg`; other columns keep their first present value.
/// Rows with a `None` key are dropped. The output starts with the key column
/// named `key_name`, sorted ascending, and ends with a per-group row count
/// when `count_column` is given.
pub fn aggregate_by_key(
    df: &DataFrame,
    keys: &[Option<i64>],
    key_name: &str,
    agg: AggMethod,
    count_column: Option<&str>,
) -> Result<DataFrame> {
    if keys.len() != df.height() {
        return Err(TransformError::KeyLengthMismatch {
            expected: df.height(),
            actual: keys.len(),
        });
    }

    let mut groups: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (row, key) in keys.iter().enumerate() {
        if let Some(key) = key {
            groups.entry(*key).or_default().push(row);
        }
    }

    let mut numeric = Vec::new();
    let mut text = Vec::new();
    for column in df.get_columns() {
        if is_numeric_dtype(column.dtype()) {
            numeric.push(aggregate_numeric(column, &groups, agg));
        } else {
            text.push(aggregate_text(column, &groups));
        }
    }

    let mut columns = Vec::with_capacity(numeric.len() + text.len() + 2);
    columns.push(i64_column(
        key_name,
        groups.keys().map(|key| Some(*key)).collect(),
    ));
    columns.extend(numeric);
    columns.extend(text);
    if let Some(name) = count_column {
        columns.push(i64_column(
            name,
            groups.values().map(|rows| Some(rows.len() as i64)).collect(),
        ));
    }
    Ok(DataFrame::new(columns)?)
}

fn aggregate_numeric(
    column: &Column,
    groups: &BTreeMap<i64, Vec<usize>>,
    agg: AggMethod,
) -> Column {
    let values = column_f64(column);
    let aggregated = groups
        .values()
        .map(|rows| {
            let present: Vec<f64> = rows.iter().filter_map(|&row| values[row]).collect();
            agg.apply(&present)
        })
        .collect();
    f64_column(column.name(), aggregated)
}

fn aggregate_text(column: &Column, groups: &BTreeMap<i64, Vec<usize>>) -> Column {
    let values = column_strings(column);
    let aggregated = groups
        .values()
        .map(|rows| rows.iter().find_map(|&row| values[row].clone()))
        .collect();
    string_column(column.name(), aggregated)
}

/// Estimates the sampling rate in Hz from the median time step.
///
/// Returns 1.0 when the column is missing, has fewer than two values, or
/// the median step is not positive.
pub fn detect_sampling_rate(df: &DataFrame, time_column: &str) -> f64 {
    let Ok(column) = df.column(time_column) else {
        return 1.0;
    };
    let times: Vec<f64> = column_f64(column).into_iter().flatten().collect();
    if times.len() < 2 {
        return 1.0;
    }
    let deltas: Vec<f64> = times.windows(2).map(|pair| pair[1] - pair[0]).collect();
    match median(&deltas) {
        Some(step) if step > 0.0 => 1.0 / step,
        _ => 1.0,
    }
}

/// Resamples a table to `target_hz` samples per second.
///
/// The current rate is detected when not given. A table already at the
/// target rate is returned unchanged; otherwise rows are grouped by
/// `floor(time * target_hz)` and the group key replaces the time column.
pub fn resample_to_frequency(
    df: &DataFrame,
    time_column: &str,
    target_hz: u32,
    current_hz: Option<u32>,
    agg: AggMethod,
) -> Result<DataFrame> {
    if target_hz == 0 {
        return Err(TransformError::InvalidFrequency {
            frequency: target_hz,
        });
    }
    let column = df
        .column(time_column)
        .map_err(|_| TransformError::ColumnNotFound {
            column: time_column.to_string(),
        })?;

    let current = current_hz.unwrap_or_else(|| {
        let detected = detect_sampling_rate(df, time_column).round();
        if detected >= 1.0 { detected as u32 } else { 1 }
    });
    if current == target_hz {
        debug!(time_column, hz = current, "already at target frequency");
        return Ok(df.clone());
    }

    let scale = f64::from(target_hz);
    let keys: Vec<Option<i64>> = column_f64(column)
        .into_iter()
        .map(|time| time.map(|t| (t * scale).floor() as i64))
        .collect();
    let rest = df.drop(time_column)?;
    let resampled = aggregate_by_key(&rest, &keys, time_column, agg, None)?;
    debug!(
        time_column,
        from_hz = current,
        to_hz = target_hz,
        rows_in = df.height(),
        rows_out = resampled.height(),
        "resampled"
    );
    Ok(resampled)
}
