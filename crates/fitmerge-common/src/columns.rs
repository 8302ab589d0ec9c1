//! Column extraction and construction.

use polars::prelude::{AnyValue, Column, DataFrame, DataType, NamedFrom, PolarsResult, Series};

use crate::cell::{any_to_f64, any_to_string, is_missing};

/// Column names that hold elapsed time rather than measurements.
pub const TIME_COLUMN_NAMES: &[&str] =
    &["secs", "seconds", "second", "time", "timestamp", "timer.s"];

/// True for a time column name, ignoring case.
pub fn is_time_column(name: &str) -> bool {
    let lowered = name.trim().to_lowercase();
    TIME_COLUMN_NAMES.contains(&lowered.as_str())
}

/// Column names of a frame as owned strings.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

/// True for integer and floating point dtypes.
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Names of the numeric columns of a frame, in frame order.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|column| is_numeric_dtype(column.dtype()))
        .map(|column| column.name().to_string())
        .collect()
}

/// Reads a column as floats. Values that cannot be converted become `None`.
pub fn column_f64(column: &Column) -> Vec<Option<f64>> {
    (0..column.len())
        .map(|idx| any_to_f64(column.get(idx).unwrap_or(AnyValue::Null)))
        .collect()
}

/// Reads a column as text. Missing values become `None`.
pub fn column_strings(column: &Column) -> Vec<Option<String>> {
    (0..column.len())
        .map(|idx| {
            let value = column.get(idx).unwrap_or(AnyValue::Null);
            if is_missing(&value) {
                None
            } else {
                Some(any_to_string(value))
            }
        })
        .collect()
}

/// Per-row missing flags: null, NaN or blank text.
pub fn missing_mask(column: &Column) -> Vec<bool> {
    (0..column.len())
        .map(|idx| is_missing(&column.get(idx).unwrap_or(AnyValue::Null)))
        .collect()
}

/// Per-row flag that is true when no column is missing a value in that row.
pub fn complete_rows(df: &DataFrame) -> Vec<bool> {
    let mut complete = vec![true; df.height()];
    for column in df.get_columns() {
        for (row, missing) in missing_mask(column).into_iter().enumerate() {
            if missing {
                complete[row] = false;
            }
        }
    }
    complete
}

pub fn f64_column(name: &str, values: Vec<Option<f64>>) -> Column {
    Column::new(name.into(), values)
}

pub fn i64_column(name: &str, values: Vec<Option<i64>>) -> Column {
    Column::new(name.into(), values)
}

pub fn string_column(name: &str, values: Vec<Option<String>>) -> Column {
    Column::new(name.into(), values)
}

/// Keeps the rows whose flag is true.
pub fn filter_rows(df: &DataFrame, keep: &[bool]) -> PolarsResult<DataFrame> {
    let mask = Series::new("keep".into(), keep.to_vec());
    df.filter(mask.bool()?)
}

/// Truncates or null-pads a column to exactly `height` rows.
pub fn resize_column(column: &Column, height: usize) -> PolarsResult<Column> {
    let len = column.len();
    if len == height {
        return Ok(column.clone());
    }
    if len > height {
        return Ok(column.slice(0, height));
    }
    let mut series = column.as_materialized_series().clone();
    let padding = Series::full_null(column.name().clone(), height - len, column.dtype());
    series.append(&padding)?;
    Ok(Column::from(series))
}

/// Moves values `offset` rows up; the vacated tail becomes null.
pub fn shift_up(column: &Column, offset: usize) -> PolarsResult<Column> {
    let len = column.len();
    if offset == 0 {
        return Ok(column.clone());
    }
    let keep = len.saturating_sub(offset);
    let shifted = column.slice(offset.min(len) as i64, keep);
    resize_column(&shifted, len)
}
