//! Typed conversion of raw tables.

use polars::prelude::{Column, DataFrame};

use fitmerge_common::{f64_column, i64_column, parse_f64_lenient, parse_i64, string_column};

use crate::csv::RawTable;
use crate::error::Result;

/// Cell texts treated as missing values.
const NA_TOKENS: &[&str] = &["na", "n/a", "nan", "-nan", "null", "none", "#n/a"];

/// True for blank cells and common missing-value markers.
pub fn is_na_cell(cell: &str) -> bool {
    let trimmed = cell.trim();
    trimmed.is_empty()
        || NA_TOKENS
            .iter()
            .any(|token| trimmed.eq_ignore_ascii_case(token))
}

/// Builds a typed column from raw cells.
///
/// A column is `Int64` when every present cell is an integer, `Float64` when
/// every present cell is a number (comma decimals accepted) and `String`
/// otherwise. A column with no present cells is an all-null `Float64`.
pub fn infer_column(name: &str, cells: &[&str]) -> Column {
    let present: Vec<&str> = cells
        .iter()
        .copied()
        .filter(|cell| !is_na_cell(cell))
        .collect();

    if !present.is_empty() && present.iter().all(|cell| parse_i64(cell).is_some()) {
        let values = cells
            .iter()
            .map(|cell| if is_na_cell(cell) { None } else { parse_i64(cell) })
            .collect();
        return i64_column(name, values);
    }
    if present
        .iter()
        .all(|cell| parse_f64_lenient(cell).is_some())
    {
        let values = cells
            .iter()
            .map(|cell| {
                if is_na_cell(cell) {
                    None
                } else {
                    parse_f64_lenient(cell)
                }
            })
            .collect();
        return f64_column(name, values);
    }
    let values = cells
        .iter()
        .map(|cell| {
            if is_na_cell(cell) {
                None
            } else {
                Some((*cell).to_string())
            }
        })
        .collect();
    string_column(name, values)
}

/// Converts a raw table into a typed frame.
pub fn raw_to_frame(raw: &RawTable) -> Result<DataFrame> {
    let columns: Vec<Column> = raw
        .headers
        .iter()
        .enumerate()
        .map(|(idx, header)| infer_column(header, &raw.column(idx)))
        .collect();
    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::DataType;

    fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| (*c).to_string()).collect())
                .collect(),
            skipped_records: 0,
        }
    }

    #[test]
    fn test_infers_types() {
        let table = raw(
            &["secs", "smo2", "device", "empty"],
            &[&["0", "65,5", "moxy", ""], &["1", "", "moxy", "NaN"]],
        );
        let df = raw_to_frame(&table).unwrap();
        assert_eq!(df.column("secs").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("smo2").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("smo2").unwrap().null_count(), 1);
        assert_eq!(df.column("device").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("empty").unwrap().null_count(), 2);
    }

    #[test]
    fn test_mixed_text_stays_string() {
        let column = infer_column("BR", &["bpm", "20", "21"]);
        assert_eq!(column.dtype(), &DataType::String);
    }
}
