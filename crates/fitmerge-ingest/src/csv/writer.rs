//! CSV writing.

use std::path::Path;

use csv::WriterBuilder;
use polars::prelude::{AnyValue, DataFrame};

use fitmerge_common::{any_to_string, column_names};

use crate::error::{IngestError, Result};

/// Writes a frame as comma-separated UTF-8 with a header row.
///
/// Missing values are written as empty cells.
pub fn write_frame_csv(df: &DataFrame, path: &Path) -> Result<()> {
    let write_error = |message: String| IngestError::CsvWrite {
        path: path.to_path_buf(),
        message,
    };
    let mut writer = WriterBuilder::new()
        .from_path(path)
        .map_err(|e| write_error(e.to_string()))?;

    writer
        .write_record(column_names(df))
        .map_err(|e| write_error(e.to_string()))?;

    let columns = df.get_columns();
    let mut record: Vec<String> = Vec::with_capacity(columns.len());
    for idx in 0..df.height() {
        record.clear();
        record.extend(
            columns
                .iter()
                .map(|column| any_to_string(column.get(idx).unwrap_or(AnyValue::Null))),
        );
        writer
            .write_record(&record)
            .map_err(|e| write_error(e.to_string()))?;
    }
    writer.flush().map_err(|e| write_error(e.to_string()))?;
    Ok(())
}
