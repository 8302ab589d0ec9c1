//! Muscle oxygen sensor: 10 Hz exports averaged down to 1 Hz.
//!
//! Stage one groups rows by whole second and writes `<stem>_avg.csv`. Stage
//! two extracts the two oxygen columns into `<stem>_avg_clean.csv`. An
//! intermediate left by an earlier run goes through stage two only.

use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;

use fitmerge_common::{column_f64, column_names, numeric_column_names};
use fitmerge_ingest::ReadOptions;
use fitmerge_model::SourceKind;
use fitmerge_transform::{AggMethod, aggregate_by_key};

use super::common::{
    ProcessReport, SourceContext, archive, extract_columns, finish_clean_table, header_row,
    pending_raw_files, prepare_dirs, process_each, read_source, sibling,
};
use crate::error::{CoreError, Result};

const KIND: SourceKind = SourceKind::TrainRed;

/// Header keyword sets, most specific first.
pub const HEADER_KEYWORDS: &[&[&str]] = &[&["Timestamp", "seconds passed"], &["Timestamp"]];
/// Bucket key of the averaged table.
pub const SECOND_COLUMN: &str = "second";
/// Rows per bucket in the averaged table.
pub const SAMPLE_COUNT_COLUMN: &str = "samples_per_second";

pub fn read_raw(ctx: &SourceContext<'_>, path: &Path) -> Result<DataFrame> {
    read_source(ctx, path, header_row(ctx, path, HEADER_KEYWORDS))
}

pub fn process(ctx: &SourceContext<'_>) -> Result<ProcessReport> {
    prepare_dirs(ctx, KIND)?;
    let raw_files = pending_raw_files(ctx, KIND)?;
    let leftovers = ctx.fs.glob(&ctx.layout.source_dir(KIND), "*_avg.csv")?;
    ctx.notifier.message(&format!(
        "Averaging {} {KIND} file(s) to 1 Hz",
        raw_files.len()
    ));

    let mut report = process_each(ctx, KIND, &raw_files, |path| {
        let raw = read_raw(ctx, path)?;
        let averaged = average_per_second(&raw, path)?;
        let avg_path = sibling(path, "_avg");
        ctx.fs.write_table(&averaged, &avg_path)?;
        archive(ctx, KIND, path);
        let out = write_clean(ctx, &averaged, &avg_path)?;
        archive(ctx, KIND, &avg_path);
        Ok(Some(out))
    });

    report.extend(process_each(ctx, KIND, &leftovers, |path| {
        let averaged = ctx.fs.read_frame(path, ReadOptions::default())?;
        let out = write_clean(ctx, &averaged, path)?;
        archive(ctx, KIND, path);
        Ok(Some(out))
    }));
    Ok(report)
}

fn write_clean(ctx: &SourceContext<'_>, averaged: &DataFrame, avg_path: &Path) -> Result<PathBuf> {
    let clean = extract_columns(
        averaged,
        KIND.spec().required,
        avg_path,
        ctx.settings.fill_missing_required,
    )?;
    let out = sibling(avg_path, "_clean");
    finish_clean_table(ctx, &clean, &out)?;
    Ok(out)
}

/// Averages a high-rate table per whole second.
///
/// The time column is the first whose name contains `timestamp`; times are
/// truncated to whole seconds and rows without a time are dropped. Numeric
/// columns are averaged, text columns keep their first value, and
/// `samples_per_second` counts the rows in each bucket.
pub fn average_per_second(df: &DataFrame, path: &Path) -> Result<DataFrame> {
    let time_column = column_names(df)
        .into_iter()
        .find(|name| name.to_lowercase().contains("timestamp"))
        .ok_or_else(|| CoreError::MissingColumns {
            path: path.to_path_buf(),
            columns: vec!["Timestamp".to_string()],
        })?;

    let keys: Vec<Option<i64>> = column_f64(df.column(&time_column)?)
        .into_iter()
        .map(|time| time.filter(|t| t.is_finite()).map(|t| t.trunc() as i64))
        .collect();
    let rest = df.drop(&time_column)?;
    if numeric_column_names(&rest).is_empty() {
        return Err(CoreError::NoUsableColumns {
            path: path.to_path_buf(),
        });
    }
    Ok(aggregate_by_key(
        &rest,
        &keys,
        SECOND_COLUMN,
        AggMethod::Mean,
        Some(SAMPLE_COUNT_COLUMN),
    )?)
}
