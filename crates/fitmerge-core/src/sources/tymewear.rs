//! Breathing sensor exports.

use std::path::Path;

use polars::prelude::DataFrame;

use fitmerge_common::{filter_rows, missing_mask};
use fitmerge_model::SourceKind;

use super::common::{
    ProcessReport, SourceContext, archive, extract_columns, finish_clean_table, header_row,
    pending_raw_files, prepare_dirs, process_each, read_source, sibling,
};
use crate::error::Result;

const KIND: SourceKind = SourceKind::Tymewear;

pub const HEADER_KEYWORDS: &[&[&str]] = &[&["BR", "VT", "VE"]];

pub fn read_raw(ctx: &SourceContext<'_>, path: &Path) -> Result<DataFrame> {
    read_source(ctx, path, header_row(ctx, path, HEADER_KEYWORDS))
}

pub fn process(ctx: &SourceContext<'_>) -> Result<ProcessReport> {
    prepare_dirs(ctx, KIND)?;
    let files = pending_raw_files(ctx, KIND)?;
    ctx.notifier
        .message(&format!("Cleaning {} {KIND} file(s)", files.len()));

    Ok(process_each(ctx, KIND, &files, |path| {
        let raw = read_raw(ctx, path)?;
        let extracted = extract_columns(
            &raw,
            KIND.spec().required,
            path,
            ctx.settings.fill_missing_required,
        )?;
        let clean = drop_empty_rows(&extracted)?;
        let out = sibling(path, "_clean");
        finish_clean_table(ctx, &clean, &out)?;
        archive(ctx, KIND, path);
        Ok(Some(out))
    }))
}

/// Drops rows in which every column is missing.
pub fn drop_empty_rows(df: &DataFrame) -> Result<DataFrame> {
    let mut keep = vec![false; df.height()];
    for column in df.get_columns() {
        for (row, missing) in missing_mask(column).into_iter().enumerate() {
            if !missing {
                keep[row] = true;
            }
        }
    }
    if keep.iter().all(|&k| k) {
        return Ok(df.clone());
    }
    Ok(filter_rows(df, &keep)?)
}
