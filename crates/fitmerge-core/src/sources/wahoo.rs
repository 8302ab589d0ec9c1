//! Bike computer: the base table.
//!
//! The export is imported under a fixed name and used as-is. Its row count
//! defines the merged output.

use std::path::PathBuf;

use polars::prelude::DataFrame;
use tracing::info;

use fitmerge_model::SourceKind;

use super::common::{ProcessReport, SourceContext, read_source};
use crate::error::{CoreError, Result};

const KIND: SourceKind = SourceKind::Wahoo;

/// Nothing to transform; reports whether the base table is in place.
pub fn process(ctx: &SourceContext<'_>) -> Result<ProcessReport> {
    let mut report = ProcessReport::new(KIND);
    let base = ctx.layout.base_file();
    if ctx.fs.exists(&base) {
        report.produced.push(base);
    } else {
        ctx.notifier
            .warning(&format!("no base table at {}", base.display()));
    }
    Ok(report)
}

pub fn clean_files(ctx: &SourceContext<'_>) -> Vec<PathBuf> {
    let base = ctx.layout.base_file();
    if ctx.fs.exists(&base) {
        vec![base]
    } else {
        Vec::new()
    }
}

/// Loads the base table. Its absence is fatal for merging.
pub fn load_base(ctx: &SourceContext<'_>) -> Result<DataFrame> {
    let path = ctx.layout.base_file();
    if !ctx.fs.exists(&path) {
        return Err(CoreError::BaseMissing { path });
    }
    let df = read_source(ctx, &path, 0)?;
    let missing: Vec<String> = KIND
        .spec()
        .required
        .iter()
        .filter(|column| df.column(column.source).is_err())
        .map(|column| column.source.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CoreError::MissingColumns {
            path,
            columns: missing,
        });
    }
    info!(rows = df.height(), columns = df.width(), "loaded base table");
    Ok(df)
}
