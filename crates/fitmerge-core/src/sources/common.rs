//! Steps shared by the source normalizers.

use std::path::{Path, PathBuf};

use polars::prelude::{AnyValue, Column, DataFrame};
use tracing::{info, info_span, warn};

use fitmerge_common::{
    any_to_i64, column_f64, column_strings, f64_column, i64_column, string_column,
};
use fitmerge_ingest::{FileSystem, ReadOptions, locate_header_row, raw_to_frame};
use fitmerge_model::{ColumnSpec, ColumnType, Notifier, Settings, SourceKind};
use fitmerge_transform::interpolate_time_gaps;

use crate::error::{CoreError, Result};
use crate::layout::WorkspaceLayout;

/// Everything a normalizer needs from the pipeline.
#[derive(Clone, Copy)]
pub struct SourceContext<'a> {
    pub settings: &'a Settings,
    pub layout: &'a WorkspaceLayout,
    pub fs: &'a dyn FileSystem,
    pub notifier: &'a dyn Notifier,
}

/// Outcome of processing one source directory.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessReport {
    pub kind: SourceKind,
    /// Clean tables written.
    pub produced: Vec<PathBuf>,
    /// Files left alone because they contribute nothing.
    pub skipped: Vec<PathBuf>,
    /// Files that could not be processed, with the error text.
    pub failed: Vec<(PathBuf, String)>,
}

impl ProcessReport {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            produced: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn extend(&mut self, other: ProcessReport) {
        self.produced.extend(other.produced);
        self.skipped.extend(other.skipped);
        self.failed.extend(other.failed);
    }

    pub fn is_empty(&self) -> bool {
        self.produced.is_empty() && self.skipped.is_empty() && self.failed.is_empty()
    }
}

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `dir/<stem><suffix>.csv` next to `path`.
pub fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}{suffix}.csv"))
}

/// Creates the source directory and its archive.
pub fn prepare_dirs(ctx: &SourceContext<'_>, kind: SourceKind) -> Result<()> {
    ctx.fs.create_dir_all(&ctx.layout.source_dir(kind))?;
    ctx.fs.create_dir_all(&ctx.layout.archive_dir(kind))?;
    Ok(())
}

/// Raw CSVs in the source directory that no earlier run produced.
pub fn pending_raw_files(ctx: &SourceContext<'_>, kind: SourceKind) -> Result<Vec<PathBuf>> {
    let files = ctx.fs.glob(&ctx.layout.source_dir(kind), "*.csv")?;
    Ok(files
        .into_iter()
        .filter(|path| {
            let name = display_name(path);
            !name.contains("_clean") && !name.contains("_avg")
        })
        .collect())
}

/// Clean tables ready for merging.
pub fn clean_files(ctx: &SourceContext<'_>, kind: SourceKind) -> Result<Vec<PathBuf>> {
    Ok(ctx.fs.glob(&ctx.layout.source_dir(kind), "*_clean.csv")?)
}

/// Moves `path` into the source archive. Failures are reported, not raised.
pub fn archive(ctx: &SourceContext<'_>, kind: SourceKind, path: &Path) -> bool {
    let target = ctx.layout.archive_dir(kind).join(path.file_name().unwrap_or_default());
    match ctx.fs.move_file(path, &target) {
        Ok(()) => true,
        Err(error) => {
            warn!(%error, file = %path.display(), "archiving failed");
            ctx.notifier
                .error(&format!("could not archive {}: {error}", display_name(path)));
            false
        }
    }
}

/// Moves every file of the source directory into its archive.
pub fn archive_all(ctx: &SourceContext<'_>, kind: SourceKind) -> Result<usize> {
    prepare_dirs(ctx, kind)?;
    let files = ctx.fs.list_files(&ctx.layout.source_dir(kind))?;
    let moved = files
        .iter()
        .filter(|path| archive(ctx, kind, path))
        .count();
    if moved > 0 {
        ctx.notifier
            .message(&format!("{kind}: {moved} file(s) archived"));
    }
    Ok(moved)
}

/// First header row matching one of the keyword sets, tried in order; row 0
/// when none matches.
pub fn header_row(ctx: &SourceContext<'_>, path: &Path, keyword_sets: &[&[&str]]) -> usize {
    keyword_sets
        .iter()
        .find_map(|keywords| {
            locate_header_row(path, keywords, ctx.settings.header_scan_max_lines)
        })
        .unwrap_or(0)
}

/// Reads a typed table whose header is at `header_row`, trimming column names.
pub fn read_source(ctx: &SourceContext<'_>, path: &Path, header_row: usize) -> Result<DataFrame> {
    let mut raw = ctx
        .fs
        .read_table(path, ReadOptions::with_header_row(header_row))?;
    for header in &mut raw.headers {
        let trimmed = header.trim();
        if trimmed.len() != header.len() {
            *header = trimmed.to_string();
        }
    }
    if raw.skipped_records > 0 {
        ctx.notifier.warning(&format!(
            "{}: skipped {} malformed line(s)",
            display_name(path),
            raw.skipped_records
        ));
    }
    Ok(raw_to_frame(&raw)?)
}

/// Converts a column to the spec's type under its output name.
///
/// Values that do not convert become missing.
pub fn convert_column(column: &Column, spec: &ColumnSpec) -> Column {
    match spec.kind {
        ColumnType::Int => {
            let values = (0..column.len())
                .map(|idx| any_to_i64(column.get(idx).unwrap_or(AnyValue::Null)))
                .collect();
            i64_column(spec.output, values)
        }
        ColumnType::Float => f64_column(spec.output, column_f64(column)),
        ColumnType::Text => string_column(spec.output, column_strings(column)),
    }
}

/// Extracts and renames `columns` from `df`.
///
/// A column missing under every accepted name fails the table, unless
/// `fill_missing` is set and the column has a fallback value.
pub fn extract_columns(
    df: &DataFrame,
    columns: &[ColumnSpec],
    path: &Path,
    fill_missing: bool,
) -> Result<DataFrame> {
    let mut extracted = Vec::with_capacity(columns.len());
    let mut missing = Vec::new();

    for spec in columns {
        let found = spec.source_names().find_map(|name| df.column(name).ok());
        match (found, spec.fallback.filter(|_| fill_missing)) {
            (Some(column), _) => extracted.push(convert_column(column, spec)),
            (None, Some(value)) => {
                warn!(
                    file = %path.display(),
                    column = spec.source,
                    value,
                    "column missing, using fallback"
                );
                extracted.push(f64_column(spec.output, vec![Some(value); df.height()]));
            }
            (None, None) => missing.push(spec.source.to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(CoreError::MissingColumns {
            path: path.to_path_buf(),
            columns: missing,
        });
    }
    Ok(DataFrame::new(extracted)?)
}

/// Interpolates short gaps and writes the clean table. Returns the number of
/// filled values.
pub fn finish_clean_table(ctx: &SourceContext<'_>, df: &DataFrame, out: &Path) -> Result<usize> {
    let interpolation = &ctx.settings.interpolation;
    let (df, filled) = interpolate_time_gaps(df, interpolation.method, interpolation.max_gap, None)?;
    if filled > 0 {
        info!(
            file = %out.display(),
            filled,
            method = %interpolation.method,
            max_gap = interpolation.max_gap,
            "interpolated short gaps"
        );
        ctx.notifier.message(&format!(
            "{}: filled {filled} missing value(s)",
            display_name(out)
        ));
    }
    ctx.fs.write_table(&df, out)?;
    Ok(filled)
}

/// Runs `process_file` over `files`, collecting outcomes.
///
/// `Ok(Some(path))` is a written clean table and `Ok(None)` a skipped file.
/// Errors are reported and do not stop the remaining files.
pub fn process_each<F>(
    ctx: &SourceContext<'_>,
    kind: SourceKind,
    files: &[PathBuf],
    mut process_file: F,
) -> ProcessReport
where
    F: FnMut(&Path) -> Result<Option<PathBuf>>,
{
    let mut report = ProcessReport::new(kind);
    for path in files {
        let name = display_name(path);
        let _span = info_span!("process_file", source = %kind, file = %name).entered();
        match process_file(path) {
            Ok(Some(out)) => {
                ctx.notifier.success(&format!("{name} -> {}", display_name(&out)));
                report.produced.push(out);
            }
            Ok(None) => report.skipped.push(path.clone()),
            Err(error) => {
                warn!(%error, "could not process file");
                ctx.notifier.error(&format!("{name}: {error}"));
                report.failed.push((path.clone(), error.to_string()));
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sibling_names() {
        let path = Path::new("/d/session_1.csv");
        assert_eq!(sibling(path, "_avg"), PathBuf::from("/d/session_1_avg.csv"));
        assert_eq!(
            sibling(&sibling(path, "_avg"), "_clean"),
            PathBuf::from("/d/session_1_avg_clean.csv")
        );
    }

    #[test]
    fn test_extract_renames_and_coerces() {
        let df = DataFrame::new(vec![
            Column::new("BR".into(), ["30", "x", "31"]),
            Column::new("VT".into(), [1.0, 1.1, 1.2]),
            Column::new("VE".into(), [30.0, 31.0, 32.0]),
            Column::new("extra".into(), [0, 0, 0]),
        ])
        .unwrap();
        let spec = SourceKind::Tymewear.spec();
        let clean = extract_columns(&df, spec.required, Path::new("t.csv"), false).unwrap();
        assert_eq!(
            fitmerge_common::column_names(&clean),
            vec!["TymeBreathRate", "tidal_volume", "TymeVentilation"]
        );
        assert_eq!(
            column_f64(clean.column("TymeBreathRate").unwrap()),
            vec![Some(30.0), None, Some(31.0)]
        );
    }

    #[test]
    fn test_missing_required_names_the_column() {
        let df = DataFrame::new(vec![Column::new("THb".into(), [12.0])]).unwrap();
        let spec = SourceKind::TrainRed.spec();
        let err = extract_columns(&df, spec.required, Path::new("s.csv"), false).unwrap_err();
        assert!(
            matches!(&err, CoreError::MissingColumns { columns, .. } if columns == &["SmO2"]),
            "unexpected error {err}"
        );
    }

    #[test]
    fn test_fallback_fills_when_enabled() {
        let df = DataFrame::new(vec![Column::new("THb".into(), [12.0, 12.5])]).unwrap();
        let spec = SourceKind::TrainRed.spec();
        let clean = extract_columns(&df, spec.required, Path::new("s.csv"), true).unwrap();
        assert_eq!(
            column_f64(clean.column("smo2").unwrap()),
            vec![Some(0.0), Some(0.0)]
        );
    }
}
