//! Watch exports.
//!
//! Only the wanted optional columns are kept. The first rows after the
//! watch starts recording are often incomplete and are trimmed.

use std::path::Path;

use polars::prelude::DataFrame;
use tracing::debug;

use fitmerge_common::{complete_rows, filter_rows};
use fitmerge_model::SourceKind;

use super::common::{
    ProcessReport, SourceContext, archive, convert_column, display_name, finish_clean_table,
    pending_raw_files, prepare_dirs, process_each, read_source, sibling,
};
use crate::error::Result;

const KIND: SourceKind = SourceKind::Garmin;

pub fn read_raw(ctx: &SourceContext<'_>, path: &Path) -> Result<DataFrame> {
    read_source(ctx, path, 0)
}

pub fn process(ctx: &SourceContext<'_>) -> Result<ProcessReport> {
    prepare_dirs(ctx, KIND)?;
    let files = pending_raw_files(ctx, KIND)?;
    ctx.notifier
        .message(&format!("Cleaning {} {KIND} file(s)", files.len()));

    Ok(process_each(ctx, KIND, &files, |path| {
        let raw = read_raw(ctx, path)?;
        let Some(selected) = select_wanted(&raw)? else {
            ctx.notifier.message(&format!(
                "{}: none of {} present, skipped",
                display_name(path),
                KIND.spec().output_columns().join(", ")
            ));
            return Ok(None);
        };
        let (clean, dropped) = drop_leading_incomplete(&selected, ctx.settings.leading_trim_limit)?;
        if dropped > 0 {
            debug!(file = %path.display(), dropped, "dropped incomplete leading rows");
        }
        let out = sibling(path, "_clean");
        finish_clean_table(ctx, &clean, &out)?;
        archive(ctx, KIND, path);
        Ok(Some(out))
    }))
}

/// The wanted columns present in `df`, or `None` when there are none.
pub fn select_wanted(df: &DataFrame) -> Result<Option<DataFrame>> {
    let columns: Vec<_> = KIND
        .spec()
        .optional
        .iter()
        .filter_map(|spec| {
            spec.source_names()
                .find_map(|name| df.column(name).ok())
                .map(|column| convert_column(column, spec))
        })
        .collect();
    if columns.is_empty() {
        return Ok(None);
    }
    Ok(Some(DataFrame::new(columns)?))
}

/// Drops incomplete rows among the first `min(limit, height)` rows.
///
/// Returns the trimmed table and the number of rows dropped.
pub fn drop_leading_incomplete(df: &DataFrame, limit: usize) -> Result<(DataFrame, usize)> {
    let window = limit.min(df.height());
    let keep: Vec<bool> = complete_rows(df)
        .into_iter()
        .enumerate()
        .map(|(row, complete)| row >= window || complete)
        .collect();
    let dropped = keep.iter().filter(|&&k| !k).count();
    if dropped == 0 {
        return Ok((df.clone(), 0));
    }
    Ok((filter_rows(df, &keep)?, dropped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitmerge_common::column_names;
    use polars::prelude::Column;

    #[test]
    fn test_only_leading_incomplete_rows_are_dropped() {
        let df = DataFrame::new(vec![
            Column::new("hrv".into(), [None, Some(40.0), None, Some(42.0), None]),
            Column::new("core_temperature".into(), [Some(37.0); 5]),
        ])
        .unwrap();
        let (trimmed, dropped) = drop_leading_incomplete(&df, 3).unwrap();
        assert_eq!(dropped, 2);
        assert_eq!(trimmed.height(), 3);
        assert_eq!(trimmed.column("hrv").unwrap().null_count(), 1);
    }

    #[test]
    fn test_select_wanted() {
        let df = DataFrame::new(vec![
            Column::new("secs".into(), [0_i64, 1]),
            Column::new("hrv".into(), [40.0, 41.0]),
            Column::new("core_temperature".into(), ["37.1", "37.2"]),
        ])
        .unwrap();
        let selected = select_wanted(&df).unwrap().unwrap();
        assert_eq!(column_names(&selected), vec!["core_temperature", "hrv"]);

        let nothing = DataFrame::new(vec![Column::new("secs".into(), [0_i64])]).unwrap();
        assert!(select_wanted(&nothing).unwrap().is_none());
    }
}
