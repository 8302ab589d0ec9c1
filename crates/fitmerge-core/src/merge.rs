//! Merge engine.
//!
//! Combines the base table with the clean source tables column-wise. The
//! base defines the row extent; a column already present in the base or an
//! earlier source is ignored in later ones.

use std::collections::HashSet;

use polars::prelude::{Column, DataFrame, PolarsResult};
use tracing::{debug, info, info_span, warn};

use fitmerge_common::{complete_rows, is_time_column, resize_column, shift_up};
use fitmerge_model::Notifier;

use crate::error::Result;

/// A table contributed to a merge, named for reporting.
#[derive(Debug, Clone)]
pub struct NamedTable {
    pub name: String,
    pub df: DataFrame,
}

impl NamedTable {
    pub fn new(name: impl Into<String>, df: DataFrame) -> Self {
        Self {
            name: name.into(),
            df,
        }
    }
}

/// Which edge trims run after merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    /// Offer to shift data columns up past incomplete leading rows.
    pub trim_head: bool,
    /// Drop rows after the last complete row.
    pub trim_tail: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            trim_head: true,
            trim_tail: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub table: DataFrame,
    /// Columns taken from each source, by source name.
    pub contributed: Vec<(String, Vec<String>)>,
    /// Columns dropped from each source because they already existed.
    pub ignored: Vec<(String, Vec<String>)>,
    /// Sources that added no column.
    pub skipped: Vec<String>,
    /// Rows the data columns were shifted up by, when the head was trimmed.
    pub head_shift: Option<usize>,
    pub tail_trimmed: usize,
}

/// Merges tables, asking `notifier` before the head trim.
pub struct MergeEngine<'a> {
    notifier: &'a dyn Notifier,
}

impl<'a> MergeEngine<'a> {
    pub fn new(notifier: &'a dyn Notifier) -> Self {
        Self { notifier }
    }

    /// Merges `sources` into `base`, first writer wins.
    ///
    /// Source columns are truncated or padded with missing values to the
    /// base height. All surviving columns are assembled in one step.
    pub fn merge(
        &self,
        base: &DataFrame,
        sources: &[NamedTable],
        options: MergeOptions,
    ) -> Result<MergeOutcome> {
        let _span = info_span!("merge", sources = sources.len(), rows = base.height()).entered();
        let height = base.height();
        let mut seen: HashSet<String> = base
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();
        let mut columns: Vec<Column> = base.get_columns().to_vec();
        let mut contributed = Vec::new();
        let mut ignored = Vec::new();
        let mut skipped = Vec::new();

        for source in sources {
            let (fresh, duplicate): (Vec<&Column>, Vec<&Column>) = source
                .df
                .get_columns()
                .iter()
                .partition(|column| !seen.contains(column.name().as_str()));
            let duplicate: Vec<String> = duplicate
                .iter()
                .map(|column| column.name().to_string())
                .collect();

            if !duplicate.is_empty() {
                warn!(source = %source.name, columns = ?duplicate, "ignoring duplicate columns");
                self.notifier.warning(&format!(
                    "{}: ignoring columns already present: {}",
                    source.name,
                    duplicate.join(", ")
                ));
                ignored.push((source.name.clone(), duplicate));
            }
            if fresh.is_empty() {
                self.notifier
                    .warning(&format!("{}: no new columns, skipped", source.name));
                skipped.push(source.name.clone());
                continue;
            }
            if source.df.height() != height {
                debug!(
                    source = %source.name,
                    rows = source.df.height(),
                    base_rows = height,
                    "resizing source columns to base height"
                );
            }

            let mut names = Vec::with_capacity(fresh.len());
            for column in fresh {
                let name = column.name().to_string();
                seen.insert(name.clone());
                names.push(name);
                columns.push(resize_column(column, height)?);
            }
            contributed.push((source.name.clone(), names));
        }

        let mut table = DataFrame::new(columns)?;
        info!(
            rows = table.height(),
            columns = table.width(),
            contributed = contributed.len(),
            skipped = skipped.len(),
            "merged tables"
        );

        let mut head_shift = None;
        if options.trim_head {
            (table, head_shift) = self.trim_head(&table)?;
        }
        let mut tail_trimmed = 0;
        if options.trim_tail {
            (table, tail_trimmed) = trim_tail(&table);
        }

        Ok(MergeOutcome {
            table,
            contributed,
            ignored,
            skipped,
            head_shift,
            tail_trimmed,
        })
    }

    /// Shifts non-time columns up to the first complete row, if confirmed.
    ///
    /// Time columns stay in place. The vacated tail rows become missing.
    pub fn trim_head(&self, df: &DataFrame) -> Result<(DataFrame, Option<usize>)> {
        let Some(first) = complete_rows(df).iter().position(|&complete| complete) else {
            warn!("no complete row, head left as is");
            return Ok((df.clone(), None));
        };
        if first == 0 {
            return Ok((df.clone(), None));
        }

        let question = format!(
            "The first {first} row(s) are incomplete. Shift data columns up by {first} row(s)?"
        );
        if !self.notifier.confirm(&question, false) {
            info!(offset = first, "head trim declined");
            return Ok((df.clone(), None));
        }

        let columns = df
            .get_columns()
            .iter()
            .map(|column| {
                if is_time_column(column.name()) {
                    Ok(column.clone())
                } else {
                    shift_up(column, first)
                }
            })
            .collect::<PolarsResult<Vec<_>>>()?;
        info!(offset = first, "shifted data columns up");
        Ok((DataFrame::new(columns)?, Some(first)))
    }
}

/// Drops every row after the last complete one. Returns the count dropped.
pub fn trim_tail(df: &DataFrame) -> (DataFrame, usize) {
    match complete_rows(df).iter().rposition(|&complete| complete) {
        Some(last) => {
            let keep = last + 1;
            let dropped = df.height() - keep;
            if dropped > 0 {
                info!(dropped, "trimmed incomplete trailing rows");
            }
            (df.head(Some(keep)), dropped)
        }
        None => (df.clone(), 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitmerge_common::{column_f64, column_names};
    use fitmerge_model::{NoticeLevel, RecordingNotifier};

    fn base(rows: usize) -> DataFrame {
        DataFrame::new(vec![
            Column::new("secs".into(), (0..rows as i64).collect::<Vec<_>>()),
            Column::new(
                "watts".into(),
                (0..rows).map(|i| i as f64 * 10.0).collect::<Vec<_>>(),
            ),
        ])
        .unwrap()
    }

    fn smo2(rows: usize) -> NamedTable {
        let values: Vec<f64> = (0..rows).map(|i| 65.0 - 0.5 * i as f64).collect();
        NamedTable::new(
            "moxy_avg_clean.csv",
            DataFrame::new(vec![Column::new("smo2".into(), values)]).unwrap(),
        )
    }

    fn hrv(rows: usize) -> NamedTable {
        NamedTable::new(
            "watch_clean.csv",
            DataFrame::new(vec![Column::new("hrv".into(), vec![40.0; rows])]).unwrap(),
        )
    }

    #[test]
    fn test_end_to_end_merge() {
        let notifier = RecordingNotifier::new();
        let outcome = MergeEngine::new(&notifier)
            .merge(&base(10), &[smo2(10)], MergeOptions::default())
            .unwrap();
        let table = outcome.table;
        assert_eq!(table.height(), 10);
        assert_eq!(column_names(&table), vec!["secs", "watts", "smo2"]);
        let smo2 = column_f64(table.column("smo2").unwrap());
        assert_eq!(smo2[0], Some(65.0));
        assert_eq!(smo2[9], Some(60.5));
        assert!(notifier.texts(NoticeLevel::Question).is_empty());
    }

    #[test]
    fn test_base_wins_duplicate_columns() {
        let notifier = RecordingNotifier::new();
        let source = NamedTable::new(
            "other.csv",
            DataFrame::new(vec![
                Column::new("watts".into(), vec![999.0; 10]),
                Column::new("smo2".into(), vec![60.0; 10]),
            ])
            .unwrap(),
        );
        let outcome = MergeEngine::new(&notifier)
            .merge(&base(10), &[source], MergeOptions::default())
            .unwrap();
        assert_eq!(
            column_f64(outcome.table.column("watts").unwrap()),
            column_f64(base(10).column("watts").unwrap())
        );
        assert_eq!(
            outcome.ignored,
            vec![("other.csv".to_string(), vec!["watts".to_string()])]
        );
    }

    #[test]
    fn test_source_without_new_columns_is_skipped() {
        let notifier = RecordingNotifier::new();
        let outcome = MergeEngine::new(&notifier)
            .merge(&base(4), &[smo2(4), smo2(4)], MergeOptions::default())
            .unwrap();
        assert_eq!(outcome.table.width(), 3);
        assert_eq!(outcome.skipped, vec!["moxy_avg_clean.csv".to_string()]);
    }

    #[test]
    fn test_merge_order_does_not_change_values() {
        let notifier = RecordingNotifier::new();
        let engine = MergeEngine::new(&notifier);
        let forward = engine
            .merge(&base(10), &[smo2(10), hrv(10)], MergeOptions::default())
            .unwrap()
            .table;
        let backward = engine
            .merge(&base(10), &[hrv(10), smo2(10)], MergeOptions::default())
            .unwrap()
            .table;
        for name in ["secs", "watts", "smo2", "hrv"] {
            assert_eq!(
                column_f64(forward.column(name).unwrap()),
                column_f64(backward.column(name).unwrap()),
                "column {name}"
            );
        }
    }

    #[test]
    fn test_shorter_source_is_padded_then_tail_trimmed() {
        let notifier = RecordingNotifier::new();
        let outcome = MergeEngine::new(&notifier)
            .merge(&base(10), &[smo2(7)], MergeOptions::default())
            .unwrap();
        assert_eq!(outcome.tail_trimmed, 3);
        assert_eq!(outcome.table.height(), 7);

        let untrimmed = MergeEngine::new(&notifier)
            .merge(
                &base(10),
                &[smo2(12)],
                MergeOptions {
                    trim_head: false,
                    trim_tail: false,
                },
            )
            .unwrap();
        assert_eq!(untrimmed.table.height(), 10);
    }

    #[test]
    fn test_head_trim_shifts_data_columns_when_confirmed() {
        let source = NamedTable::new(
            "moxy_avg_clean.csv",
            DataFrame::new(vec![Column::new(
                "smo2".into(),
                [None, None, Some(60.0), Some(61.0), Some(62.0)],
            )])
            .unwrap(),
        );

        let notifier = RecordingNotifier::new().with_answers([true]);
        let outcome = MergeEngine::new(&notifier)
            .merge(&base(5), std::slice::from_ref(&source), MergeOptions::default())
            .unwrap();
        assert_eq!(outcome.head_shift, Some(2));
        assert_eq!(outcome.tail_trimmed, 2);
        let table = outcome.table;
        assert_eq!(
            column_f64(table.column("secs").unwrap()),
            vec![Some(0.0), Some(1.0), Some(2.0)]
        );
        assert_eq!(
            column_f64(table.column("smo2").unwrap()),
            vec![Some(60.0), Some(61.0), Some(62.0)]
        );
        assert_eq!(
            column_f64(table.column("watts").unwrap()),
            vec![Some(20.0), Some(30.0), Some(40.0)]
        );

        let declined = RecordingNotifier::new();
        let outcome = MergeEngine::new(&declined)
            .merge(&base(5), &[source], MergeOptions::default())
            .unwrap();
        assert_eq!(outcome.head_shift, None);
        assert_eq!(outcome.table.height(), 5);
        assert_eq!(declined.texts(NoticeLevel::Question).len(), 1);
    }
}
