//! Consecutive missing-value checks.

use polars::prelude::DataFrame;

use fitmerge_common::scan_column_gaps;

use crate::issue::Issue;

/// Report every column whose longest run of missing values reaches `threshold`.
pub fn check(df: &DataFrame, threshold: usize) -> Vec<Issue> {
    let threshold = threshold.max(1);
    df.get_columns()
        .iter()
        .filter_map(|column| {
            let scan = scan_column_gaps(column, threshold);
            (scan.max_run >= threshold).then(|| Issue::DataGap {
                column: column.name().to_string(),
                length: scan.max_run,
                threshold,
                start_row: scan.start,
            })
        })
        .collect()
}
