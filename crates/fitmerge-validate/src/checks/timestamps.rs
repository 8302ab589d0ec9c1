//! Timestamp checks: negatives, backwards steps and duplicates.

use std::collections::HashSet;

use polars::prelude::DataFrame;

use fitmerge_common::column_f64;

use crate::issue::Issue;

/// Which timestamp checks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampChecks {
    pub negative: bool,
    pub monotonic: bool,
    pub duplicates: bool,
}

impl Default for TimestampChecks {
    fn default() -> Self {
        Self {
            negative: true,
            monotonic: true,
            duplicates: true,
        }
    }
}

/// Check the time column of `df`.
///
/// Missing cells are skipped; a decrease is measured against the previous
/// present value.
pub fn check(df: &DataFrame, time_column: &str, checks: TimestampChecks) -> Vec<Issue> {
    let mut issues = Vec::new();
    let Ok(column) = df.column(time_column) else {
        return issues;
    };
    let times: Vec<(usize, f64)> = column_f64(column)
        .into_iter()
        .enumerate()
        .filter_map(|(row, time)| time.map(|t| (row, t)))
        .collect();

    if checks.negative {
        let negatives: Vec<usize> = times
            .iter()
            .filter(|(_, t)| *t < 0.0)
            .map(|(row, _)| *row)
            .collect();
        if let Some(&first_row) = negatives.first() {
            issues.push(Issue::NegativeTimestamps {
                column: time_column.to_string(),
                count: negatives.len() as u64,
                first_row,
            });
        }
    }

    if checks.monotonic {
        let decreases: Vec<usize> = times
            .windows(2)
            .filter(|pair| pair[1].1 < pair[0].1)
            .map(|pair| pair[1].0)
            .collect();
        if let Some(&first_row) = decreases.first() {
            issues.push(Issue::NonMonotonicTimestamps {
                column: time_column.to_string(),
                count: decreases.len() as u64,
                first_row,
            });
        }
    }

    if checks.duplicates {
        let mut seen = HashSet::new();
        let duplicates: Vec<usize> = times
            .iter()
            .filter(|(_, t)| !seen.insert(t.to_bits()))
            .map(|(row, _)| *row)
            .collect();
        if let Some(&first_row) = duplicates.first() {
            issues.push(Issue::DuplicateTimestamps {
                column: time_column.to_string(),
                count: duplicates.len() as u64,
                first_row,
            });
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::Column;

    fn secs(values: &[Option<i64>]) -> DataFrame {
        DataFrame::new(vec![Column::new("secs".into(), values.to_vec())]).unwrap()
    }

    #[test]
    fn test_clean_series() {
        let df = secs(&[Some(0), Some(1), None, Some(3)]);
        assert!(check(&df, "secs", TimestampChecks::default()).is_empty());
    }

    #[test]
    fn test_reports_each_problem_once() {
        let df = secs(&[Some(-1), Some(0), Some(2), Some(1), Some(2), Some(2)]);
        let issues = check(&df, "secs", TimestampChecks::default());
        assert_eq!(
            issues,
            vec![
                Issue::NegativeTimestamps {
                    column: "secs".to_string(),
                    count: 1,
                    first_row: 0,
                },
                Issue::NonMonotonicTimestamps {
                    column: "secs".to_string(),
                    count: 1,
                    first_row: 3,
                },
                Issue::DuplicateTimestamps {
                    column: "secs".to_string(),
                    count: 2,
                    first_row: 4,
                },
            ]
        );
    }

    #[test]
    fn test_checks_can_be_disabled() {
        let df = secs(&[Some(-1), Some(-1)]);
        let checks = TimestampChecks {
            negative: false,
            duplicates: false,
            ..Default::default()
        };
        assert!(check(&df, "secs", checks).is_empty());
    }
}
