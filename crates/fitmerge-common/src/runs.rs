//! Runs of missing values.

use polars::prelude::Column;

use crate::columns::missing_mask;

/// A maximal run of missing values in one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NullRun {
    /// Row index of the first missing value.
    pub start: usize,
    pub len: usize,
}

impl NullRun {
    /// Row index one past the last missing value.
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Result of the consecutive-gap scan of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GapScan {
    /// Longest run found, or the total missing count when the early exit applied.
    pub max_run: usize,
    /// Start of the longest run when the full scan ran.
    pub start: Option<usize>,
}

/// Run-length encodes a missing-value mask.
pub fn null_runs(mask: &[bool]) -> Vec<NullRun> {
    let mut runs = Vec::new();
    let mut current: Option<NullRun> = None;
    for (idx, &missing) in mask.iter().enumerate() {
        if !missing {
            runs.extend(current.take());
        } else if let Some(run) = current.as_mut() {
            run.len += 1;
        } else {
            current = Some(NullRun { start: idx, len: 1 });
        }
    }
    runs.extend(current);
    runs
}

/// Longest run of missing values, with an early exit.
///
/// When the total missing count is below `threshold` no run can reach it, so
/// the count is returned without encoding the mask.
pub fn scan_gaps(mask: &[bool], threshold: usize) -> GapScan {
    let missing = mask.iter().filter(|&&flag| flag).count();
    if missing == 0 {
        return GapScan::default();
    }
    if missing < threshold {
        return GapScan {
            max_run: missing,
            start: None,
        };
    }
    null_runs(mask)
        .into_iter()
        .fold(GapScan::default(), |best, run| {
            if run.len > best.max_run {
                GapScan {
                    max_run: run.len,
                    start: Some(run.start),
                }
            } else {
                best
            }
        })
}

/// [`scan_gaps`] over a column.
pub fn scan_column_gaps(column: &Column, threshold: usize) -> GapScan {
    scan_gaps(&missing_mask(column), threshold)
}
