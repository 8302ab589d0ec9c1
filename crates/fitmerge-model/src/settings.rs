//! Run configuration.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Lines scanned when looking for a header row.
pub const HEADER_SCAN_MAX_LINES: usize = 60;
/// Default size of the file-reading worker pool.
pub const DEFAULT_MAX_WORKERS: usize = 4;
/// Default longest tolerated run of missing values.
pub const DEFAULT_GAP_THRESHOLD: usize = 10;
/// Default relative tolerance for the sampling-rate check.
pub const DEFAULT_FREQUENCY_TOLERANCE: f64 = 0.2;
/// Default number of leading rows inspected for warm-up artifacts.
pub const DEFAULT_LEADING_TRIM_LIMIT: usize = 30;
/// Default longest gap the interpolator fills.
pub const DEFAULT_MAX_INTERPOLATION_GAP: usize = 5;

/// Gap filling strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMethod {
    /// Leave gaps untouched.
    None,
    /// Straight line between the values around the gap.
    #[default]
    Linear,
    /// Repeat the last value before the gap.
    #[serde(alias = "pad")]
    ForwardFill,
    /// Repeat the first value after the gap.
    BackwardFill,
}

impl InterpolationMethod {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Linear => "linear",
            Self::ForwardFill => "forward_fill",
            Self::BackwardFill => "backward_fill",
        }
    }

    /// Parse a method name; `ffill`/`pad` and `bfill` are accepted too.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "none" => Some(Self::None),
            "linear" => Some(Self::Linear),
            "forward_fill" | "ffill" | "pad" => Some(Self::ForwardFill),
            "backward_fill" | "bfill" => Some(Self::BackwardFill),
            _ => None,
        }
    }
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Interpolation applied to every clean table before it is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationSettings {
    pub method: InterpolationMethod,
    pub max_gap: usize,
}

impl Default for InterpolationSettings {
    fn default() -> Self {
        Self {
            method: InterpolationMethod::default(),
            max_gap: DEFAULT_MAX_INTERPOLATION_GAP,
        }
    }
}

/// Settings for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root of the working-directory layout.
    pub base_dir: PathBuf,
    /// Directory new exports are imported from.
    pub inbox_dir: PathBuf,
    pub header_scan_max_lines: usize,
    pub max_workers: usize,
    pub gap_threshold: usize,
    pub frequency_tolerance: f64,
    pub leading_trim_limit: usize,
    pub interpolation: InterpolationSettings,
    /// Fill absent required columns with their fallback value instead of failing.
    pub fill_missing_required: bool,
    /// Promote validation warnings to errors.
    pub strict: bool,
    /// Stop validating a table at its first error.
    pub fail_fast: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("fitmerge"),
            inbox_dir: PathBuf::from("inbox"),
            header_scan_max_lines: HEADER_SCAN_MAX_LINES,
            max_workers: DEFAULT_MAX_WORKERS,
            gap_threshold: DEFAULT_GAP_THRESHOLD,
            frequency_tolerance: DEFAULT_FREQUENCY_TOLERANCE,
            leading_trim_limit: DEFAULT_LEADING_TRIM_LIMIT,
            interpolation: InterpolationSettings::default(),
            fill_missing_required: false,
            strict: false,
            fail_fast: false,
        }
    }
}

impl Settings {
    /// Settings rooted at the given directories, everything else default.
    #[must_use]
    pub fn with_dirs(base_dir: impl Into<PathBuf>, inbox_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            inbox_dir: inbox_dir.into(),
            ..Default::default()
        }
    }

    /// Worker count, never zero.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.max_workers.max(1)
    }
}
