//! The layered integrity validator.

use std::collections::HashMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;
use tracing::{debug, info};

use fitmerge_ingest::read_all;
use fitmerge_model::{Notifier, Settings};

use crate::checks::{TimestampChecks, datatype, frequency, gaps, presence, timestamps};
use crate::issue::{Issue, Severity};
use crate::report::{BatchReport, ValidationReport};
use crate::schema::TableSchema;

/// Validator configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorOptions {
    /// Runs of missing values at least this long are reported.
    pub gap_threshold: usize,
    /// Allowed relative deviation from the expected sampling rate.
    pub frequency_tolerance: f64,
    pub fail_fast: bool,
    pub strict: bool,
    pub timestamps: TimestampChecks,
    pub max_workers: usize,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for ValidatorOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            gap_threshold: settings.gap_threshold,
            frequency_tolerance: settings.frequency_tolerance,
            fail_fast: settings.fail_fast,
            strict: settings.strict,
            timestamps: TimestampChecks::default(),
            max_workers: settings.workers(),
        }
    }
}

/// A file to validate and the schema it must satisfy.
#[derive(Debug, Clone)]
pub struct FileCheck {
    pub path: PathBuf,
    pub schema: TableSchema,
}

impl FileCheck {
    pub fn new(path: impl Into<PathBuf>, schema: TableSchema) -> Self {
        Self {
            path: path.into(),
            schema,
        }
    }
}

/// Collects issues and decides when validation stops.
struct Collector {
    report: ValidationReport,
    fail_fast: bool,
}

impl Collector {
    /// Records an issue; returns true when validation must stop.
    fn record(&mut self, issue: Issue) -> bool {
        let severity = issue.severity(self.fail_fast);
        self.report.push(issue, severity);
        if self.fail_fast && severity == Severity::Error {
            self.report.stopped_early = true;
            return true;
        }
        false
    }

    fn record_all(&mut self, issues: impl IntoIterator<Item = Issue>) -> bool {
        issues.into_iter().any(|issue| self.record(issue))
    }
}

/// Validates tables layer by layer: emptiness, column presence, numeric
/// types, timestamps, sampling rate, then missing-value gaps.
#[derive(Debug, Clone, Default)]
pub struct IntegrityValidator {
    options: ValidatorOptions,
}

impl IntegrityValidator {
    pub fn new(options: ValidatorOptions) -> Self {
        Self { options }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(ValidatorOptions::from(settings))
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// Validate one table against `schema`.
    ///
    /// An empty table stops validation. In fail-fast mode validation stops at
    /// the first error; in strict mode warnings are reported as errors.
    pub fn validate_table(&self, df: &DataFrame, schema: &TableSchema) -> ValidationReport {
        let mut collector = Collector {
            report: ValidationReport::new(),
            fail_fast: self.options.fail_fast,
        };
        self.run_layers(df, schema, &mut collector);

        let mut report = collector.report;
        if self.options.strict {
            report.promote_warnings();
        }
        debug!(
            rows = df.height(),
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            stopped_early = report.stopped_early,
            "validated table"
        );
        report
    }

    /// Validate a table with no column expectations, as done for merged output.
    pub fn validate_frame(&self, df: &DataFrame) -> ValidationReport {
        self.validate_table(df, &TableSchema::default())
    }

    fn run_layers(&self, df: &DataFrame, schema: &TableSchema, collector: &mut Collector) {
        if df.height() == 0 || df.width() == 0 {
            collector.record(Issue::EmptyTable);
            return;
        }
        if collector.record_all(presence::check(df, schema)) {
            return;
        }
        if collector.record_all(datatype::check(df, schema)) {
            return;
        }

        if let Some(time_column) = schema.resolve_time_column(df) {
            if collector.record_all(timestamps::check(df, &time_column, self.options.timestamps)) {
                return;
            }
            if let Some(expected_hz) = schema.expected_hz
                && collector.record_all(frequency::check(
                    df,
                    &time_column,
                    expected_hz,
                    self.options.frequency_tolerance,
                ))
            {
                return;
            }
        }

        collector.record_all(gaps::check(df, self.options.gap_threshold));
    }

    /// Validate many files, reading and validating them on a bounded pool.
    ///
    /// Unreadable files get a file-format error. Each file's findings are sent
    /// to `notifier` in path order.
    pub fn validate_files<F, E>(
        &self,
        files: &[FileCheck],
        read: F,
        parallel: bool,
        notifier: &dyn Notifier,
    ) -> BatchReport
    where
        F: Fn(&Path) -> Result<DataFrame, E> + Sync,
        E: Display,
    {
        let schemas: HashMap<&Path, &TableSchema> = files
            .iter()
            .map(|file| (file.path.as_path(), &file.schema))
            .collect();
        let paths: Vec<PathBuf> = files.iter().map(|file| file.path.clone()).collect();
        let workers = if parallel { self.options.max_workers } else { 1 };

        let reads = read_all(&paths, workers, |path| {
            let df = read(path)?;
            let report = match schemas.get(path) {
                Some(schema) => self.validate_table(&df, schema),
                None => self.validate_frame(&df),
            };
            Ok::<_, E>(report)
        });

        let mut batch = BatchReport::default();
        for (path, report) in reads.tables {
            batch.reports.insert(path, report);
        }
        for (path, reason) in reads.failures {
            let mut report = ValidationReport::new();
            report.push(Issue::FileFormat { reason }, Severity::Error);
            batch.reports.insert(path, report);
        }

        let total = batch.reports.len();
        for (idx, (path, report)) in batch.reports.iter().enumerate() {
            notifier.progress(idx + 1, total, &display_name(path));
            notify_report(notifier, path, report);
        }
        info!(
            files = total,
            errors = batch.error_count(),
            warnings = batch.warning_count(),
            "validation finished"
        );
        batch
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn notify_report(notifier: &dyn Notifier, path: &Path, report: &ValidationReport) {
    let name = display_name(path);
    for issue in &report.errors {
        notifier.error(&format!("{name}: {issue}"));
    }
    for issue in &report.warnings {
        notifier.warning(&format!("{name}: {issue}"));
    }
    if report.is_valid() && !report.has_warnings() {
        notifier.success(&format!("{name}: passed"));
    }
}
