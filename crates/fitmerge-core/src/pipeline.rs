//! Run orchestration.
//!
//! A [`Pipeline`] runs the stages of a session over the working-directory
//! layout: cleanup, import, processing, validation and merge. Directory
//! mutations happen here, on the calling thread only.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use polars::prelude::DataFrame;
use tracing::{debug, info, info_span, warn};

use fitmerge_common::column_names;
use fitmerge_ingest::{FileSystem, ReadOptions, classify_file, read_all};
use fitmerge_model::{Notifier, Settings, SourceKind};
use fitmerge_validate::{BatchReport, FileCheck, IntegrityValidator, TableSchema, ValidationReport};

use crate::error::{CoreError, Result};
use crate::layout::{OUTPUT_PATTERN, WorkspaceLayout};
use crate::merge::{MergeEngine, MergeOptions, MergeOutcome, NamedTable};
use crate::sources::{self, ProcessReport, SourceContext, display_name, wahoo};

/// Options of a merge run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRequest {
    pub trim_head: bool,
    pub trim_tail: bool,
    /// Validate the merged table before saving it.
    pub validate_output: bool,
}

impl Default for MergeRequest {
    fn default() -> Self {
        Self {
            trim_head: true,
            trim_tail: true,
            validate_output: false,
        }
    }
}

impl MergeRequest {
    pub fn options(&self) -> MergeOptions {
        MergeOptions {
            trim_head: self.trim_head,
            trim_tail: self.trim_tail,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Files archived per source directory.
    pub archived: BTreeMap<SourceKind, usize>,
    /// Previous merged outputs moved aside.
    pub outputs_archived: usize,
}

impl CleanupReport {
    pub fn total(&self) -> usize {
        self.archived.values().sum::<usize>() + self.outputs_archived
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Imported files and where they went.
    pub imported: Vec<(SourceKind, PathBuf)>,
    /// Inbox files matching no source.
    pub unrecognized: Vec<PathBuf>,
    /// Recognized files left in the inbox, such as a second base export.
    pub ignored: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

/// Result of a merge run.
#[derive(Debug, Clone)]
pub struct MergeSummary {
    pub output: PathBuf,
    pub outcome: MergeOutcome,
    /// Clean tables that could not be read, with the error text.
    pub unreadable: BTreeMap<PathBuf, String>,
    pub validation: Option<ValidationReport>,
}

/// Everything a full run did.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub cleanup: CleanupReport,
    pub import: ImportReport,
    pub processing: Vec<ProcessReport>,
    pub validation: BatchReport,
    pub merge: MergeSummary,
}

/// One file classified and validated against its raw schema.
#[derive(Debug, Clone)]
pub struct Inspection {
    pub path: PathBuf,
    pub kind: Option<SourceKind>,
    pub rows: usize,
    pub columns: Vec<String>,
    pub report: ValidationReport,
}

/// Runs the session stages against one working directory.
pub struct Pipeline {
    settings: Settings,
    layout: WorkspaceLayout,
    fs: Arc<dyn FileSystem>,
    notifier: Arc<dyn Notifier>,
    validator: IntegrityValidator,
}

impl Pipeline {
    pub fn new(settings: Settings, fs: Arc<dyn FileSystem>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            layout: WorkspaceLayout::from_settings(&settings),
            validator: IntegrityValidator::from_settings(&settings),
            settings,
            fs,
            notifier,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    pub fn validator(&self) -> &IntegrityValidator {
        &self.validator
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    fn context(&self) -> SourceContext<'_> {
        SourceContext {
            settings: &self.settings,
            layout: &self.layout,
            fs: self.fs.as_ref(),
            notifier: self.notifier.as_ref(),
        }
    }

    /// Archives the source directories and previous merged outputs.
    pub fn run_cleanup(&self) -> Result<CleanupReport> {
        let _span = info_span!("cleanup").entered();
        self.notifier.header("Cleanup");
        let ctx = self.context();
        let mut report = CleanupReport::default();
        for kind in SourceKind::ALL {
            report.archived.insert(kind, sources::archive_all(&ctx, kind)?);
        }

        let outputs = self.fs.glob(self.layout.base_dir(), OUTPUT_PATTERN)?;
        if !outputs.is_empty() {
            let archive = self.layout.training_archive_dir();
            self.fs.create_dir_all(&archive)?;
            for path in &outputs {
                let target = archive.join(path.file_name().unwrap_or_default());
                match self.fs.move_file(path, &target) {
                    Ok(()) => report.outputs_archived += 1,
                    Err(error) => self
                        .notifier
                        .error(&format!("could not archive {}: {error}", display_name(path))),
                }
            }
        }

        info!(
            archived = report.total(),
            outputs = report.outputs_archived,
            "cleanup finished"
        );
        self.notifier
            .success(&format!("{} file(s) archived", report.total()));
        Ok(report)
    }

    /// Moves recognized inbox exports into their source directories.
    ///
    /// Only the first base export is imported; later ones stay in the inbox.
    pub fn run_import(&self) -> Result<ImportReport> {
        let _span = info_span!("import").entered();
        self.notifier.header("Import");
        let mut report = ImportReport::default();
        let inbox = self.layout.inbox_dir();
        if !self.fs.exists(inbox) {
            self.notifier
                .error(&format!("inbox not found: {}", inbox.display()));
            return Ok(report);
        }

        let mut base_imported = false;
        for path in self.fs.glob(inbox, "*.csv")? {
            let name = display_name(&path);
            let Some(kind) = classify_file(&path, self.settings.header_scan_max_lines) else {
                debug!(file = %name, "not a known export");
                report.unrecognized.push(path);
                continue;
            };
            if kind.is_base() && base_imported {
                self.notifier.warning(&format!(
                    "{name}: a {kind} export was already imported, left in the inbox"
                ));
                report.ignored.push(path);
                continue;
            }

            match self.import_file(kind, &path) {
                Ok(destination) => {
                    base_imported |= kind.is_base();
                    self.notifier.success(&format!("{name} -> {kind}"));
                    report.imported.push((kind, destination));
                }
                Err(error) => {
                    warn!(%error, file = %name, "import failed");
                    self.notifier.error(&format!("{name}: {error}"));
                    report.failed.push((path, error.to_string()));
                }
            }
        }

        if report.imported.is_empty() {
            self.notifier.warning("no new exports found in the inbox");
        }
        info!(
            imported = report.imported.len(),
            unrecognized = report.unrecognized.len(),
            "import finished"
        );
        Ok(report)
    }

    fn import_file(&self, kind: SourceKind, path: &Path) -> Result<PathBuf> {
        self.fs.create_dir_all(&self.layout.source_dir(kind))?;
        let destination = sources::import_destination(kind, &self.layout, path);
        self.fs.copy(path, &destination)?;
        self.fs.remove(path)?;
        Ok(destination)
    }

    /// Runs every normalizer in priority order. A failing source is
    /// reported and the others still run.
    pub fn run_processing(&self) -> Vec<ProcessReport> {
        let _span = info_span!("processing").entered();
        self.notifier.header("Processing");
        let ctx = self.context();
        SourceKind::ALL
            .into_iter()
            .map(|kind| {
                sources::process(kind, &ctx).unwrap_or_else(|error| {
                    warn!(%error, source = %kind, "source processing failed");
                    self.notifier.error(&format!("{kind}: {error}"));
                    let mut report = ProcessReport::new(kind);
                    report
                        .failed
                        .push((self.layout.source_dir(kind), error.to_string()));
                    report
                })
            })
            .collect()
    }

    /// Clean tables of every source, base first.
    pub fn clean_table_checks(&self) -> Result<Vec<FileCheck>> {
        let ctx = self.context();
        let mut checks = Vec::new();
        for kind in SourceKind::ALL {
            let schema = TableSchema::clean(kind.spec());
            for path in sources::clean_files(kind, &ctx)? {
                checks.push(FileCheck::new(path, schema.clone()));
            }
        }
        Ok(checks)
    }

    /// Validates every clean table on the reader pool, without asking
    /// anything.
    pub fn validate_clean_tables(&self) -> Result<BatchReport> {
        let checks = self.clean_table_checks()?;
        if checks.is_empty() {
            self.notifier.warning("no clean tables to validate");
            return Ok(BatchReport::default());
        }
        let fs = self.fs.as_ref();
        Ok(self.validator.validate_files(
            &checks,
            |path| fs.read_frame(path, ReadOptions::default()),
            true,
            self.notifier.as_ref(),
        ))
    }

    /// Validates every clean table.
    ///
    /// Any finding puts the run in a degraded state and the notifier is asked
    /// whether to go on. With errors the question defaults to no, with only
    /// warnings to yes. Declining returns [`CoreError::Aborted`].
    pub fn run_validation(&self) -> Result<BatchReport> {
        let _span = info_span!("validation").entered();
        self.notifier.header("Validation");
        let batch = self.validate_clean_tables()?;
        let errors = batch.error_count();
        let warnings = batch.warning_count();
        if errors + warnings == 0 {
            return Ok(batch);
        }

        let (question, default) = if errors > 0 {
            let failed = batch.failed_files().len();
            (format!("{failed} file(s) failed validation. Continue anyway?"), false)
        } else {
            (
                format!("Validation reported {warnings} warning(s). Continue anyway?"),
                true,
            )
        };
        if !self.notifier.confirm(&question, default) {
            let reason = if errors > 0 {
                "validation failed"
            } else {
                "validation warnings not accepted"
            };
            return Err(CoreError::Aborted {
                reason: reason.to_string(),
            });
        }
        warn!(errors, warnings, "continuing past validation findings");
        Ok(batch)
    }

    /// Merges the clean tables into the base and saves the result under
    /// today's date.
    pub fn run_merge(&self, request: MergeRequest) -> Result<MergeSummary> {
        self.run_merge_on(request, Local::now().date_naive())
    }

    /// [`Pipeline::run_merge`] with an explicit output date.
    pub fn run_merge_on(&self, request: MergeRequest, date: NaiveDate) -> Result<MergeSummary> {
        let _span = info_span!("merge_run").entered();
        self.notifier.header("Merge");
        let ctx = self.context();
        let base = wahoo::load_base(&ctx)?;

        let mut paths = Vec::new();
        for kind in SourceKind::ALL.into_iter().filter(|kind| !kind.is_base()) {
            paths.extend(sources::clean_files(kind, &ctx)?);
        }
        let fs = self.fs.as_ref();
        let reads = read_all(&paths, self.settings.workers(), |path| {
            fs.read_frame(path, ReadOptions::default())
        });
        for (path, reason) in &reads.failures {
            self.notifier
                .warning(&format!("{}: could not be read: {reason}", display_name(path)));
        }

        let tables: Vec<NamedTable> = reads
            .tables
            .into_iter()
            .map(|(path, df)| NamedTable::new(display_name(&path), df))
            .collect();
        if tables.is_empty() {
            self.notifier
                .warning("no clean tables found, the output holds the base table only");
        }

        let engine = MergeEngine::new(self.notifier.as_ref());
        let outcome = engine.merge(&base, &tables, request.options())?;

        let validation = request
            .validate_output
            .then(|| self.validate_output(&outcome.table));
        let output = self.save_output(&outcome.table, date)?;

        Ok(MergeSummary {
            output,
            outcome,
            unreadable: reads.failures,
            validation,
        })
    }

    fn validate_output(&self, df: &DataFrame) -> ValidationReport {
        let report = self.validator.validate_frame(df);
        for (severity, issue) in report.issues() {
            self.notifier
                .warning(&format!("merged table: {}: {issue}", severity.label()));
        }
        if report.is_valid() && !report.has_warnings() {
            self.notifier.success("merged table passed validation");
        }
        report
    }

    /// Writes the merged table, asking before an existing output is replaced.
    pub fn save_output(&self, df: &DataFrame, date: NaiveDate) -> Result<PathBuf> {
        let path = self.layout.output_path(date);
        if self.fs.exists(&path) {
            let question = format!("{} already exists. Overwrite?", display_name(&path));
            if !self.notifier.confirm(&question, false) {
                return Err(CoreError::OutputExists { path });
            }
        }
        self.fs.write_table(df, &path)?;
        info!(
            file = %path.display(),
            rows = df.height(),
            columns = df.width(),
            "saved merged table"
        );
        self.notifier.success(&format!(
            "{} rows x {} columns -> {}",
            df.height(),
            df.width(),
            display_name(&path)
        ));
        Ok(path)
    }

    /// Cleanup, import, processing, validation and merge in sequence.
    pub fn run_full(&self, request: MergeRequest) -> Result<RunReport> {
        let cleanup = self.run_cleanup()?;
        let import = self.run_import()?;
        let processing = self.run_processing();
        let validation = self.run_validation()?;
        let merge = self.run_merge(request)?;
        Ok(RunReport {
            cleanup,
            import,
            processing,
            validation,
            merge,
        })
    }

    /// Classifies one file and validates it against its raw schema.
    ///
    /// Unclassified files are read as plain CSV and get the generic checks.
    pub fn inspect(&self, path: &Path) -> Result<Inspection> {
        let kind = classify_file(path, self.settings.header_scan_max_lines);
        let (df, schema) = match kind {
            Some(kind) => (
                sources::read_raw(kind, &self.context(), path)?,
                TableSchema::raw(kind.spec()),
            ),
            None => (
                self.fs.read_frame(path, ReadOptions::default())?,
                TableSchema::default(),
            ),
        };
        let report = self.validator.validate_table(&df, &schema);
        Ok(Inspection {
            path: path.to_path_buf(),
            kind,
            rows: df.height(),
            columns: column_names(&df),
            report,
        })
    }
}
