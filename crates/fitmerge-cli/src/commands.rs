use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::{info, info_span};

use fitmerge_cli::config::{Overrides, resolve_settings};
use fitmerge_cli::console::ConsoleNotifier;
use fitmerge_core::{Inspection, MergeRequest, Pipeline};
use fitmerge_ingest::{FileSystem, LocalFileSystem};
use fitmerge_model::{Notifier, SourceKind};

use crate::cli::{Cli, InspectArgs, MergeArgs, SourcesArgs};
use crate::summary::{
    print_batch, print_cleanup, print_import, print_inspection, print_merge, print_processing,
    print_sources,
};

/// How a command that ran to completion went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Finished, but with failed files or invalid tables.
    Failed,
}

impl Outcome {
    fn from_success(success: bool) -> Self {
        if success { Self::Success } else { Self::Failed }
    }
}

pub fn build_pipeline(cli: &Cli) -> Result<Pipeline> {
    let overrides = Overrides {
        base_dir: cli.base_dir.clone(),
        inbox_dir: cli.inbox.clone(),
        interpolation: cli.interpolation,
        strict: cli.strict,
        fail_fast: cli.fail_fast,
    };
    let loaded = resolve_settings(cli.config.as_deref(), &overrides)?;
    info!(
        base_dir = %loaded.settings.base_dir.display(),
        inbox = %loaded.settings.inbox_dir.display(),
        config = ?loaded.source,
        dry_run = cli.dry_run,
        "settings resolved"
    );

    let fs: Arc<dyn FileSystem> = if cli.dry_run {
        Arc::new(LocalFileSystem::dry_run())
    } else {
        Arc::new(LocalFileSystem::new())
    };
    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier::new(cli.yes));
    Ok(Pipeline::new(loaded.settings, fs, notifier))
}

fn merge_request(args: MergeArgs) -> MergeRequest {
    MergeRequest {
        trim_head: !args.no_head_trim,
        trim_tail: !args.no_tail_trim,
        validate_output: args.validate_output,
    }
}

pub fn run_sources(args: &SourcesArgs) -> Result<Outcome> {
    let kinds = match args.name.as_deref() {
        Some(name) => match SourceKind::parse(name) {
            Some(kind) => vec![kind],
            None => bail!(
                "unknown source '{name}' (expected one of: {})",
                SourceKind::ALL.map(SourceKind::name).join(", ")
            ),
        },
        None => SourceKind::ALL.to_vec(),
    };
    print_sources(&kinds);
    Ok(Outcome::Success)
}

pub fn run_cleanup(pipeline: &Pipeline) -> Result<Outcome> {
    let report = pipeline.run_cleanup().context("cleanup failed")?;
    print_cleanup(&report);
    Ok(Outcome::Success)
}

pub fn run_import(pipeline: &Pipeline) -> Result<Outcome> {
    let report = pipeline.run_import().context("import failed")?;
    print_import(&report);
    Ok(Outcome::from_success(report.failed.is_empty()))
}

pub fn run_process(pipeline: &Pipeline) -> Outcome {
    let reports = pipeline.run_processing();
    print_processing(&reports);
    Outcome::from_success(reports.iter().all(|report| report.failed.is_empty()))
}

pub fn run_validate(pipeline: &Pipeline) -> Result<Outcome> {
    let _span = info_span!("validate_command").entered();
    let batch = pipeline
        .validate_clean_tables()
        .context("validation failed")?;
    print_batch(&batch);
    Ok(Outcome::from_success(batch.is_valid()))
}

pub fn run_merge(pipeline: &Pipeline, args: MergeArgs) -> Result<Outcome> {
    let summary = pipeline
        .run_merge(merge_request(args))
        .context("merge failed")?;
    print_merge(&summary);
    let output_valid = summary
        .validation
        .as_ref()
        .is_none_or(|report| report.is_valid());
    Ok(Outcome::from_success(output_valid))
}

pub fn run_all(pipeline: &Pipeline, args: MergeArgs) -> Result<Outcome> {
    let report = pipeline
        .run_full(merge_request(args))
        .context("run failed")?;
    print_cleanup(&report.cleanup);
    print_import(&report.import);
    print_processing(&report.processing);
    print_batch(&report.validation);
    print_merge(&report.merge);
    let processed = report
        .processing
        .iter()
        .all(|processing| processing.failed.is_empty());
    Ok(Outcome::from_success(
        processed && report.import.failed.is_empty(),
    ))
}

pub fn run_inspect(pipeline: &Pipeline, args: &InspectArgs) -> Result<Outcome> {
    let inspection = pipeline
        .inspect(&args.file)
        .with_context(|| format!("failed to inspect {}", args.file.display()))?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&inspection_json(&inspection))?);
    } else {
        print_inspection(&inspection);
    }
    Ok(Outcome::from_success(inspection.report.is_valid()))
}

fn inspection_json(inspection: &Inspection) -> serde_json::Value {
    serde_json::json!({
        "path": inspection.path,
        "source": inspection.kind,
        "rows": inspection.rows,
        "columns": inspection.columns,
        "valid": inspection.report.is_valid(),
        "report": inspection.report,
    })
}
