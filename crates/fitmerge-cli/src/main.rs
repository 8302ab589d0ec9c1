//! fitmerge command line.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use fitmerge_cli::logging::{LogConfig, LogFormat, init_logging};
use fitmerge_core::CoreError;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{
    Outcome, build_pipeline, run_all, run_cleanup, run_import, run_inspect, run_merge,
    run_process, run_sources, run_validate,
};

/// Exit code when the user declined to continue.
const EXIT_ABORTED: i32 = 2;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(Outcome::Success) => 0,
        Ok(Outcome::Failed) => 1,
        Err(error) => {
            let aborted = error
                .downcast_ref::<CoreError>()
                .is_some_and(CoreError::is_aborted);
            if aborted {
                eprintln!("aborted: {error:#}");
                EXIT_ABORTED
            } else {
                eprintln!("error: {error:#}");
                1
            }
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> anyhow::Result<Outcome> {
    if let Command::Sources(args) = &cli.command {
        return run_sources(args);
    }
    let pipeline = build_pipeline(cli)?;
    match &cli.command {
        Command::Cleanup => run_cleanup(&pipeline),
        Command::Import => run_import(&pipeline),
        Command::Process => Ok(run_process(&pipeline)),
        Command::Validate => run_validate(&pipeline),
        Command::Merge(args) => run_merge(&pipeline, *args),
        Command::Run(args) => run_all(&pipeline, *args),
        Command::Inspect(args) => run_inspect(&pipeline, args),
        Command::Sources(args) => run_sources(args),
    }
}

/// Logging from flags. An explicit `-v`/`-q` or `--log-level` wins over
/// `RUST_LOG`.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let explicit = cli.log_level.map(|level| match level {
        LogLevelArg::Error => LevelFilter::ERROR,
        LogLevelArg::Warn => LevelFilter::WARN,
        LogLevelArg::Info => LevelFilter::INFO,
        LogLevelArg::Debug => LevelFilter::DEBUG,
        LogLevelArg::Trace => LevelFilter::TRACE,
    });
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    let ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };

    LogConfig::default()
        .with_level_filter(explicit.unwrap_or_else(|| cli.verbosity.tracing_level_filter()))
        .with_env_filter(!cli.verbosity.is_present() && explicit.is_none())
        .with_format(format)
        .with_ansi(ansi)
        .with_log_file(cli.log_file.clone())
}
