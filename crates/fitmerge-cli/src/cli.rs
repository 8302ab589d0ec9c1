//! Command line definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use fitmerge_cli::config::parse_interpolation;
use fitmerge_model::InterpolationMethod;

#[derive(Parser)]
#[command(
    name = "fitmerge",
    version,
    about = "Merge training exports from several devices into one table",
    long_about = "Merge training exports from several devices into one time-aligned table.\n\n\
                  Exports are picked up from the inbox, normalized per device, validated and \
                  merged onto the bike computer's time axis."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Settings file (default: ./fitmerge.toml when present).
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Root of the working directories.
    #[arg(long = "base-dir", value_name = "DIR", global = true)]
    pub base_dir: Option<PathBuf>,

    /// Directory new exports are imported from.
    #[arg(long = "inbox", value_name = "DIR", global = true)]
    pub inbox: Option<PathBuf>,

    /// Log file operations instead of performing them.
    #[arg(long = "dry-run", global = true)]
    pub dry_run: bool,

    /// Answer yes to every question.
    #[arg(short = 'y', long = "yes", global = true)]
    pub yes: bool,

    /// Gap filling for clean tables (none, linear, ffill, bfill).
    #[arg(long, value_name = "METHOD", value_parser = parse_interpolation, global = true)]
    pub interpolation: Option<InterpolationMethod>,

    /// Treat validation warnings as errors.
    #[arg(long, global = true)]
    pub strict: bool,

    /// Stop validating a file at its first error.
    #[arg(long = "fail-fast", global = true)]
    pub fail_fast: bool,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Append logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Archive source directories and previous merged outputs.
    Cleanup,

    /// Move recognized exports from the inbox into their source directories.
    Import,

    /// Turn raw exports into clean tables.
    Process,

    /// Validate every clean table.
    Validate,

    /// Merge the clean tables onto the base table.
    Merge(MergeArgs),

    /// Cleanup, import, process, validate and merge.
    Run(MergeArgs),

    /// List the supported sources.
    Sources(SourcesArgs),

    /// Classify one file and validate it.
    Inspect(InspectArgs),
}

#[derive(Args, Clone, Copy)]
pub struct MergeArgs {
    /// Do not offer to shift data columns past incomplete leading rows.
    #[arg(long = "no-head-trim")]
    pub no_head_trim: bool,

    /// Keep incomplete trailing rows.
    #[arg(long = "no-tail-trim")]
    pub no_tail_trim: bool,

    /// Validate the merged table before saving it.
    #[arg(long = "validate-output")]
    pub validate_output: bool,
}

#[derive(Args)]
pub struct SourcesArgs {
    /// Show only this source (for example `garmin`).
    #[arg(value_name = "NAME")]
    pub name: Option<String>,
}

#[derive(Args)]
pub struct InspectArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
