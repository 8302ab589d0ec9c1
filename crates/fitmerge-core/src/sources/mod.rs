//! Per-source normalizers.
//!
//! Each source kind turns its raw exports into clean tables under output
//! column names. Dispatch is a closed match over [`SourceKind`].

pub mod common;
pub mod garmin;
pub mod trainred;
pub mod tymewear;
pub mod wahoo;

use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;
use tracing::info_span;

use fitmerge_model::SourceKind;

pub use common::{ProcessReport, SourceContext, archive_all, display_name};

use crate::error::Result;
use crate::layout::WorkspaceLayout;

/// Runs the normalizer for `kind` over its source directory.
pub fn process(kind: SourceKind, ctx: &SourceContext<'_>) -> Result<ProcessReport> {
    let _span = info_span!("process_source", source = %kind).entered();
    match kind {
        SourceKind::Wahoo => wahoo::process(ctx),
        SourceKind::TrainRed => trainred::process(ctx),
        SourceKind::Tymewear => tymewear::process(ctx),
        SourceKind::Garmin => garmin::process(ctx),
    }
}

/// Clean tables of `kind` ready to merge, sorted by path.
pub fn clean_files(kind: SourceKind, ctx: &SourceContext<'_>) -> Result<Vec<PathBuf>> {
    match kind {
        SourceKind::Wahoo => Ok(wahoo::clean_files(ctx)),
        SourceKind::TrainRed | SourceKind::Tymewear | SourceKind::Garmin => {
            common::clean_files(ctx, kind)
        }
    }
}

/// Where an inbox file of `kind` is imported to.
pub fn import_destination(kind: SourceKind, layout: &WorkspaceLayout, source: &Path) -> PathBuf {
    match kind {
        SourceKind::Wahoo => layout.base_file(),
        SourceKind::TrainRed | SourceKind::Tymewear | SourceKind::Garmin => layout
            .source_dir(kind)
            .join(source.file_name().unwrap_or_default()),
    }
}

/// Reads a raw export of `kind` the way its normalizer does.
pub fn read_raw(kind: SourceKind, ctx: &SourceContext<'_>, path: &Path) -> Result<DataFrame> {
    match kind {
        SourceKind::Wahoo => common::read_source(ctx, path, 0),
        SourceKind::TrainRed => trainred::read_raw(ctx, path),
        SourceKind::Tymewear => tymewear::read_raw(ctx, path),
        SourceKind::Garmin => garmin::read_raw(ctx, path),
    }
}
