//! Data ingestion for fitmerge.
//!
//! # Features
//!
//! - **Header sniffing**: locate a header row behind a metadata preamble
//! - **CSV reading**: untyped [`RawTable`] reads with a malformed-record retry,
//!   then typed conversion with [`raw_to_frame`]
//! - **Classification**: [`classify_file`] maps an export to its [`SourceKind`]
//! - **Filesystem**: the [`FileSystem`] trait with a dry-run capable
//!   [`LocalFileSystem`]
//! - **Parallel reads**: [`read_all`] over a bounded worker pool
//!
//! # Example
//!
//! ```ignore
//! use fitmerge_ingest::{classify_file, LocalFileSystem, FileSystem, ReadOptions};
//!
//! let fs = LocalFileSystem::new();
//! for path in fs.glob(inbox, "*.csv")? {
//!     if let Some(kind) = classify_file(&path, 60) {
//!         let df = fs.read_frame(&path, ReadOptions::default())?;
//!         println!("{kind}: {} rows", df.height());
//!     }
//! }
//! ```
//!
//! [`SourceKind`]: fitmerge_model::SourceKind

pub mod convert;
pub mod csv;
pub mod detect;
pub mod error;
pub mod fs;
pub mod parallel;

// === Errors ===
pub use error::{IngestError, Result};

// === CSV ===
pub use crate::csv::{
    RawTable, ReadOptions, find_header_row, locate_header_row, parse_raw_table, read_head_lines,
    read_raw_table, write_frame_csv,
};
pub use convert::{infer_column, is_na_cell, raw_to_frame};

// === Classification ===
pub use detect::{classify_file, classify_header, file_matches_kind, matches_kind};

// === Filesystem ===
pub use fs::{FileSystem, LocalFileSystem};
pub use parallel::{ParallelReads, read_all};
