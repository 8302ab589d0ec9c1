//! Integrity validation for fitmerge tables.
//!
//! # Features
//!
//! - **Layered checks**: emptiness, column presence, numeric types,
//!   timestamps, sampling rate and missing-value gaps
//! - **Typed findings**: every [`Issue`] has a kind, a column and a message;
//!   its [`Severity`] follows from the variant and the run mode
//! - **Modes**: fail-fast stops at the first error, strict promotes warnings
//! - **Batches**: [`IntegrityValidator::validate_files`] reads and validates
//!   files on a bounded pool
//!
//! # Example
//!
//! ```ignore
//! use fitmerge_model::SourceKind;
//! use fitmerge_validate::{IntegrityValidator, TableSchema};
//!
//! let validator = IntegrityValidator::default();
//! let report = validator.validate_table(&df, &TableSchema::raw(SourceKind::TrainRed.spec()));
//! for (severity, issue) in report.issues() {
//!     println!("{}: {issue}", severity.label());
//! }
//! ```

pub mod checks;
mod issue;
mod report;
mod schema;
mod validator;

// === Findings ===
pub use issue::{INVALID_RATIO_LIMIT, Issue, IssueKind, Severity};
pub use report::{BatchReport, ValidationReport};

// === Validation ===
pub use checks::TimestampChecks;
pub use schema::{ColumnRule, TIME_COLUMN_CANDIDATES, TableSchema};
pub use validator::{FileCheck, IntegrityValidator, ValidatorOptions};
