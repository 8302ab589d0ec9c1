pub mod error;
pub mod layout;
pub mod merge;
pub mod notify;
pub mod pipeline;
pub mod sources;

pub use error::{CoreError, Result};
pub use layout::{
    BASE_FILE_NAME, OUTPUT_PATTERN, TRAINING_ARCHIVE_DIR, WorkspaceLayout, output_filename,
};
pub use merge::{MergeEngine, MergeOptions, MergeOutcome, NamedTable, trim_tail};
pub use notify::LogNotifier;
pub use pipeline::{
    CleanupReport, ImportReport, Inspection, MergeRequest, MergeSummary, Pipeline, RunReport,
};
pub use sources::{ProcessReport, SourceContext};
