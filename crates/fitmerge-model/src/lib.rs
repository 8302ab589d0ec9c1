//! Shared vocabulary for the fitmerge crates.
//!
//! # Features
//!
//! - **Source registry**: closed [`SourceKind`] enumeration with one static
//!   [`SourceSpec`] per device export
//! - **Settings**: serde-backed [`Settings`] with the run defaults
//! - **Notification sink**: the [`Notifier`] trait used for user-facing events
//!   and confirmations
//!
//! # Example
//!
//! ```ignore
//! use fitmerge_model::SourceKind;
//!
//! for kind in SourceKind::ALL {
//!     println!("{} (priority {})", kind, kind.spec().priority);
//! }
//! ```

mod notify;
mod settings;
mod source;

// === Source registry ===
pub use source::{ColumnSpec, ColumnType, DetectionStrategy, SourceKind, SourceSpec};

// === Settings ===
pub use settings::{
    DEFAULT_FREQUENCY_TOLERANCE, DEFAULT_GAP_THRESHOLD, DEFAULT_LEADING_TRIM_LIMIT,
    DEFAULT_MAX_INTERPOLATION_GAP, DEFAULT_MAX_WORKERS, HEADER_SCAN_MAX_LINES,
    InterpolationMethod, InterpolationSettings, Settings,
};

// === Notifications ===
pub use notify::{Notice, NoticeLevel, Notifier, RecordingNotifier};
