//! Column expectations a table is validated against.

use polars::prelude::DataFrame;

use fitmerge_model::{ColumnSpec, ColumnType, SourceSpec};

/// Candidate time columns, tried in order when a schema names none.
pub const TIME_COLUMN_CANDIDATES: &[&str] =
    &["secs", "Timestamp (seconds passed)", "time", "second"];

/// One expected column, possibly known under several names.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRule {
    /// Accepted names, preferred first.
    pub names: Vec<String>,
    pub kind: ColumnType,
}

impl ColumnRule {
    pub fn new(name: impl Into<String>, kind: ColumnType) -> Self {
        Self {
            names: vec![name.into()],
            kind,
        }
    }

    pub fn preferred(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or_default()
    }

    /// First accepted name present in `df`.
    pub fn resolve<'a>(&'a self, df: &DataFrame) -> Option<&'a str> {
        self.names
            .iter()
            .map(String::as_str)
            .find(|name| df.column(name).is_ok())
    }

    fn raw(column: &ColumnSpec) -> Self {
        Self {
            names: column.source_names().map(str::to_string).collect(),
            kind: column.kind,
        }
    }

    fn output(column: &ColumnSpec) -> Self {
        Self::new(column.output, column.kind)
    }
}

/// What a table must look like.
///
/// The default schema expects nothing: only emptiness, timestamps (when a
/// candidate time column exists) and gaps are checked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSchema {
    pub required: Vec<ColumnRule>,
    /// Columns that are type-checked when present.
    pub optional: Vec<ColumnRule>,
    /// Whether absent optional columns are reported.
    pub report_missing_optional: bool,
    /// Time column; detected from [`TIME_COLUMN_CANDIDATES`] when `None`.
    pub time_column: Option<String>,
    /// Expected sampling rate, checked only when a time column is found.
    pub expected_hz: Option<f64>,
}

impl TableSchema {
    /// Schema of a raw device export.
    pub fn raw(spec: &SourceSpec) -> Self {
        Self {
            required: spec.required.iter().map(ColumnRule::raw).collect(),
            optional: spec.optional.iter().map(ColumnRule::raw).collect(),
            report_missing_optional: true,
            time_column: spec.time_column.map(str::to_string),
            expected_hz: spec.time_column.map(|_| spec.input_hz),
        }
    }

    /// Schema of a processed clean table.
    ///
    /// Columns are checked under their output names. Optional columns are
    /// typed but their absence is not reported. The rate is only checked
    /// for the base source, the one clean table with a time column.
    pub fn clean(spec: &SourceSpec) -> Self {
        let time_column = spec
            .is_base
            .then(|| spec.time_column.map(str::to_string))
            .flatten();
        Self {
            required: spec.required.iter().map(ColumnRule::output).collect(),
            optional: spec.optional.iter().map(ColumnRule::output).collect(),
            report_missing_optional: false,
            expected_hz: time_column.as_ref().map(|_| spec.output_hz),
            time_column,
        }
    }

    /// The time column present in `df`, explicit name first.
    pub fn resolve_time_column(&self, df: &DataFrame) -> Option<String> {
        if let Some(name) = &self.time_column
            && df.column(name).is_ok()
        {
            return Some(name.clone());
        }
        TIME_COLUMN_CANDIDATES
            .iter()
            .find(|name| df.column(name).is_ok())
            .map(|name| (*name).to_string())
    }
}
