//! Validation reports.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::issue::{Issue, Severity};

/// Outcome of validating one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
    /// Validation stopped at the first error.
    pub stopped_early: bool,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table is valid when it has no errors.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn push(&mut self, issue: Issue, severity: Severity) {
        match severity {
            Severity::Error => self.errors.push(issue),
            Severity::Warning => self.warnings.push(issue),
        }
    }

    /// Moves every warning to the errors.
    pub fn promote_warnings(&mut self) {
        self.errors.append(&mut self.warnings);
    }

    /// All issues with their severity, errors first.
    pub fn issues(&self) -> impl Iterator<Item = (Severity, &Issue)> {
        self.errors
            .iter()
            .map(|issue| (Severity::Error, issue))
            .chain(self.warnings.iter().map(|issue| (Severity::Warning, issue)))
    }

    pub fn summary(&self) -> String {
        if self.is_valid() && !self.has_warnings() {
            "passed".to_string()
        } else {
            format!(
                "{} error(s), {} warning(s)",
                self.errors.len(),
                self.warnings.len()
            )
        }
    }
}

/// Reports for a batch of files, ordered by path.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub reports: BTreeMap<PathBuf, ValidationReport>,
}

impl BatchReport {
    /// True when every file validated without errors.
    pub fn is_valid(&self) -> bool {
        self.reports.values().all(ValidationReport::is_valid)
    }

    pub fn error_count(&self) -> usize {
        self.reports.values().map(|report| report.errors.len()).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.reports.values().map(|report| report.warnings.len()).sum()
    }

    /// Paths of files with at least one error.
    pub fn failed_files(&self) -> Vec<&PathBuf> {
        self.reports
            .iter()
            .filter(|(_, report)| !report.is_valid())
            .map(|(path, _)| path)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity_follows_errors() {
        let mut report = ValidationReport::new();
        report.push(
            Issue::MissingOptionalColumns {
                columns: vec!["Device".to_string()],
            },
            Severity::Warning,
        );
        assert!(report.is_valid());
        assert_eq!(report.summary(), "0 error(s), 1 warning(s)");

        report.promote_warnings();
        assert!(!report.is_valid());
        assert!(!report.has_warnings());
        assert_eq!(report.issues().count(), 1);
    }

    #[test]
    fn test_batch_counts() {
        let mut batch = BatchReport::default();
        batch
            .reports
            .insert(PathBuf::from("a.csv"), ValidationReport::new());
        let mut failing = ValidationReport::new();
        failing.push(Issue::EmptyTable, Severity::Error);
        batch.reports.insert(PathBuf::from("b.csv"), failing);

        assert!(!batch.is_valid());
        assert_eq!(batch.error_count(), 1);
        assert_eq!(batch.failed_files(), vec![&PathBuf::from("b.csv")]);

        let json = serde_json::to_string(&batch).unwrap();
        assert!(json.contains(r#""b.csv":{"errors":["EmptyTable"]"#), "{json}");
    }
}
