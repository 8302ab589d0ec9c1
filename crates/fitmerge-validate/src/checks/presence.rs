//! Required and optional column presence.

use polars::prelude::DataFrame;

use fitmerge_common::column_names;

use crate::issue::Issue;
use crate::schema::TableSchema;

/// Number of present columns listed alongside a missing-column error.
const AVAILABLE_LIMIT: usize = 10;

/// Check that every required column is present.
///
/// A required column is satisfied by any of its accepted names. Missing
/// optional columns are reported only when the schema asks for it.
pub fn check(df: &DataFrame, schema: &TableSchema) -> Vec<Issue> {
    let mut issues = Vec::new();
    let present = column_names(df);

    let missing: Vec<String> = schema
        .required
        .iter()
        .filter(|rule| rule.resolve(df).is_none())
        .map(|rule| rule.preferred().to_string())
        .collect();
    if !missing.is_empty() {
        let suggestions = missing
            .iter()
            .filter_map(|name| {
                present
                    .iter()
                    .find(|candidate| candidate.trim().eq_ignore_ascii_case(name))
                    .cloned()
            })
            .collect();
        issues.push(Issue::MissingColumns {
            columns: missing,
            available: present.iter().take(AVAILABLE_LIMIT).cloned().collect(),
            suggestions,
        });
    }

    if schema.report_missing_optional {
        let missing: Vec<String> = schema
            .optional
            .iter()
            .filter(|rule| rule.resolve(df).is_none())
            .map(|rule| rule.preferred().to_string())
            .collect();
        if !missing.is_empty() {
            issues.push(Issue::MissingOptionalColumns { columns: missing });
        }
    }

    issues
}
