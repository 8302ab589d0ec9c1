//! Numeric type checks.
//!
//! A numeric column read as text is scanned cell by cell. Cells that are
//! present but do not parse as numbers are counted against the full column
//! length; see [`Issue::severity`](crate::Issue::severity) for how that share
//! decides between warning and error.

use polars::prelude::{AnyValue, Column, DataFrame};

use fitmerge_common::{any_to_string, is_missing, is_numeric_dtype, parse_f64_lenient};
use fitmerge_ingest::is_na_cell;

use crate::issue::Issue;
use crate::schema::TableSchema;

/// Number of offending values kept as samples.
const SAMPLE_LIMIT: usize = 5;

/// Check that numeric columns hold numbers.
pub fn check(df: &DataFrame, schema: &TableSchema) -> Vec<Issue> {
    let mut issues = Vec::new();

    for rule in schema.required.iter().chain(&schema.optional) {
        if !rule.kind.is_numeric() {
            continue;
        }
        let Some(name) = rule.resolve(df) else {
            continue;
        };
        let Ok(column) = df.column(name) else {
            continue;
        };
        if is_numeric_dtype(column.dtype()) {
            continue;
        }

        let (invalid_count, samples) = collect_invalid_numbers(column);
        if invalid_count > 0 {
            issues.push(Issue::NonNumericValues {
                column: name.to_string(),
                invalid_count,
                row_count: column.len() as u64,
                samples,
            });
        }
    }

    issues
}

/// Count present cells that are not numbers, keeping a few samples.
fn collect_invalid_numbers(column: &Column) -> (u64, Vec<String>) {
    let mut invalid_count = 0u64;
    let mut samples = Vec::new();

    for idx in 0..column.len() {
        let value = column.get(idx).unwrap_or(AnyValue::Null);
        if is_missing(&value) {
            continue;
        }
        let text = any_to_string(value);
        if is_na_cell(&text) {
            continue;
        }
        if parse_f64_lenient(&text).is_none() {
            invalid_count += 1;
            if samples.len() < SAMPLE_LIMIT && !samples.contains(&text) {
                samples.push(text);
            }
        }
    }

    (invalid_count, samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Severity;
    use fitmerge_model::SourceKind;

    fn tymewear(br: &[&str]) -> DataFrame {
        let n = br.len();
        DataFrame::new(vec![
            Column::new("BR".into(), br.to_vec()),
            Column::new("VT".into(), vec![1.0; n]),
            Column::new("VE".into(), vec![20.0; n]),
        ])
        .unwrap()
    }

    #[test]
    fn test_mostly_text_is_an_error() {
        let df = tymewear(&["abc", "def", "12", "ghi"]);
        let issues = check(&df, &TableSchema::raw(SourceKind::Tymewear.spec()));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].count(), Some(3));
        assert_eq!(issues[0].severity(false), Severity::Error);
    }

    #[test]
    fn test_few_bad_cells_are_a_warning() {
        let df = tymewear(&["30", "31,5", "", "NA", "oops", "32"]);
        let issues = check(&df, &TableSchema::raw(SourceKind::Tymewear.spec()));
        assert_eq!(issues.len(), 1);
        let Issue::NonNumericValues {
            invalid_count,
            row_count,
            samples,
            ..
        } = &issues[0]
        else {
            panic!("unexpected issue {:?}", issues[0]);
        };
        assert_eq!((*invalid_count, *row_count), (1, 6));
        assert_eq!(samples, &vec!["oops".to_string()]);
        assert_eq!(issues[0].severity(false), Severity::Warning);
    }

    #[test]
    fn test_sparse_column_share_counts_blank_rows() {
        // 4 text cells in 20 rows; most of the present cells are text
        let mut br = vec![""; 13];
        br.extend(["30", "31", "32", "x", "y", "z", "w"]);
        let df = tymewear(&br);
        let issues = check(&df, &TableSchema::raw(SourceKind::Tymewear.spec()));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].count(), Some(4));
        assert_eq!(issues[0].severity(false), Severity::Warning);

        let mut br = vec![""; 8];
        br.extend(["x"; 11]);
        br.push("30");
        let issues = check(&tymewear(&br), &TableSchema::raw(SourceKind::Tymewear.spec()));
        assert_eq!(issues[0].severity(false), Severity::Error);
    }

    #[test]
    fn test_numeric_dtype_is_not_scanned() {
        let df = DataFrame::new(vec![
            Column::new("BR".into(), [30.0, 31.0]),
            Column::new("VT".into(), [1.0, 1.1]),
            Column::new("VE".into(), [20.0, 21.0]),
        ])
        .unwrap();
        assert!(check(&df, &TableSchema::raw(SourceKind::Tymewear.spec())).is_empty());
    }
}
