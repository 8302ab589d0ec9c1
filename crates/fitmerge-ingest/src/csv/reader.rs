//! CSV reading into an untyped [`RawTable`].

use std::collections::BTreeMap;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::{debug, warn};

use crate::error::{IngestError, Result};

/// Untyped table as read from a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Records dropped by the malformed-record retry.
    pub skipped_records: usize,
}

impl RawTable {
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, idx: usize) -> Vec<&str> {
        self.rows
            .iter()
            .map(|row| row.get(idx).map_or("", String::as_str))
            .collect()
    }
}

/// How a CSV file is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Zero-based line holding the header; lines above it are skipped.
    pub header_row: usize,
}

impl ReadOptions {
    #[must_use]
    pub fn with_header_row(header_row: usize) -> Self {
        Self { header_row }
    }
}

/// Reads a CSV file.
///
/// The first pass rejects records with more fields than the header. On
/// failure the file is parsed once more, skipping those records; if that
/// fails too a [`IngestError::CsvParse`] is returned.
pub fn read_raw_table(path: &Path, options: ReadOptions) -> Result<RawTable> {
    let bytes = std::fs::read(path).map_err(|e| IngestError::read(path, e))?;
    if bytes.starts_with(&[0xFF, 0xFE]) || bytes.starts_with(&[0xFE, 0xFF]) {
        return Err(IngestError::UnsupportedEncoding {
            path: path.to_path_buf(),
            encoding: "UTF-16",
        });
    }
    let text = String::from_utf8_lossy(&bytes);
    parse_raw_table(path, &text, options)
}

/// Parses CSV text; `path` is only used for error reporting.
pub fn parse_raw_table(path: &Path, text: &str, options: ReadOptions) -> Result<RawTable> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let body = skip_lines(text, options.header_row);

    match parse_records(body, false) {
        Ok(table) => Ok(table),
        Err(ParseFailure::Empty) => Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        }),
        Err(ParseFailure::Malformed(first_error)) => {
            warn!(
                path = %path.display(),
                error = %first_error,
                "CSV parse failed, retrying with malformed records skipped"
            );
            match parse_records(body, true) {
                Ok(table) => {
                    debug!(
                        path = %path.display(),
                        skipped = table.skipped_records,
                        "CSV parsed after skipping malformed records"
                    );
                    Ok(table)
                }
                Err(ParseFailure::Empty) => Err(IngestError::EmptyCsv {
                    path: path.to_path_buf(),
                }),
                Err(ParseFailure::Malformed(message)) => Err(IngestError::CsvParse {
                    path: path.to_path_buf(),
                    message,
                }),
            }
        }
    }
}

enum ParseFailure {
    Empty,
    Malformed(String),
}

fn parse_records(body: &str, skip_malformed: bool) -> std::result::Result<RawTable, ParseFailure> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());
    let mut records = reader.records();

    let headers = match records.next() {
        None => return Err(ParseFailure::Empty),
        Some(Err(error)) => return Err(ParseFailure::Malformed(error.to_string())),
        Some(Ok(record)) => record.iter().map(normalize_cell).collect::<Vec<_>>(),
    };
    if headers.iter().all(String::is_empty) {
        return Err(ParseFailure::Empty);
    }
    let headers = unique_headers(headers);
    let width = headers.len();

    let mut rows = Vec::new();
    let mut skipped_records = 0usize;
    for (offset, result) in records.enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(error) if skip_malformed => {
                debug!(%error, "skipping unreadable record");
                skipped_records += 1;
                continue;
            }
            Err(error) => return Err(ParseFailure::Malformed(error.to_string())),
        };
        let mut row: Vec<String> = record.iter().map(normalize_cell).collect();
        if row.len() > width {
            if row[width..].iter().all(String::is_empty) {
                row.truncate(width);
            } else if skip_malformed {
                skipped_records += 1;
                continue;
            } else {
                return Err(ParseFailure::Malformed(format!(
                    "record {} has {} fields, expected {width}",
                    offset + 2,
                    row.len()
                )));
            }
        }
        row.resize(width, String::new());
        rows.push(row);
    }

    Ok(RawTable {
        headers,
        rows,
        skipped_records,
    })
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Names blank headers by position and suffixes repeated names.
fn unique_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    headers
        .into_iter()
        .enumerate()
        .map(|(idx, header)| {
            let base = if header.is_empty() {
                format!("column_{idx}")
            } else {
                header
            };
            let count = seen.entry(base.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                base
            } else {
                format!("{base}_{count}")
            }
        })
        .collect()
}

fn skip_lines(text: &str, count: usize) -> &str {
    let mut rest = text;
    for _ in 0..count {
        match rest.find('\n') {
            Some(pos) => rest = &rest[pos + 1..],
            None => return "",
        }
    }
    rest
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_reads_simple_table() {
        let file = create_temp_csv("secs,watts\n0,100\n1,110\n");
        let table = read_raw_table(file.path(), ReadOptions::default()).unwrap();
        assert_eq!(table.headers, vec!["secs", "watts"]);
        assert_eq!(table.height(), 2);
        assert_eq!(table.column(1), vec!["100", "110"]);
    }

    #[test]
    fn test_header_row_skips_preamble() {
        let file = create_temp_csv("Name: test\nDate: today\nBR,VT,VE\n20,1.1,22\n");
        let table = read_raw_table(file.path(), ReadOptions::with_header_row(2)).unwrap();
        assert_eq!(table.headers, vec!["BR", "VT", "VE"]);
        assert_eq!(table.rows, vec![vec!["20", "1.1", "22"]]);
    }

    #[test]
    fn test_short_records_are_padded() {
        let file = create_temp_csv("a,b,c\n1,2\n");
        let table = read_raw_table(file.path(), ReadOptions::default()).unwrap();
        assert_eq!(table.rows[0], vec!["1", "2", ""]);
    }

    #[test]
    fn test_long_records_are_skipped_on_retry() {
        let file = create_temp_csv("a,b\n1,2\n3,4,5\n6,7\n");
        let table = read_raw_table(file.path(), ReadOptions::default()).unwrap();
        assert_eq!(table.height(), 2);
        assert_eq!(table.skipped_records, 1);
    }

    #[test]
    fn test_empty_file() {
        let file = create_temp_csv("");
        assert!(matches!(
            read_raw_table(file.path(), ReadOptions::default()),
            Err(IngestError::EmptyCsv { .. })
        ));
    }

    #[test]
    fn test_duplicate_and_blank_headers() {
        let file = create_temp_csv("x,,x\n1,2,3\n");
        let table = read_raw_table(file.path(), ReadOptions::default()).unwrap();
        assert_eq!(table.headers, vec!["x", "column_1", "x_2"]);
    }

    #[test]
    fn test_missing_file() {
        let result = read_raw_table(Path::new("/no/such/file.csv"), ReadOptions::default());
        assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
    }
}
