//! Header sniffing.
//!
//! Some exports put a metadata preamble above the real header row, so the
//! header is located by keyword rather than assumed to be line 0.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::error::{IngestError, Result};

/// Reads up to `max_lines` lines, decoding invalid UTF-8 lossily.
///
/// A UTF-8 BOM is stripped; UTF-16 input is rejected.
pub fn read_head_lines(path: &Path, max_lines: usize) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| IngestError::read(path, e))?;
    let mut reader = BufReader::new(file);
    let mut lines = Vec::with_capacity(max_lines.min(64));
    let mut buffer = Vec::new();

    while lines.len() < max_lines {
        buffer.clear();
        let read = reader
            .read_until(b'\n', &mut buffer)
            .map_err(|e| IngestError::read(path, e))?;
        if read == 0 {
            break;
        }
        if lines.is_empty() {
            reject_utf16(path, &buffer)?;
        }
        let text = String::from_utf8_lossy(&buffer);
        let line = text.trim_end_matches(['\n', '\r']);
        let line = line.strip_prefix('\u{feff}').unwrap_or(line);
        lines.push(line.to_string());
    }
    Ok(lines)
}

fn reject_utf16(path: &Path, bytes: &[u8]) -> Result<()> {
    let encoding = match bytes {
        [0xFF, 0xFE, ..] => "UTF-16 LE",
        [0xFE, 0xFF, ..] => "UTF-16 BE",
        _ => return Ok(()),
    };
    Err(IngestError::UnsupportedEncoding {
        path: path.to_path_buf(),
        encoding,
    })
}

/// True when `line` contains every keyword, ignoring case.
pub fn line_has_keywords(line: &str, keywords: &[&str]) -> bool {
    let lowered = line.to_lowercase();
    keywords
        .iter()
        .all(|keyword| lowered.contains(&keyword.to_lowercase()))
}

/// Index of the first line among `lines` that contains every keyword.
pub fn header_index(lines: &[String], keywords: &[&str]) -> Option<usize> {
    lines
        .iter()
        .position(|line| line_has_keywords(line, keywords))
}

/// Finds the header row, propagating I/O and decode errors.
pub fn find_header_row(path: &Path, keywords: &[&str], max_lines: usize) -> Result<Option<usize>> {
    let lines = read_head_lines(path, max_lines)?;
    Ok(header_index(&lines, keywords))
}

/// Finds the header row; any error is treated as "not found".
pub fn locate_header_row(path: &Path, keywords: &[&str], max_lines: usize) -> Option<usize> {
    match find_header_row(path, keywords, max_lines) {
        Ok(found) => found,
        Err(error) => {
            debug!(path = %path.display(), %error, "header scan failed");
            None
        }
    }
}
