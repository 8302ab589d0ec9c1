//! Source classification.
//!
//! [`classify_header`] is pure so detection rules can be tested without files;
//! [`classify_file`] reads the scan window and delegates to it.

use std::path::Path;

use fitmerge_model::{DetectionStrategy, SourceKind};

use crate::csv::{header_index, read_head_lines};

/// Whether a file with this name and head belongs to `kind`.
pub fn matches_kind(kind: SourceKind, file_name: &str, head: &[String]) -> bool {
    match kind.spec().detection {
        DetectionStrategy::HeaderKeywords { keywords } => header_index(head, keywords).is_some(),
        DetectionStrategy::FileName {
            suffix,
            discriminator,
            discriminator_present,
            any_of,
        } => {
            if !file_name.to_lowercase().ends_with(&suffix.to_lowercase()) {
                return false;
            }
            let Some(first) = head.first() else {
                return false;
            };
            let first = first.to_lowercase();
            if first.contains(&discriminator.to_lowercase()) != discriminator_present {
                return false;
            }
            any_of.is_empty()
                || any_of
                    .iter()
                    .any(|keyword| first.contains(&keyword.to_lowercase()))
        }
    }
}

/// First kind in priority order that claims the file.
pub fn classify_header(file_name: &str, head: &[String]) -> Option<SourceKind> {
    SourceKind::ALL
        .into_iter()
        .find(|&kind| matches_kind(kind, file_name, head))
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Classifies a file on disk. Unreadable or non-CSV files are unclassified.
pub fn classify_file(path: &Path, max_lines: usize) -> Option<SourceKind> {
    if !is_csv(path) {
        return None;
    }
    let head = read_head_lines(path, max_lines).ok()?;
    classify_header(&file_name(path), &head)
}

/// Whether a file on disk belongs to `kind`.
pub fn file_matches_kind(kind: SourceKind, path: &Path, max_lines: usize) -> bool {
    if !is_csv(path) {
        return false;
    }
    read_head_lines(path, max_lines)
        .map(|head| matches_kind(kind, &file_name(path), &head))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|line| (*line).to_string()).collect()
    }

    #[test]
    fn test_bike_computer_streams() {
        let lines = head(&["secs,watts,cadence,heartrate", "0,100,80,120"]);
        assert_eq!(
            classify_header("i123_streams.csv", &lines),
            Some(SourceKind::Wahoo)
        );
    }

    #[test]
    fn test_watch_streams_need_hrv() {
        let lines = head(&["secs,skin_temperature,hrv", "0,33.1,45"]);
        assert_eq!(
            classify_header("i456_streams.csv", &lines),
            Some(SourceKind::Garmin)
        );
    }

    #[test]
    fn test_biosensor_by_header() {
        let lines = head(&[
            "Timestamp (seconds passed),SmO2,THb unfiltered,Device",
            "0,1,65,12.1",
        ]);
        assert_eq!(
            classify_header("session.csv", &lines),
            Some(SourceKind::TrainRed)
        );
    }

    #[test]
    fn test_breathing_sensor_behind_preamble() {
        let lines = head(&["Athlete,Jan", "", "time,BR,VT,VE", "0,20,1.3,26"]);
        assert_eq!(
            classify_header("tyme_export.csv", &lines),
            Some(SourceKind::Tymewear)
        );
    }

    #[test]
    fn test_unknown_file() {
        let lines = head(&["date,weight", "2024-01-01,70"]);
        assert_eq!(classify_header("weight.csv", &lines), None);
        assert_eq!(classify_header("empty_streams.csv", &[]), None);
    }
}
