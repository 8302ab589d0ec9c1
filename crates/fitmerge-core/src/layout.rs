//! Working-directory layout.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use fitmerge_model::{Settings, SourceKind};

/// Directory that receives previous merged outputs.
pub const TRAINING_ARCHIVE_DIR: &str = "5_Training_Old";
/// Glob matching merged outputs in the base directory.
pub const OUTPUT_PATTERN: &str = "Training-*.csv";
/// File name of the imported base table.
pub const BASE_FILE_NAME: &str = "Wahoo.csv";

/// Paths derived from the base and inbox directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    base_dir: PathBuf,
    inbox_dir: PathBuf,
}

impl WorkspaceLayout {
    pub fn new(base_dir: impl Into<PathBuf>, inbox_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            inbox_dir: inbox_dir.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.base_dir, &settings.inbox_dir)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn inbox_dir(&self) -> &Path {
        &self.inbox_dir
    }

    /// Working directory of a source, e.g. `1_TrainRed_files`.
    pub fn source_dir(&self, kind: SourceKind) -> PathBuf {
        let prefix = match kind {
            SourceKind::TrainRed => 1,
            SourceKind::Tymewear => 2,
            SourceKind::Wahoo => 3,
            SourceKind::Garmin => 4,
        };
        self.base_dir.join(format!("{prefix}_{}_files", kind.name()))
    }

    /// Archive inside the source directory, e.g. `TrainRed_files_old`.
    pub fn archive_dir(&self, kind: SourceKind) -> PathBuf {
        self.source_dir(kind)
            .join(format!("{}_files_old", kind.name()))
    }

    pub fn training_archive_dir(&self) -> PathBuf {
        self.base_dir.join(TRAINING_ARCHIVE_DIR)
    }

    pub fn base_file(&self) -> PathBuf {
        self.source_dir(SourceKind::Wahoo).join(BASE_FILE_NAME)
    }

    /// Merged output path for `date`.
    pub fn output_path(&self, date: NaiveDate) -> PathBuf {
        self.base_dir.join(output_filename(date))
    }
}

/// `Training-DD.MM.YYYY-import.csv`
pub fn output_filename(date: NaiveDate) -> String {
    format!("Training-{}-import.csv", date.format("%d.%m.%Y"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_directories() {
        let layout = WorkspaceLayout::new("/data", "/inbox");
        assert_eq!(
            layout.source_dir(SourceKind::TrainRed),
            PathBuf::from("/data/1_TrainRed_files")
        );
        assert_eq!(
            layout.archive_dir(SourceKind::Garmin),
            PathBuf::from("/data/4_Garmin_files/Garmin_files_old")
        );
        assert_eq!(
            layout.base_file(),
            PathBuf::from("/data/3_Wahoo_files/Wahoo.csv")
        );
    }

    #[test]
    fn test_output_filename() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(output_filename(date), "Training-07.03.2026-import.csv");
    }
}
