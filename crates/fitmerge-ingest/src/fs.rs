//! Filesystem abstraction.
//!
//! Every directory mutation of a run goes through [`FileSystem`] so a dry run
//! can log the operations instead of executing them.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use glob::MatchOptions;
use polars::prelude::DataFrame;
use tracing::{debug, info};

use crate::convert::raw_to_frame;
use crate::csv::{RawTable, ReadOptions, read_raw_table, write_frame_csv};
use crate::error::{IngestError, Result};

/// File operations used by the pipeline.
pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    /// Files in `dir` matching `pattern` (case-insensitive), sorted.
    /// A missing directory yields an empty list.
    fn glob(&self, dir: &Path, pattern: &str) -> Result<Vec<PathBuf>>;

    /// All regular files in `dir`, sorted.
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        self.glob(dir, "*")
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()>;
    fn move_file(&self, from: &Path, to: &Path) -> Result<()>;
    fn remove(&self, path: &Path) -> Result<()>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn read_table(&self, path: &Path, options: ReadOptions) -> Result<RawTable>;
    fn write_table(&self, df: &DataFrame, path: &Path) -> Result<()>;

    /// Reads a file straight into a typed frame.
    fn read_frame(&self, path: &Path, options: ReadOptions) -> Result<DataFrame> {
        raw_to_frame(&self.read_table(path, options)?)
    }

    /// Whether mutating calls are only simulated.
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// [`FileSystem`] backed by the local disk.
#[derive(Debug, Default)]
pub struct LocalFileSystem {
    dry_run: bool,
    operations: Mutex<Vec<String>>,
}

impl LocalFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filesystem that logs mutating calls instead of executing them.
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            operations: Mutex::new(Vec::new()),
        }
    }

    /// Operations recorded in dry-run mode, in call order.
    pub fn operations(&self) -> Vec<String> {
        self.operations
            .lock()
            .map(|ops| ops.clone())
            .unwrap_or_default()
    }

    /// Records a simulated operation. Returns true when the caller must skip the real one.
    fn simulate(&self, description: String) -> bool {
        if !self.dry_run {
            return false;
        }
        let entry = format!("[DRY-RUN] {description}");
        info!("{entry}");
        if let Ok(mut ops) = self.operations.lock() {
            ops.push(entry);
        }
        true
    }
}

fn fs_error(operation: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> IngestError {
    let path = path.to_path_buf();
    move |source| IngestError::Filesystem {
        operation,
        path,
        source,
    }
}

impl FileSystem for LocalFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn glob(&self, dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let full = format!(
            "{}/{}",
            glob::Pattern::escape(&dir.to_string_lossy()),
            pattern
        );
        let options = MatchOptions {
            case_sensitive: false,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        let entries = glob::glob_with(&full, options).map_err(|e| IngestError::Glob {
            pattern: full.clone(),
            message: e.to_string(),
        })?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(std::result::Result::ok)
            .filter(|path| path.is_file())
            .collect();
        files.sort();
        Ok(files)
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        if self.simulate(format!("COPY {} -> {}", from.display(), to.display())) {
            return Ok(());
        }
        std::fs::copy(from, to).map_err(fs_error("copy", from))?;
        debug!(from = %from.display(), to = %to.display(), "copied");
        Ok(())
    }

    fn move_file(&self, from: &Path, to: &Path) -> Result<()> {
        if self.simulate(format!("MOVE {} -> {}", from.display(), to.display())) {
            return Ok(());
        }
        if std::fs::rename(from, to).is_err() {
            // rename fails across devices
            std::fs::copy(from, to).map_err(fs_error("move", from))?;
            std::fs::remove_file(from).map_err(fs_error("move", from))?;
        }
        debug!(from = %from.display(), to = %to.display(), "moved");
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        if self.simulate(format!("DELETE {}", path.display())) {
            return Ok(());
        }
        std::fs::remove_file(path).map_err(fs_error("delete", path))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        if path.is_dir() {
            return Ok(());
        }
        if self.simulate(format!("MKDIR {}", path.display())) {
            return Ok(());
        }
        std::fs::create_dir_all(path).map_err(fs_error("mkdir", path))
    }

    fn read_table(&self, path: &Path, options: ReadOptions) -> Result<RawTable> {
        read_raw_table(path, options)
    }

    fn write_table(&self, df: &DataFrame, path: &Path) -> Result<()> {
        if self.simulate(format!(
            "WRITE CSV {} ({} rows, {} columns)",
            path.display(),
            df.height(),
            df.width()
        )) {
            return Ok(());
        }
        write_frame_csv(df, path)
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_glob_is_sorted_and_case_insensitive() {
        let dir = TempDir::new().unwrap();
        for name in ["b_streams.CSV", "a_streams.csv", "notes.txt"] {
            std::fs::write(dir.path().join(name), "secs\n0\n").unwrap();
        }
        let fs = LocalFileSystem::new();
        let found = fs.glob(dir.path(), "*streams.csv").unwrap();
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a_streams.csv", "b_streams.CSV"]);
    }

    #[test]
    fn test_glob_missing_dir_is_empty() {
        let fs = LocalFileSystem::new();
        assert!(fs.glob(Path::new("/no/such/dir"), "*.csv").unwrap().is_empty());
    }

    #[test]
    fn test_dry_run_does_not_touch_disk() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("ride.csv");
        std::fs::write(&source, "secs\n0\n").unwrap();
        let target = dir.path().join("old").join("ride.csv");

        let fs = LocalFileSystem::dry_run();
        fs.create_dir_all(&dir.path().join("old")).unwrap();
        fs.move_file(&source, &target).unwrap();
        fs.remove(&source).unwrap();

        assert!(source.exists());
        assert!(!target.exists());
        let ops = fs.operations();
        assert_eq!(ops.len(), 3);
        assert!(ops[0].starts_with("[DRY-RUN] MKDIR"));
        assert!(ops[1].starts_with("[DRY-RUN] MOVE"));
        assert!(ops[2].starts_with("[DRY-RUN] DELETE"));
    }

    #[test]
    fn test_move_file() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.csv");
        let target = dir.path().join("b.csv");
        std::fs::write(&source, "x\n1\n").unwrap();
        let fs = LocalFileSystem::new();
        fs.move_file(&source, &target).unwrap();
        assert!(!source.exists());
        assert!(target.exists());
        assert!(fs.operations().is_empty());
    }
}
