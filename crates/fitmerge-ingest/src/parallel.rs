//! Bounded parallel file reads.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};

use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, warn};

/// Outcome of reading many files, keyed by path.
#[derive(Debug)]
pub struct ParallelReads<T> {
    pub tables: BTreeMap<PathBuf, T>,
    /// Files that could not be read, with the error text.
    pub failures: BTreeMap<PathBuf, String>,
}

impl<T> Default for ParallelReads<T> {
    fn default() -> Self {
        Self {
            tables: BTreeMap::new(),
            failures: BTreeMap::new(),
        }
    }
}

/// Reads every path with `read`, using at most `max_workers` threads.
///
/// A single file is read on the calling thread. Failures are logged and
/// collected; they never abort the other reads. Results are ordered by path
/// regardless of completion order.
pub fn read_all<T, E, F>(paths: &[PathBuf], max_workers: usize, read: F) -> ParallelReads<T>
where
    T: Send,
    E: Display,
    F: Fn(&Path) -> Result<T, E> + Sync,
{
    let read_one = |path: &PathBuf| -> (PathBuf, Result<T, String>) {
        (path.clone(), read(path).map_err(|e| e.to_string()))
    };

    let results: Vec<(PathBuf, Result<T, String>)> = if paths.len() <= 1 {
        paths.iter().map(read_one).collect()
    } else {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(max_workers.max(1))
            .build()
        {
            Ok(pool) => pool.install(|| paths.par_iter().map(read_one).collect()),
            Err(error) => {
                warn!(%error, "failed to build reader pool, reading sequentially");
                paths.iter().map(read_one).collect()
            }
        }
    };

    let mut reads = ParallelReads::default();
    for (path, result) in results {
        match result {
            Ok(table) => {
                debug!(path = %path.display(), "read");
                reads.tables.insert(path, table);
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "failed to read file");
                reads.failures.insert(path, error);
            }
        }
    }
    reads
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_are_excluded_and_ordered() {
        let paths: Vec<PathBuf> = ["c.csv", "a.csv", "bad.csv", "b.csv"]
            .iter()
            .map(PathBuf::from)
            .collect();
        let reads = read_all(&paths, 4, |path| {
            if path.to_string_lossy().contains("bad") {
                Err("unreadable")
            } else {
                Ok(path.to_string_lossy().len())
            }
        });
        let keys: Vec<&PathBuf> = reads.tables.keys().collect();
        assert_eq!(
            keys,
            vec![
                &PathBuf::from("a.csv"),
                &PathBuf::from("b.csv"),
                &PathBuf::from("c.csv")
            ]
        );
        assert_eq!(reads.failures.len(), 1);
        assert_eq!(reads.failures[&PathBuf::from("bad.csv")], "unreadable");
    }

    #[test]
    fn test_single_path_reads_inline() {
        let paths = vec![PathBuf::from("only.csv")];
        let reads = read_all(&paths, 0, |_| Ok::<_, String>(1));
        assert_eq!(reads.tables.len(), 1);
    }
}
