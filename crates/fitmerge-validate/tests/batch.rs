//! Batch validation of exports on disk.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use fitmerge_ingest::{FileSystem, LocalFileSystem, ReadOptions};
use fitmerge_model::{NoticeLevel, RecordingNotifier, Settings, SourceKind};
use fitmerge_validate::{FileCheck, Issue, IntegrityValidator, TableSchema};
use tempfile::TempDir;

fn write_trainred(dir: &Path, name: &str, rows: usize) -> std::path::PathBuf {
    let mut content = String::from("Timestamp (seconds passed),SmO2,THb unfiltered,Device\n");
    for i in 0..rows {
        writeln!(content, "{:.1},{},12.1,moxy", i as f64 / 10.0, 60 + i % 5).unwrap();
    }
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn validates_a_batch_in_path_order() {
    let dir = TempDir::new().unwrap();
    let good = write_trainred(dir.path(), "a_trainred.csv", 30);
    let breathing = dir.path().join("b_tyme.csv");
    fs::write(&breathing, "BR,VT,VE\n30,1.2,36\nfast,1.3,39\n31,1.1,34\n").unwrap();
    let missing = dir.path().join("c_missing.csv");

    let files = vec![
        FileCheck::new(&missing, TableSchema::raw(SourceKind::TrainRed.spec())),
        FileCheck::new(&good, TableSchema::raw(SourceKind::TrainRed.spec())),
        FileCheck::new(&breathing, TableSchema::raw(SourceKind::Tymewear.spec())),
    ];

    let fs = LocalFileSystem::new();
    let notifier = RecordingNotifier::new();
    let validator = IntegrityValidator::from_settings(&Settings::default());
    let batch = validator.validate_files(
        &files,
        |path| fs.read_frame(path, ReadOptions::default()),
        true,
        &notifier,
    );

    assert!(!batch.is_valid());
    assert_eq!(batch.failed_files(), vec![&missing]);
    assert!(batch.reports[&good].is_valid());
    assert!(matches!(
        batch.reports[&missing].errors.as_slice(),
        [Issue::FileFormat { .. }]
    ));
    // one bad cell in three is tolerated
    let breathing_report = &batch.reports[&breathing];
    assert!(breathing_report.is_valid());
    assert_eq!(breathing_report.warnings.len(), 1);

    assert_eq!(notifier.texts(NoticeLevel::Success), vec!["a_trainred.csv: passed"]);
    let warnings = notifier.texts(NoticeLevel::Warning);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].starts_with("b_tyme.csv: Column BR"));
    assert_eq!(notifier.texts(NoticeLevel::Error).len(), 1);
}

#[test]
fn sequential_and_parallel_agree() {
    let dir = TempDir::new().unwrap();
    let files: Vec<FileCheck> = (0..4)
        .map(|i| {
            let path = write_trainred(dir.path(), &format!("t{i}.csv"), 10 + i);
            FileCheck::new(path, TableSchema::raw(SourceKind::TrainRed.spec()))
        })
        .collect();
    let fs = LocalFileSystem::new();
    let validator = IntegrityValidator::default();
    let read = |path: &Path| fs.read_frame(path, ReadOptions::default());

    let parallel = validator.validate_files(&files, read, true, &RecordingNotifier::new());
    let sequential = validator.validate_files(&files, read, false, &RecordingNotifier::new());
    assert_eq!(parallel.reports, sequential.reports);
    assert!(parallel.is_valid());
}
