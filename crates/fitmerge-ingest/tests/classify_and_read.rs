//! Classification and typed reads over real files.

use std::path::PathBuf;

use fitmerge_ingest::{
    FileSystem, LocalFileSystem, ReadOptions, classify_file, file_matches_kind, locate_header_row,
    read_all,
};
use fitmerge_model::SourceKind;
use polars::prelude::DataType;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn classifies_an_inbox() {
    let dir = TempDir::new().unwrap();
    let bike = write(&dir, "i1_streams.csv", "secs,watts\n0,100\n1,110\n");
    let watch = write(&dir, "i2_streams.csv", "secs,hrv,core_temperature\n0,40,37.1\n");
    let biosensor = write(
        &dir,
        "moxy.csv",
        "Timestamp (seconds passed),SmO2,THb unfiltered\n0,65,12\n",
    );
    let other = write(&dir, "notes.csv", "a,b\n1,2\n");
    let text = write(&dir, "readme.txt", "secs,watts\n");

    assert_eq!(classify_file(&bike, 60), Some(SourceKind::Wahoo));
    assert_eq!(classify_file(&watch, 60), Some(SourceKind::Garmin));
    assert_eq!(classify_file(&biosensor, 60), Some(SourceKind::TrainRed));
    assert_eq!(classify_file(&other, 60), None);
    assert_eq!(classify_file(&text, 60), None);
    assert!(!file_matches_kind(SourceKind::Wahoo, &watch, 60));
}

#[test]
fn reads_a_table_behind_a_preamble() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "tyme.csv",
        "Athlete,Jan\nDate,2024-05-01\nTime,BR,VT,VE\n0,20,\"1,2\",24\n1,21,1.3,25\n",
    );
    let header = locate_header_row(&path, &["BR", "VT", "VE"], 60).unwrap();
    assert_eq!(header, 2);

    let fs = LocalFileSystem::new();
    let df = fs
        .read_frame(&path, ReadOptions::with_header_row(header))
        .unwrap();
    assert_eq!(df.height(), 2);
    assert_eq!(df.column("BR").unwrap().dtype(), &DataType::Int64);
    assert_eq!(df.column("VT").unwrap().dtype(), &DataType::Float64);
}

#[test]
fn parallel_reads_skip_broken_files() {
    let dir = TempDir::new().unwrap();
    let good_a = write(&dir, "a.csv", "secs\n0\n1\n");
    let good_b = write(&dir, "b.csv", "secs\n0\n");
    let empty = write(&dir, "c.csv", "");
    let fs = LocalFileSystem::new();

    let reads = read_all(&[empty.clone(), good_b.clone(), good_a.clone()], 4, |path| {
        fs.read_frame(path, ReadOptions::default())
    });

    assert_eq!(reads.tables.keys().cloned().collect::<Vec<_>>(), vec![good_a, good_b]);
    assert!(reads.failures.contains_key(&empty));
}
