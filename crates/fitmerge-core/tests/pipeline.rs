//! End-to-end runs over a temporary working directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use tempfile::TempDir;

use fitmerge_common::{column_f64, column_names};
use fitmerge_core::{CoreError, MergeRequest, Pipeline};
use fitmerge_ingest::LocalFileSystem;
use fitmerge_model::{NoticeLevel, RecordingNotifier, Settings, SourceKind};

struct Workspace {
    _dir: TempDir,
    base: PathBuf,
    inbox: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("training");
        let inbox = dir.path().join("downloads");
        fs::create_dir_all(&base).unwrap();
        fs::create_dir_all(&inbox).unwrap();
        Self {
            _dir: dir,
            base,
            inbox,
        }
    }

    fn settings(&self) -> Settings {
        Settings::with_dirs(&self.base, &self.inbox)
    }

    fn pipeline(&self, notifier: &Arc<RecordingNotifier>) -> Pipeline {
        Pipeline::new(
            self.settings(),
            Arc::new(LocalFileSystem::new()),
            notifier.clone(),
        )
    }
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn bike_export() -> String {
    let mut csv = String::from("secs,watts,heartrate\n");
    for second in 0..10 {
        csv.push_str(&format!("{second},{},{}\n", 150 + second * 5, 120 + second));
    }
    csv
}

fn oxygen_export() -> String {
    let mut csv = String::from("Timestamp (seconds passed),SmO2,THb unfiltered,Device\n");
    for tick in 0..100 {
        let second = tick / 10;
        csv.push_str(&format!(
            "{:.1},{},12.5,moxy\n",
            f64::from(tick) / 10.0,
            70 - second
        ));
    }
    csv
}

fn breathing_export() -> String {
    let mut csv = String::from("Session,Intervals\nAthlete,Test\n\nBR,VT,VE\n");
    for second in 0..10 {
        csv.push_str(&format!("{},1.5,{}\n", 30 + second, 45 + second));
    }
    csv.push_str(",,\n");
    csv
}

fn watch_export() -> String {
    let mut csv = String::from("secs,hrv,core_temperature\n");
    for second in 0..10 {
        let hrv = if second < 2 {
            String::new()
        } else {
            (40 + second).to_string()
        };
        csv.push_str(&format!("{second},{hrv},37.{second}\n"));
    }
    csv
}

fn fill_inbox(ws: &Workspace) {
    write(&ws.inbox.join("ride_streams.csv"), &bike_export());
    write(&ws.inbox.join("moxy.csv"), &oxygen_export());
    write(&ws.inbox.join("breath.csv"), &breathing_export());
    write(&ws.inbox.join("watch_streams.csv"), &watch_export());
    write(&ws.inbox.join("notes.csv"), "topic,comment\nlegs,heavy\n");
}

#[test]
fn full_session_merges_every_source() {
    let ws = Workspace::new();
    fill_inbox(&ws);
    let notifier = Arc::new(RecordingNotifier::new());
    let pipeline = ws.pipeline(&notifier);

    let import = pipeline.run_import().unwrap();
    let kinds: Vec<SourceKind> = import.imported.iter().map(|(kind, _)| *kind).collect();
    assert_eq!(kinds.len(), 4);
    assert!(kinds.contains(&SourceKind::Garmin));
    assert_eq!(import.unrecognized, vec![ws.inbox.join("notes.csv")]);
    assert!(pipeline.layout().base_file().exists());
    assert!(!ws.inbox.join("ride_streams.csv").exists());

    let processing = pipeline.run_processing();
    assert!(processing.iter().all(|report| report.failed.is_empty()));
    let trainred_dir = pipeline.layout().source_dir(SourceKind::TrainRed);
    assert!(trainred_dir.join("moxy_avg_clean.csv").exists());
    assert!(
        pipeline
            .layout()
            .archive_dir(SourceKind::TrainRed)
            .join("moxy.csv")
            .exists()
    );
    assert!(
        pipeline
            .layout()
            .archive_dir(SourceKind::TrainRed)
            .join("moxy_avg.csv")
            .exists()
    );

    let validation = pipeline.run_validation().unwrap();
    assert_eq!(validation.reports.len(), 4);
    assert!(validation.is_valid(), "{validation:?}");

    let summary = pipeline
        .run_merge_on(MergeRequest::default(), date())
        .unwrap();
    assert_eq!(summary.output, ws.base.join("Training-19.10.2026-import.csv"));
    assert!(summary.output.exists());

    let table = &summary.outcome.table;
    let names = column_names(table);
    for expected in [
        "secs",
        "watts",
        "smo2",
        "THb",
        "TymeBreathRate",
        "tidal_volume",
        "TymeVentilation",
        "hrv",
        "core_temperature",
    ] {
        assert!(names.iter().any(|name| name == expected), "{expected} in {names:?}");
    }
    assert_eq!(names.iter().filter(|name| *name == "secs").count(), 1);

    // the watch lost its two incomplete leading rows, so two trailing rows go
    assert_eq!(summary.outcome.tail_trimmed, 2);
    assert_eq!(table.height(), 8);
    let smo2 = column_f64(table.column("smo2").unwrap());
    assert_eq!(smo2[0], Some(70.0));
    assert_eq!(smo2[7], Some(63.0));
    assert!(notifier.texts(NoticeLevel::Error).is_empty());
}

#[test]
fn only_the_first_base_export_is_imported() {
    let ws = Workspace::new();
    write(&ws.inbox.join("a_streams.csv"), &bike_export());
    write(&ws.inbox.join("b_streams.csv"), &bike_export());
    let notifier = Arc::new(RecordingNotifier::new());

    let import = ws.pipeline(&notifier).run_import().unwrap();
    assert_eq!(import.imported.len(), 1);
    assert_eq!(import.ignored, vec![ws.inbox.join("b_streams.csv")]);
    assert!(ws.inbox.join("b_streams.csv").exists());
    assert_eq!(notifier.texts(NoticeLevel::Warning).len(), 1);
}

#[test]
fn dry_run_leaves_the_inbox_alone() {
    let ws = Workspace::new();
    fill_inbox(&ws);
    let fs = Arc::new(LocalFileSystem::dry_run());
    let notifier = Arc::new(RecordingNotifier::new());
    let pipeline = Pipeline::new(ws.settings(), fs.clone(), notifier);

    let import = pipeline.run_import().unwrap();
    assert_eq!(import.imported.len(), 4);
    assert!(ws.inbox.join("moxy.csv").exists());
    assert!(!pipeline.layout().source_dir(SourceKind::TrainRed).exists());
    assert!(
        fs.operations()
            .iter()
            .any(|op| op.starts_with("[DRY-RUN] COPY"))
    );
}

#[test]
fn merge_without_base_fails() {
    let ws = Workspace::new();
    let notifier = Arc::new(RecordingNotifier::new());
    let err = ws
        .pipeline(&notifier)
        .run_merge_on(MergeRequest::default(), date())
        .unwrap_err();
    assert!(matches!(err, CoreError::BaseMissing { .. }));
    assert!(!err.is_aborted());
}

#[test]
fn existing_output_is_kept_unless_confirmed() {
    let ws = Workspace::new();
    let notifier = Arc::new(RecordingNotifier::new());
    let pipeline = ws.pipeline(&notifier);
    write(&pipeline.layout().base_file(), &bike_export());

    let first = pipeline
        .run_merge_on(MergeRequest::default(), date())
        .unwrap();
    assert_eq!(first.outcome.table.height(), 10);

    let err = pipeline
        .run_merge_on(MergeRequest::default(), date())
        .unwrap_err();
    assert!(matches!(err, CoreError::OutputExists { .. }));
    assert!(err.is_aborted());

    let confirming = Arc::new(RecordingNotifier::new().with_answers([true]));
    ws.pipeline(&confirming)
        .run_merge_on(MergeRequest::default(), date())
        .unwrap();
}

#[test]
fn declining_after_failed_validation_aborts() {
    let ws = Workspace::new();
    let notifier = Arc::new(RecordingNotifier::new());
    let pipeline = ws.pipeline(&notifier);
    write(
        &pipeline
            .layout()
            .source_dir(SourceKind::Tymewear)
            .join("breath_clean.csv"),
        "TymeBreathRate\n30\n31\n",
    );

    let err = pipeline.run_validation().unwrap_err();
    assert!(matches!(err, CoreError::Aborted { .. }));
    assert_eq!(notifier.texts(NoticeLevel::Question).len(), 1);

    let accepting = Arc::new(RecordingNotifier::new().with_answers([true]));
    let batch = ws.pipeline(&accepting).run_validation().unwrap();
    assert_eq!(batch.error_count(), 1);
}

#[test]
fn validation_warnings_ask_before_continuing() {
    let ws = Workspace::new();
    let mut csv = String::from("TymeBreathRate,tidal_volume,TymeVentilation\n");
    for row in 0..30 {
        let rate = if (5..25).contains(&row) {
            String::new()
        } else {
            format!("{}", 30 + row % 3)
        };
        csv.push_str(&format!("{rate},1.5,{}\n", 40 + row % 4));
    }

    let declining = Arc::new(RecordingNotifier::new().with_answers([false]));
    let pipeline = ws.pipeline(&declining);
    write(
        &pipeline
            .layout()
            .source_dir(SourceKind::Tymewear)
            .join("b_clean.csv"),
        &csv,
    );
    let err = pipeline.run_validation().unwrap_err();
    assert!(err.is_aborted());
    assert_eq!(declining.texts(NoticeLevel::Question).len(), 1);

    let unattended = Arc::new(RecordingNotifier::new());
    let batch = ws.pipeline(&unattended).run_validation().unwrap();
    assert_eq!(batch.error_count(), 0);
    assert_eq!(batch.warning_count(), 1);
    assert_eq!(unattended.texts(NoticeLevel::Question).len(), 1);
}

#[test]
fn cleanup_archives_sources_and_previous_outputs() {
    let ws = Workspace::new();
    let notifier = Arc::new(RecordingNotifier::new());
    let pipeline = ws.pipeline(&notifier);
    let layout = pipeline.layout();
    write(&layout.base_file(), &bike_export());
    write(
        &layout.source_dir(SourceKind::Garmin).join("watch_streams_clean.csv"),
        "hrv\n40\n",
    );
    write(&ws.base.join("Training-01.10.2026-import.csv"), "secs\n0\n");

    let report = pipeline.run_cleanup().unwrap();
    assert_eq!(report.archived[&SourceKind::Wahoo], 1);
    assert_eq!(report.archived[&SourceKind::Garmin], 1);
    assert_eq!(report.outputs_archived, 1);
    assert!(!layout.base_file().exists());
    assert!(
        layout
            .training_archive_dir()
            .join("Training-01.10.2026-import.csv")
            .exists()
    );
}

#[test]
fn inspect_classifies_and_validates() {
    let ws = Workspace::new();
    let path = ws.inbox.join("moxy.csv");
    write(&path, &oxygen_export());
    let notifier = Arc::new(RecordingNotifier::new());

    let inspection = ws.pipeline(&notifier).inspect(&path).unwrap();
    assert_eq!(inspection.kind, Some(SourceKind::TrainRed));
    assert_eq!(inspection.rows, 100);
    assert!(inspection.report.is_valid(), "{:?}", inspection.report);
    assert!(!inspection.report.has_warnings(), "{:?}", inspection.report);
}
