use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use event_columns::ingestion::{
    load_events_from_path, CompositeObserver, EventFileFormat, FileObserver, LoadContext,
    LoadObserver, LoadOptions, LoadSeverity, LoadStats, StdErrObserver,
};
use event_columns::types::{DataType, Field, Schema};
use event_columns::AnalysisError;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<LoadStats>>,
    failures: Mutex<Vec<LoadSeverity>>,
    alerts: Mutex<Vec<LoadSeverity>>,
}

impl LoadObserver for RecordingObserver {
    fn on_success(&self, _ctx: &LoadContext, stats: LoadStats) {
        self.successes.lock().unwrap().push(stats);
    }

    fn on_failure(&self, _ctx: &LoadContext, severity: LoadSeverity, _error: &AnalysisError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &LoadContext, severity: LoadSeverity, _error: &AnalysisError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn event_only_schema() -> Schema {
    Schema::new(vec![Field::new("event", DataType::Int64)])
}

fn missing_column_schema() -> Schema {
    Schema::new(vec![Field::new("definitely_missing", DataType::Float64)])
}

fn tmp_log(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("event-columns-{name}-{nanos}.log"))
}

#[test]
fn observer_receives_failure_and_alert_on_critical_io_error() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = LoadOptions {
        format: Some(EventFileFormat::Csv),
        observer: Some(obs.clone()),
        alert_at_or_above: LoadSeverity::Critical,
    };

    // Missing file -> Io error -> Critical.
    let _ = load_events_from_path("tests/fixtures/does_not_exist.csv", &event_only_schema(), &opts)
        .unwrap_err();

    let failures = obs.failures.lock().unwrap().clone();
    let alerts = obs.alerts.lock().unwrap().clone();
    assert_eq!(failures, vec![LoadSeverity::Critical]);
    assert_eq!(alerts, vec![LoadSeverity::Critical]);
}

#[test]
fn observer_receives_failure_without_alert_for_non_critical_error() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = LoadOptions {
        format: Some(EventFileFormat::Csv),
        observer: Some(obs.clone()),
        alert_at_or_above: LoadSeverity::Critical,
    };

    // Schema mismatch -> Error severity -> no alert at the Critical threshold.
    let _ = load_events_from_path("tests/fixtures/events.csv", &missing_column_schema(), &opts)
        .unwrap_err();

    let failures = obs.failures.lock().unwrap().clone();
    assert_eq!(failures, vec![LoadSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn observer_receives_success_with_table_shape() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = LoadOptions {
        format: None,
        observer: Some(obs.clone()),
        alert_at_or_above: LoadSeverity::Critical,
    };

    let store =
        load_events_from_path("tests/fixtures/events.csv", &event_only_schema(), &opts).unwrap();
    assert_eq!(store.event_count(), 2);

    let successes = obs.successes.lock().unwrap().clone();
    assert_eq!(
        successes,
        vec![LoadStats {
            events: 2,
            columns: 1
        }]
    );
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn composite_observer_fans_out_to_all_observers() {
    let first = Arc::new(RecordingObserver::default());
    let second = Arc::new(RecordingObserver::default());
    let composite = CompositeObserver::new(vec![
        first.clone(),
        second.clone(),
        Arc::new(StdErrObserver),
    ]);
    let opts = LoadOptions {
        format: None,
        observer: Some(Arc::new(composite)),
        alert_at_or_above: LoadSeverity::Critical,
    };

    let _ = load_events_from_path("tests/fixtures/events.csv", &event_only_schema(), &opts)
        .unwrap();
    let _ = load_events_from_path("tests/fixtures/does_not_exist.csv", &event_only_schema(), &opts)
        .unwrap_err();

    for obs in [&first, &second] {
        assert_eq!(obs.successes.lock().unwrap().len(), 1);
        assert_eq!(
            obs.failures.lock().unwrap().clone(),
            vec![LoadSeverity::Critical]
        );
        assert_eq!(
            obs.alerts.lock().unwrap().clone(),
            vec![LoadSeverity::Critical]
        );
    }
}

#[test]
fn file_observer_appends_one_line_per_outcome() {
    let log = tmp_log("load");
    let opts = LoadOptions {
        format: None,
        observer: Some(Arc::new(FileObserver::new(&log))),
        alert_at_or_above: LoadSeverity::Critical,
    };

    let _ = load_events_from_path("tests/fixtures/events.csv", &event_only_schema(), &opts)
        .unwrap();
    let _ = load_events_from_path("tests/fixtures/does_not_exist.csv", &event_only_schema(), &opts)
        .unwrap_err();

    let text = std::fs::read_to_string(&log).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    // Success, then failure plus its alert.
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("ok"));
    assert!(lines[0].contains("2 events x 1 columns"));
    assert!(lines[1].contains("fail [Critical]"));
    assert!(lines[2].contains("ALERT"));
    assert!(text.contains("does_not_exist.csv"));

    let _ = std::fs::remove_file(&log);
}
