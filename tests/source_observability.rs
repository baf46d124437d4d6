use std::sync::{Arc, Mutex};

use hr_reporting::ingestion::{
    load_source, IngestionContext, IngestionObserver, IngestionOptions, IngestionSeverity, IngestionStats,
    SourceConfig, SourceSpec,
};
use hr_reporting::store::HrStore;
use hr_reporting::types::DatasetKind;
use hr_reporting::IngestionError;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<(Option<DatasetKind>, IngestionStats)>>,
    failures: Mutex<Vec<IngestionSeverity>>,
    alerts: Mutex<Vec<IngestionSeverity>>,
}

impl IngestionObserver for RecordingObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.successes.lock().unwrap().push((ctx.dataset, stats));
    }

    fn on_failure(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn options_with(obs: &Arc<RecordingObserver>, alert_at_or_above: IngestionSeverity) -> IngestionOptions {
    IngestionOptions {
        observer: Some(obs.clone()),
        alert_at_or_above,
    }
}

#[test]
fn observer_receives_failure_and_alert_on_missing_file() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = options_with(&obs, IngestionSeverity::Critical);

    let spec = SourceSpec::from_path("tests/fixtures/does_not_exist.csv").unwrap();
    let _ = load_source(&spec, &opts).unwrap_err();

    assert_eq!(obs.failures.lock().unwrap().clone(), vec![IngestionSeverity::Critical]);
    assert_eq!(obs.alerts.lock().unwrap().clone(), vec![IngestionSeverity::Critical]);
}

#[test]
fn observer_receives_failure_without_alert_for_non_critical_error() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = options_with(&obs, IngestionSeverity::Critical);

    // A multi-byte delimiter cannot be served; that is an Error, not Critical.
    let spec = SourceSpec::Delimited {
        path: "tests/fixtures/roster.csv".into(),
        delimiter: Some('§'),
    };
    let err = load_source(&spec, &opts).unwrap_err();
    assert!(matches!(err, IngestionError::UnsupportedSource { .. }));

    assert_eq!(obs.failures.lock().unwrap().clone(), vec![IngestionSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn lower_alert_threshold_alerts_on_errors() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = options_with(&obs, IngestionSeverity::Error);

    let spec = SourceSpec::Delimited {
        path: "tests/fixtures/roster.csv".into(),
        delimiter: Some('§'),
    };
    let _ = load_source(&spec, &opts).unwrap_err();
    assert_eq!(obs.alerts.lock().unwrap().clone(), vec![IngestionSeverity::Error]);
}

#[test]
fn snapshot_build_reports_each_dataset() {
    let obs = Arc::new(RecordingObserver::default());
    let sources = SourceConfig {
        roster: SourceSpec::from_path("tests/fixtures/roster.csv").unwrap(),
        provider: SourceSpec::from_path("tests/fixtures/provider.csv").unwrap(),
        directory: SourceSpec::from_path("tests/fixtures/directory.csv").unwrap(),
        terminated: SourceSpec::from_path("tests/fixtures/terminated.csv").unwrap(),
    };
    let mut store = HrStore::new(sources, Default::default(), options_with(&obs, IngestionSeverity::Critical));
    store.load().unwrap();

    let successes = obs.successes.lock().unwrap().clone();
    let datasets: Vec<Option<DatasetKind>> = successes.iter().map(|(kind, _)| *kind).collect();
    assert_eq!(
        datasets,
        DatasetKind::ALL.iter().copied().map(Some).collect::<Vec<_>>()
    );
    assert_eq!(successes[0].1, IngestionStats { rows: 5, columns: 9 });
    assert!(obs.failures.lock().unwrap().is_empty());

    // A cached load does not touch the sources again.
    store.load().unwrap();
    assert_eq!(obs.successes.lock().unwrap().len(), 4);
}
