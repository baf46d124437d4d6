use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::IngestionError;
use crate::types::DatasetKind;

use super::unified::SourceFormat;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (load failed).
    Error,
    /// Critical error (the source could not be opened or read).
    Critical,
}

impl IngestionSeverity {
    /// Severity assigned to a load failure.
    pub fn for_error(error: &IngestionError) -> Self {
        match error {
            IngestionError::SourceUnavailable { .. } => IngestionSeverity::Critical,
            IngestionError::SchemaEmpty { .. }
            | IngestionError::UnsupportedSource { .. }
            | IngestionError::Config(_) => IngestionSeverity::Error,
        }
    }
}

/// Context about a load attempt.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    /// Logical dataset being loaded, when loading as part of a snapshot.
    pub dataset: Option<DatasetKind>,
    /// Human-readable source location (path, `path:sheet`, or `database#table`).
    pub location: String,
    /// Backend used.
    pub format: SourceFormat,
}

impl fmt::Display for IngestionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dataset {
            Some(kind) => write!(f, "dataset={kind} format={:?} source={}", self.format, self.location),
            None => write!(f, "format={:?} source={}", self.format, self.location),
        }
    }
}

/// Minimal stats reported on a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    /// Number of loaded rows.
    pub rows: usize,
    /// Number of discovered columns.
    pub columns: usize,
}

/// Observer interface for load outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait IngestionObserver: Send + Sync {
    /// Called when a load succeeds.
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// Called when a load fails.
    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &IngestionError) {}

    /// Called when a load failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Emits load events through `tracing`.
///
/// Successes are `info`, failures `error`; alerts carry `alert = true`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl IngestionObserver for TracingObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        tracing::info!(
            dataset = ctx.dataset.map(DatasetKind::name),
            format = ?ctx.format,
            source = %ctx.location,
            rows = stats.rows,
            columns = stats.columns,
            "source loaded"
        );
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        tracing::error!(
            dataset = ctx.dataset.map(DatasetKind::name),
            format = ?ctx.format,
            source = %ctx.location,
            ?severity,
            %error,
            "source load failed"
        );
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        tracing::error!(
            dataset = ctx.dataset.map(DatasetKind::name),
            format = ?ctx.format,
            source = %ctx.location,
            ?severity,
            %error,
            alert = true,
            "source load failed"
        );
    }
}

/// Logs load events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl IngestionObserver for StdErrObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        eprintln!("[load][ok] {ctx} rows={} columns={}", stats.rows, stats.columns);
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        eprintln!("[load][{severity:?}] {ctx} err={error}");
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        eprintln!("[ALERT][load][{severity:?}] {ctx} err={error}");
    }
}

/// Appends load events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl IngestionObserver for FileObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.append_line(&format!(
            "{} ok {ctx} rows={} columns={}",
            unix_ts(),
            stats.rows,
            stats.columns
        ));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.append_line(&format!("{} fail severity={severity:?} {ctx} err={error}", unix_ts()));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.append_line(&format!("{} ALERT severity={severity:?} {ctx} err={error}", unix_ts()));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> IngestionContext {
        IngestionContext {
            dataset: Some(DatasetKind::Roster),
            location: "HRdata.csv".to_string(),
            format: SourceFormat::Delimited,
        }
    }

    #[test]
    fn unavailable_sources_are_critical() {
        let err = IngestionError::unavailable("x.csv", std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(IngestionSeverity::for_error(&err), IngestionSeverity::Critical);

        let err = IngestionError::SchemaEmpty {
            location: "x.csv".to_string(),
        };
        assert_eq!(IngestionSeverity::for_error(&err), IngestionSeverity::Error);
    }

    #[test]
    fn context_display_names_dataset_and_source() {
        assert_eq!(
            ctx().to_string(),
            "dataset=roster format=Delimited source=HRdata.csv"
        );
    }

    #[test]
    fn file_observer_appends_lines() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("hr-reporting-observer-{nanos}.log"));
        let obs = FileObserver::new(&path);

        obs.on_success(&ctx(), IngestionStats { rows: 3, columns: 2 });
        let err = IngestionError::SchemaEmpty {
            location: "HRdata.csv".to_string(),
        };
        obs.on_alert(&ctx(), IngestionSeverity::Error, &err);

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("ok dataset=roster"));
        assert!(lines[0].contains("rows=3 columns=2"));
        assert!(lines[1].contains("ALERT severity=Error"));

        let _ = std::fs::remove_file(&path);
    }
}
