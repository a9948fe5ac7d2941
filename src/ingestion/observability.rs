//! Observers for event-file loading: logging, alerting, and load stats.

use std::error::Error as StdError;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::AnalysisError;

use super::unified::EventFileFormat;

/// Severity of a loading failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadSeverity {
    Info,
    Warning,
    /// The file was readable but its content does not fit the schema;
    /// retrying the same file cannot help.
    Error,
    /// Infrastructure failure (missing file, I/O); the input never made it
    /// into memory.
    Critical,
}

impl LoadSeverity {
    /// Classify a loading error.
    ///
    /// I/O failures are `Critical`, including I/O wrapped inside parquet or
    /// csv errors; everything else (parse errors, schema mismatches) is
    /// `Error`.
    pub fn classify(error: &AnalysisError) -> Self {
        match error {
            AnalysisError::Io(_) => Self::Critical,
            AnalysisError::Parquet(e) => {
                if error_chain_contains_io(e) {
                    Self::Critical
                } else {
                    Self::Error
                }
            }
            AnalysisError::Csv(e) => match e.kind() {
                ::csv::ErrorKind::Io(_) => Self::Critical,
                _ => Self::Error,
            },
            _ => Self::Error,
        }
    }
}

fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}

/// Which file a loading attempt was for, and how it was interpreted.
#[derive(Debug, Clone)]
pub struct LoadContext {
    pub path: PathBuf,
    pub format: EventFileFormat,
}

/// Shape of a successfully loaded event table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    /// Number of loaded events (rows).
    pub events: usize,
    /// Number of schema columns the events were parsed into.
    pub columns: usize,
}

impl fmt::Display for LoadStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} events x {} columns", self.events, self.columns)
    }
}

/// Observer interface for event-loading outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait LoadObserver: Send + Sync {
    /// Called when loading succeeds.
    fn on_success(&self, _ctx: &LoadContext, _stats: LoadStats) {}

    /// Called when loading fails.
    fn on_failure(&self, _ctx: &LoadContext, _severity: LoadSeverity, _error: &AnalysisError) {}

    /// Called when a loading failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &AnalysisError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Fans every callback out to a list of observers.
///
/// Lets one load report to, say, a stderr logger and a file log at once.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn LoadObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn LoadObserver>>) -> Self {
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

impl LoadObserver for CompositeObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &AnalysisError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &AnalysisError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs loading outcomes to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl LoadObserver for StdErrObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        eprintln!(
            "loaded {} ({:?}): {stats}",
            ctx.path.display(),
            ctx.format
        );
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &AnalysisError) {
        eprintln!(
            "load failed [{severity:?}] {} ({:?}): {error}",
            ctx.path.display(),
            ctx.format
        );
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &AnalysisError) {
        eprintln!(
            "ALERT load failed [{severity:?}] {} ({:?}): {error}",
            ctx.path.display(),
            ctx.format
        );
    }
}

/// Appends loading outcomes to a local log file, one line per outcome.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends to `path`.
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

impl LoadObserver for FileObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        self.append_line(&format!(
            "{} ok {} ({:?}): {stats}",
            unix_ts(),
            ctx.path.display(),
            ctx.format
        ));
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &AnalysisError) {
        self.append_line(&format!(
            "{} fail [{severity:?}] {} ({:?}): {error}",
            unix_ts(),
            ctx.path.display(),
            ctx.format
        ));
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &AnalysisError) {
        self.append_line(&format!(
            "{} ALERT [{severity:?}] {} ({:?}): {error}",
            unix_ts(),
            ctx.path.display(),
            ctx.format
        ));
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
    use super::LoadSeverity;
    use crate::error::AnalysisError;

    #[test]
    fn io_errors_classify_as_critical() {
        let err = AnalysisError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(LoadSeverity::classify(&err), LoadSeverity::Critical);
    }

    #[test]
    fn content_errors_classify_below_critical() {
        let err = AnalysisError::SchemaMismatch {
            message: "missing required field 'jet.eta'".to_string(),
        };
        assert_eq!(LoadSeverity::classify(&err), LoadSeverity::Error);

        let err = AnalysisError::ParseError {
            event: 3,
            column: "pt".to_string(),
            raw: "abc".to_string(),
            message: "expected number".to_string(),
        };
        assert_eq!(LoadSeverity::classify(&err), LoadSeverity::Error);
    }

    #[test]
    fn severities_order_for_alert_thresholds() {
        assert!(LoadSeverity::Critical > LoadSeverity::Error);
        assert!(LoadSeverity::Error > LoadSeverity::Warning);
        assert!(LoadSeverity::Warning > LoadSeverity::Info);
    }
}
