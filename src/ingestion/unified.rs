//! Unified event-loading entrypoint.
//!
//! Most callers should use [`load_events_from_path`], which loads a file into
//! an in-memory [`crate::types::EventStore`] using a provided
//! [`crate::types::Schema`].
//!
//! - If [`LoadOptions::format`] is `None`, the format is inferred from the
//!   file extension.
//! - If an [`super::observability::LoadObserver`] is provided,
//!   success/failure/alerts are reported to it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::{EventStore, Schema};

use super::observability::{LoadContext, LoadObserver, LoadSeverity, LoadStats};
use super::{csv, json, parquet};

/// Supported event-file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFileFormat {
    /// Comma-separated values with `|`-separated list cells.
    Csv,
    /// JSON array-of-objects or NDJSON.
    Json,
    /// Apache Parquet.
    Parquet,
}

impl EventFileFormat {
    /// Parse a format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" | "ndjson" => Some(Self::Json),
            "parquet" | "pq" => Some(Self::Parquet),
            _ => None,
        }
    }
}

/// Options controlling unified event loading.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct LoadOptions {
    /// If `None`, auto-detect format from file extension.
    pub format: Option<EventFileFormat>,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn LoadObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: LoadSeverity,
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("format", &self.format)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            format: None,
            observer: None,
            alert_at_or_above: LoadSeverity::Critical,
        }
    }
}

/// Unified event-loading entry point for path-based sources.
///
/// - If `options.format` is `None`, format is inferred from the file extension.
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with event-count stats
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ```no_run
/// use event_columns::ingestion::{load_events_from_path, LoadOptions};
/// use event_columns::types::{DataType, Field, Schema};
///
/// # fn main() -> Result<(), event_columns::AnalysisError> {
/// let schema = Schema::new(vec![
///     Field::new("jet.eta", DataType::FloatList),
///     Field::new("jet.phi", DataType::FloatList),
/// ]);
/// // Uses `.json` to select JSON loading.
/// let store = load_events_from_path("events.json", &schema, &LoadOptions::default())?;
/// println!("events={}", store.event_count());
/// # Ok(())
/// # }
/// ```
pub fn load_events_from_path(
    path: impl AsRef<Path>,
    schema: &Schema,
    options: &LoadOptions,
) -> AnalysisResult<EventStore> {
    let path = path.as_ref();
    let fmt = match options.format {
        Some(f) => f,
        None => infer_format_from_path(path)?,
    };

    let ctx = LoadContext {
        path: path.to_path_buf(),
        format: fmt,
    };

    let result = match fmt {
        EventFileFormat::Csv => csv::load_csv_from_path(path, schema),
        EventFileFormat::Json => json::load_json_from_path(path, schema),
        EventFileFormat::Parquet => parquet::load_parquet_from_path(path, schema),
    };

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok(store) => obs.on_success(
                &ctx,
                LoadStats {
                    events: store.event_count(),
                    columns: store.schema.fields.len(),
                },
            ),
            Err(e) => {
                let sev = LoadSeverity::classify(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result
}

fn infer_format_from_path(path: &Path) -> AnalysisResult<EventFileFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| AnalysisError::SchemaMismatch {
            message: format!(
                "cannot infer format: path has no extension ({})",
                path.display()
            ),
        })?;

    EventFileFormat::from_extension(ext).ok_or_else(|| AnalysisError::SchemaMismatch {
        message: format!(
            "cannot infer format from extension '{ext}' for path ({})",
            path.display()
        ),
    })
}

/// Convenience helper for callers that want an owned request object.
///
/// This can be useful if you want to enqueue loading work in a job system.
#[derive(Clone)]
pub struct LoadRequest {
    /// Path to the input file.
    pub path: PathBuf,
    /// Schema to validate/parse values into.
    pub schema: Schema,
    /// Options controlling loading.
    pub options: LoadOptions,
}

impl fmt::Debug for LoadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadRequest")
            .field("path", &self.path)
            .field("schema_fields", &self.schema.fields.len())
            .field("options", &self.options)
            .finish()
    }
}

impl LoadRequest {
    /// Execute the request by calling [`load_events_from_path`].
    pub fn run(&self) -> AnalysisResult<EventStore> {
        load_events_from_path(&self.path, &self.schema, &self.options)
    }
}
