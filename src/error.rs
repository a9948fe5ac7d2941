use thiserror::Error;

/// Convenience result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Error type returned across the crate.
///
/// This is a single error enum shared by event loading, calibration setup, and
/// derived-column producers.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV loading error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Parquet loading error.
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// The input does not conform to the provided schema (missing required fields/columns, etc.).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A value could not be parsed into the required [`crate::types::DataType`].
    #[error("failed to parse value at event {event} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        event: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// A calibration resource or algorithm key could not be resolved.
    ///
    /// Fatal at setup time; producers never raise this per event.
    #[error("configuration error for '{resource}': {message}")]
    Configuration { resource: String, message: String },

    /// A producer input column does not exist in the schema.
    #[error("column '{name}' not found in schema")]
    ColumnNotFound { name: String },

    /// A producer input column holds a different type than required.
    #[error("column '{column}' has the wrong type: expected {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
    },

    /// Aligned object arrays of one event have different lengths.
    #[error("column '{column}' length {actual} does not match aligned length {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}
