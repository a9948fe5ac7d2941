//! CSV event loading.

use std::path::Path;

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::{DataType, EventStore, Schema, Value};

/// Load a CSV file into an in-memory [`EventStore`].
///
/// Rules:
///
/// - CSV must have headers.
/// - Headers must contain all schema fields (order can differ).
/// - Scalar cells are parsed according to the schema field type; empty scalar
///   cells are null.
/// - List cells hold `|`-separated values (`"40.1|25.3"`); an empty list cell
///   is an empty list, matching an event with no objects in the collection.
pub fn load_csv_from_path(path: impl AsRef<Path>, schema: &Schema) -> AnalysisResult<EventStore> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    load_csv_from_reader(&mut rdr, schema)
}

/// Load CSV data from an existing CSV reader.
pub fn load_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    schema: &Schema,
) -> AnalysisResult<EventStore> {
    let headers = rdr.headers()?.clone();

    // Map schema fields -> CSV column indexes (allows re-ordered CSV columns).
    let mut col_idxs = Vec::with_capacity(schema.fields.len());
    for field in &schema.fields {
        match headers.iter().position(|h| h == field.name) {
            Some(idx) => col_idxs.push(idx),
            None => {
                return Err(AnalysisError::SchemaMismatch {
                    message: format!(
                        "missing required column '{field}'. headers={:?}",
                        headers.iter().collect::<Vec<_>>(),
                        field = field.name
                    ),
                });
            }
        }
    }

    let mut events: Vec<Vec<Value>> = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        // Report 1-based event number for users; +1 again because header is row 1.
        let user_event = row_idx0 + 2;
        let record = result?;

        let mut row: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for (field, &csv_idx) in schema.fields.iter().zip(col_idxs.iter()) {
            let raw = record.get(csv_idx).unwrap_or("");
            row.push(parse_typed_value(user_event, &field.name, &field.data_type, raw)?);
        }
        events.push(row);
    }

    Ok(EventStore::new(schema.clone(), events))
}

fn parse_typed_value(
    event: usize,
    column: &str,
    data_type: &DataType,
    raw: &str,
) -> AnalysisResult<Value> {
    let parse_err = |message: String| AnalysisError::ParseError {
        event,
        column: column.to_owned(),
        raw: raw.to_owned(),
        message,
    };

    let trimmed = raw.trim();
    match data_type {
        DataType::Int64 => {
            if trimmed.is_empty() {
                return Ok(Value::Null);
            }
            trimmed
                .parse::<i64>()
                .map(Value::Int64)
                .map_err(|e| parse_err(e.to_string()))
        }
        DataType::Float64 => {
            if trimmed.is_empty() {
                return Ok(Value::Null);
            }
            trimmed
                .parse::<f64>()
                .map(Value::Float64)
                .map_err(|e| parse_err(e.to_string()))
        }
        DataType::IntList => {
            if trimmed.is_empty() {
                return Ok(Value::IntList(Vec::new()));
            }
            trimmed
                .split('|')
                .map(|s| s.trim().parse::<i64>())
                .collect::<Result<Vec<_>, _>>()
                .map(Value::IntList)
                .map_err(|e| parse_err(e.to_string()))
        }
        DataType::FloatList => {
            if trimmed.is_empty() {
                return Ok(Value::FloatList(Vec::new()));
            }
            trimmed
                .split('|')
                .map(|s| s.trim().parse::<f64>())
                .collect::<Result<Vec<_>, _>>()
                .map(Value::FloatList)
                .map_err(|e| parse_err(e.to_string()))
        }
        DataType::P4 => Err(parse_err(
            "four-momentum columns are derived and cannot be loaded".to_string(),
        )),
    }
}
