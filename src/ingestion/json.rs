//! JSON event loading.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"n_jets":1}, {"n_jets":2}]`
//! - Newline-delimited JSON (NDJSON): `{"n_jets":1}\n{"n_jets":2}\n`
//!
//! Per-object arrays map to list columns (`"jet": {"eta": [0.1, -1.2]}`), and
//! nested groups are addressed with dot paths in schema field names
//! (e.g. `jet.eta`).

use std::fs;
use std::path::Path;

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::{DataType, EventStore, Schema, Value};

/// Load JSON into an in-memory [`EventStore`].
pub fn load_json_from_path(path: impl AsRef<Path>, schema: &Schema) -> AnalysisResult<EventStore> {
    let text = fs::read_to_string(path)?;
    load_json_from_str(&text, schema)
}

/// Load JSON from an in-memory string into an [`EventStore`].
pub fn load_json_from_str(input: &str, schema: &Schema) -> AnalysisResult<EventStore> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AnalysisError::SchemaMismatch {
            message: "json input is empty".to_string(),
        });
    }

    // First try parsing as a single JSON value (array or object).
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(trimmed) {
        match v {
            serde_json::Value::Array(items) => load_json_values(&items, schema),
            serde_json::Value::Object(_) => load_json_values(&vec![v], schema),
            _ => Err(AnalysisError::SchemaMismatch {
                message: "json must be an object, an array of objects, or NDJSON".to_string(),
            }),
        }
    } else {
        // Fall back to NDJSON.
        let mut values = Vec::new();
        for (i, line) in trimmed.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let v = serde_json::from_str::<serde_json::Value>(line).map_err(|e| {
                AnalysisError::SchemaMismatch {
                    message: format!("invalid ndjson at line {}: {}", i + 1, e),
                }
            })?;
            values.push(v);
        }
        load_json_values(&values, schema)
    }
}

fn load_json_values(values: &[serde_json::Value], schema: &Schema) -> AnalysisResult<EventStore> {
    let mut events: Vec<Vec<Value>> = Vec::with_capacity(values.len());

    for (idx0, v) in values.iter().enumerate() {
        let event_num = idx0 + 1;
        let obj = v.as_object().ok_or_else(|| AnalysisError::SchemaMismatch {
            message: format!("event {event_num} is not a json object"),
        })?;

        let mut row: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for field in &schema.fields {
            let jv = get_by_dot_path(obj, &field.name).ok_or_else(|| {
                AnalysisError::SchemaMismatch {
                    message: format!("event {event_num} missing required field '{}'", field.name),
                }
            })?;
            row.push(convert_json_value(event_num, &field.name, &field.data_type, jv)?);
        }
        events.push(row);
    }

    Ok(EventStore::new(schema.clone(), events))
}

fn get_by_dot_path<'a>(
    root: &'a serde_json::Map<String, serde_json::Value>,
    path: &str,
) -> Option<&'a serde_json::Value> {
    let mut current: &serde_json::Value = root.get(path.split('.').next().unwrap_or(path))?;

    // If there are no dots, short-circuit.
    if !path.contains('.') {
        return Some(current);
    }

    for segment in path.split('.').skip(1) {
        match current {
            serde_json::Value::Object(map) => current = map.get(segment)?,
            _ => return None,
        }
    }
    Some(current)
}

fn convert_json_value(
    event: usize,
    column: &str,
    data_type: &DataType,
    v: &serde_json::Value,
) -> AnalysisResult<Value> {
    let parse_err = |message: &str| AnalysisError::ParseError {
        event,
        column: column.to_string(),
        raw: v.to_string(),
        message: message.to_string(),
    };

    if v.is_null() {
        return Ok(Value::Null);
    }

    match data_type {
        DataType::Int64 => json_i64(v).map(Value::Int64).ok_or_else(|| {
            parse_err("expected integer number")
        }),
        DataType::Float64 => v
            .as_f64()
            .map(Value::Float64)
            .ok_or_else(|| parse_err("expected number")),
        DataType::IntList => {
            let items = v.as_array().ok_or_else(|| parse_err("expected array"))?;
            items
                .iter()
                .map(|item| json_i64(item).ok_or_else(|| parse_err("expected array of integers")))
                .collect::<AnalysisResult<Vec<_>>>()
                .map(Value::IntList)
        }
        DataType::FloatList => {
            let items = v.as_array().ok_or_else(|| parse_err("expected array"))?;
            items
                .iter()
                .map(|item| {
                    item.as_f64()
                        .ok_or_else(|| parse_err("expected array of numbers"))
                })
                .collect::<AnalysisResult<Vec<_>>>()
                .map(Value::FloatList)
        }
        DataType::P4 => Err(parse_err(
            "four-momentum columns are derived and cannot be loaded",
        )),
    }
}

fn json_i64(v: &serde_json::Value) -> Option<i64> {
    v.as_i64().or_else(|| v.as_u64().and_then(|n| i64::try_from(n).ok()))
}
