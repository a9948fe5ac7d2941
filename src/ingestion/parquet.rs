//! Parquet event loading.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use parquet::file::reader::{ChunkReader, FileReader};
use parquet::file::serialized_reader::SerializedFileReader;
use parquet::record::{Field, List};

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::{DataType, EventStore, Schema, Value};

/// Load a Parquet file into an in-memory [`EventStore`].
///
/// Notes:
/// - Validates that all schema fields exist as Parquet columns. Scalar fields
///   must be leaf columns; list fields match LIST logical-type groups (their
///   leaves live under `<name>.list.<element>`).
/// - Uses the Parquet record API (`RowIter`); LIST groups map to list values.
pub fn load_parquet_from_path(
    path: impl AsRef<Path>,
    schema: &Schema,
) -> AnalysisResult<EventStore> {
    let reader = SerializedFileReader::try_from(path.as_ref())?;

    let available_columns = parquet_leaf_column_paths(&reader);
    for field in &schema.fields {
        let prefix = format!("{}.", field.name);
        let present = available_columns
            .iter()
            .any(|c| c == &field.name || c.starts_with(&prefix));
        if !present {
            return Err(AnalysisError::SchemaMismatch {
                message: format!("missing required column '{}'", field.name),
            });
        }
    }

    let mut events: Vec<Vec<Value>> = Vec::new();
    for (idx0, row_res) in reader.into_iter().enumerate() {
        let event_num = idx0 + 1;
        let row = row_res?;

        // Build a name->Field map for lookup.
        let mut map: HashMap<&str, &Field> = HashMap::new();
        for (name, field) in row.get_column_iter() {
            map.insert(name.as_str(), field);
        }

        let mut out_row: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for f in &schema.fields {
            let v = map
                .get(f.name.as_str())
                .ok_or_else(|| AnalysisError::SchemaMismatch {
                    message: format!("event {event_num} missing required column '{}'", f.name),
                })?;
            out_row.push(convert_parquet_field(event_num, &f.name, &f.data_type, v)?);
        }
        events.push(out_row);
    }

    Ok(EventStore::new(schema.clone(), events))
}

fn parquet_leaf_column_paths<R: ChunkReader + 'static>(
    reader: &SerializedFileReader<R>,
) -> HashSet<String> {
    let mut set = HashSet::new();
    let cols = reader
        .metadata()
        .file_metadata()
        .schema_descr()
        .columns();
    for c in cols {
        set.insert(c.path().string());
    }
    set
}

fn convert_parquet_field(
    event: usize,
    column: &str,
    data_type: &DataType,
    f: &Field,
) -> AnalysisResult<Value> {
    if matches!(f, Field::Null) {
        return Ok(Value::Null);
    }

    let parse_err = |message: &str| AnalysisError::ParseError {
        event,
        column: column.to_string(),
        raw: f.to_string(),
        message: message.to_string(),
    };

    match data_type {
        DataType::Int64 => scalar_i64(f).ok_or_else(|| parse_err("expected integer")),
        DataType::Float64 => scalar_f64(f).ok_or_else(|| parse_err("expected number")),
        DataType::IntList => match f {
            Field::ListInternal(list) => list_i64(list).ok_or_else(|| {
                parse_err("expected list of integers")
            }),
            _ => Err(parse_err("expected list of integers")),
        },
        DataType::FloatList => match f {
            Field::ListInternal(list) => list_f64(list).ok_or_else(|| {
                parse_err("expected list of numbers")
            }),
            _ => Err(parse_err("expected list of numbers")),
        },
        DataType::P4 => Err(parse_err(
            "four-momentum columns are derived and cannot be loaded",
        )),
    }
}

fn scalar_i64(f: &Field) -> Option<Value> {
    element_i64(f).map(Value::Int64)
}

fn scalar_f64(f: &Field) -> Option<Value> {
    element_f64(f).map(Value::Float64)
}

fn list_i64(list: &List) -> Option<Value> {
    list.elements()
        .iter()
        .map(element_i64)
        .collect::<Option<Vec<_>>>()
        .map(Value::IntList)
}

fn list_f64(list: &List) -> Option<Value> {
    list.elements()
        .iter()
        .map(element_f64)
        .collect::<Option<Vec<_>>>()
        .map(Value::FloatList)
}

fn element_i64(f: &Field) -> Option<i64> {
    match f {
        Field::Byte(v) => Some(i64::from(*v)),
        Field::Short(v) => Some(i64::from(*v)),
        Field::Int(v) => Some(i64::from(*v)),
        Field::Long(v) => Some(*v),
        Field::UByte(v) => Some(i64::from(*v)),
        Field::UShort(v) => Some(i64::from(*v)),
        Field::UInt(v) => Some(i64::from(*v)),
        Field::ULong(v) => i64::try_from(*v).ok(),
        _ => None,
    }
}

fn element_f64(f: &Field) -> Option<f64> {
    match f {
        Field::Float(v) => Some(f64::from(*v)),
        Field::Double(v) => Some(*v),
        _ => None,
    }
}
