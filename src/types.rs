//! Core data model types for event tables.
//!
//! Event data is held in an in-memory [`EventStore`] shaped by a user-provided
//! [`Schema`] (a list of typed [`Field`]s). One row is one event; list-typed
//! columns hold the per-object arrays of that event (jets, leptons, ...),
//! index-aligned across columns of the same collection.

use crate::error::{AnalysisError, AnalysisResult};
use crate::kinematics::PtEtaPhiM;

/// Logical data type for a schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    /// 64-bit signed integer scalar (flags, counts).
    Int64,
    /// 64-bit floating point scalar (kinematic scalars, scale factors).
    Float64,
    /// Per-object integer array (selection masks, pair indices).
    IntList,
    /// Per-object floating point array (pt/eta/phi/mass collections).
    FloatList,
    /// A four-momentum. Derived-only; never loaded from files.
    P4,
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// A list of fields describing the expected shape of event data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A single typed value in an [`EventStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer scalar.
    Int64(i64),
    /// 64-bit float scalar.
    Float64(f64),
    /// Per-object integer array.
    IntList(Vec<i64>),
    /// Per-object float array.
    FloatList(Vec<f64>),
    /// Four-momentum.
    P4(PtEtaPhiM),
}

impl Value {
    /// View as a float scalar, if this value is one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// View as an integer scalar, if this value is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// View as a float array, if this value is one.
    pub fn as_float_list(&self) -> Option<&[f64]> {
        match self {
            Value::FloatList(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// View as an integer array, if this value is one.
    pub fn as_int_list(&self) -> Option<&[i64]> {
        match self {
            Value::IntList(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// View as a four-momentum, if this value is one.
    pub fn as_p4(&self) -> Option<PtEtaPhiM> {
        match self {
            Value::P4(v) => Some(*v),
            _ => None,
        }
    }
}

/// In-memory columnar event table.
///
/// Events are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`]
/// fields. The store is immutable: producers return a new store with columns
/// appended, so transformations compose as a chain.
#[derive(Debug, Clone, PartialEq)]
pub struct EventStore {
    /// Schema describing event shape.
    pub schema: Schema,
    /// Row-major value storage, one row per event.
    pub events: Vec<Vec<Value>>,
}

impl EventStore {
    /// Create an event store from schema and events.
    pub fn new(schema: Schema, events: Vec<Vec<Value>>) -> Self {
        Self { schema, events }
    }

    /// Number of events in the store.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Returns the index of `name` in the schema, or [`AnalysisError::ColumnNotFound`].
    pub fn column_index(&self, name: &str) -> AnalysisResult<usize> {
        self.schema
            .index_of(name)
            .ok_or_else(|| AnalysisError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    /// Create a new store with a derived column appended.
    ///
    /// `producer` is called once per event with the full event row and returns
    /// the value of the new column for that event. The input store is left
    /// untouched; defining an already existing column name is a
    /// [`AnalysisError::SchemaMismatch`].
    pub fn define<F>(&self, field: Field, mut producer: F) -> AnalysisResult<EventStore>
    where
        F: FnMut(&[Value]) -> AnalysisResult<Value>,
    {
        if self.schema.index_of(&field.name).is_some() {
            return Err(AnalysisError::SchemaMismatch {
                message: format!("column '{}' already defined", field.name),
            });
        }

        let mut events = Vec::with_capacity(self.events.len());
        for row in &self.events {
            let mut out = row.clone();
            out.push(producer(row.as_slice())?);
            events.push(out);
        }

        let mut fields = self.schema.fields.clone();
        fields.push(field);
        Ok(EventStore::new(Schema::new(fields), events))
    }

    /// Create a new store containing only events that match `predicate`.
    ///
    /// The returned store preserves the original schema.
    pub fn filter_events<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        let events = self
            .events
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        Self {
            schema: self.schema.clone(),
            events,
        }
    }
}
