//! `event-columns` is a small library for columnar event analysis: it loads
//! event data into an in-memory [`types::EventStore`] using a user-provided
//! [`types::Schema`], then appends derived columns with physics
//! [`producers`].
//!
//! One row of the store is one event. List-typed columns hold the per-object
//! arrays of that event (jet etas, lepton phis, selection masks, ...),
//! index-aligned across columns of the same collection. The store is
//! immutable; every producer returns a new store with columns appended, so an
//! analysis is a chain of column-producing transformations.
//!
//! ## Loading events
//!
//! Event tables come from CSV, JSON/NDJSON, or Parquet files via
//! [`ingestion::load_events_from_path`] (auto-detected by extension). JSON
//! groups map to dot-path field names:
//!
//! ```no_run
//! use event_columns::ingestion::{load_events_from_path, LoadOptions};
//! use event_columns::types::{DataType, Field, Schema};
//!
//! # fn main() -> Result<(), event_columns::AnalysisError> {
//! let schema = Schema::new(vec![
//!     Field::new("jet.eta", DataType::FloatList),
//!     Field::new("jet.phi", DataType::FloatList),
//!     Field::new("lepton.loose_mask", DataType::IntList),
//! ]);
//! let store = load_events_from_path("events.json", &schema, &LoadOptions::default())?;
//! println!("events={}", store.event_count());
//! # Ok(())
//! # }
//! ```
//!
//! ## Producers
//!
//! ```rust
//! use event_columns::producers::veto_overlapping_jets;
//! use event_columns::types::{DataType, EventStore, Field, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Field::new("jet_eta", DataType::FloatList),
//!     Field::new("jet_phi", DataType::FloatList),
//!     Field::new("lep_eta", DataType::FloatList),
//!     Field::new("lep_phi", DataType::FloatList),
//!     Field::new("loose_mask", DataType::IntList),
//! ]);
//! let store = EventStore::new(
//!     schema,
//!     vec![vec![
//!         Value::FloatList(vec![0.0, 2.0]),
//!         Value::FloatList(vec![0.0, 0.0]),
//!         Value::FloatList(vec![0.05]),
//!         Value::FloatList(vec![0.0]),
//!         Value::IntList(vec![1]),
//!     ]],
//! );
//!
//! let out = veto_overlapping_jets(
//!     &store, "jet_veto_mask",
//!     "jet_eta", "jet_phi", "loose_mask", "lep_eta", "lep_phi",
//!     0.4,
//! )
//! .unwrap();
//!
//! let mask_idx = out.schema.index_of("jet_veto_mask").unwrap();
//! assert_eq!(out.events[0][mask_idx], Value::IntList(vec![0, 1]));
//! ```
//!
//! Scale factors read calibration tables through the
//! [`calibration::ScaleFactorEvaluator`] seam; concrete evaluators come from
//! a [`calibration::CorrectionSet`] loaded once at setup time and shared
//! read-only across threads:
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use event_columns::calibration::ScaleFactorEvaluator;
//! use event_columns::producers::electron_trigger_sf;
//! use event_columns::types::{DataType, EventStore, Field, Schema, Value};
//!
//! struct FlatSf(f64);
//! impl ScaleFactorEvaluator for FlatSf {
//!     fn evaluate(&self, _eta: f64, _pt: f64) -> f64 {
//!         self.0
//!     }
//! }
//!
//! let schema = Schema::new(vec![
//!     Field::new("pt", DataType::Float64),
//!     Field::new("eta", DataType::Float64),
//! ]);
//! let store = EventStore::new(
//!     schema,
//!     vec![
//!         vec![Value::Float64(42.0), Value::Float64(1.1)],
//!         vec![Value::Float64(-1.0), Value::Float64(1.5)],
//!     ],
//! );
//!
//! let out = electron_trigger_sf(
//!     &store, "sf", "sf_up", "sf_down", "pt", "eta",
//!     Arc::new(FlatSf(0.95)),
//!     Arc::new(FlatSf(0.02)),
//! )
//! .unwrap();
//!
//! let sf_idx = out.schema.index_of("sf").unwrap();
//! let up_idx = out.schema.index_of("sf_up").unwrap();
//! assert_eq!(out.events[0][sf_idx], Value::Float64(0.95));
//! assert_eq!(out.events[0][up_idx], Value::Float64(0.97));
//! // pt < 0 is the "object absent" sentinel: all three outputs default to 1.0.
//! assert_eq!(out.events[1][sf_idx], Value::Float64(1.0));
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: unified event loading and format-specific implementations
//! - [`types`]: schema + in-memory event store
//! - [`producers`]: derived-column operators (veto masks, scale factors,
//!   four-vectors, selection masks)
//! - [`calibration`]: correction-set loading and the evaluator seam
//! - [`kinematics`]: four-momentum math and angular distances
//! - [`execution`]: chunked parallel evaluation with metrics and throttling
//! - [`error`]: error types used across the crate

pub mod calibration;
pub mod error;
pub mod execution;
pub mod ingestion;
pub mod kinematics;
pub mod producers;
pub mod types;

pub use error::{AnalysisError, AnalysisResult};
