//! Trigger scale-factor producers.
//!
//! Scale factors come in a nominal value plus a symmetric systematic shift:
//! `up = nominal + systematic`, `down = nominal - systematic`, all evaluated
//! at the event's `(eta, pt)`. A negative `pt` is the "object absent" sentinel
//! and yields 1.0 for all three outputs without touching the evaluators, since
//! lookup tables are not guaranteed valid outside the physical domain.

use std::sync::Arc;

use crate::calibration::{CorrectionSet, ScaleFactorEvaluator};
use crate::error::AnalysisResult;
use crate::types::{DataType, EventStore, Field, Value};

use super::float_scalar;

/// Nominal, up, and down scale factors for one object.
///
/// Returns `(1.0, 1.0, 1.0)` without evaluator calls when `pt < 0`.
pub fn trigger_sf(
    pt: f64,
    eta: f64,
    nominal: &dyn ScaleFactorEvaluator,
    systematic: &dyn ScaleFactorEvaluator,
) -> (f64, f64, f64) {
    if pt < 0.0 {
        return (1.0, 1.0, 1.0);
    }
    let nom = nominal.evaluate(eta, pt);
    let syst = systematic.evaluate(eta, pt);
    (nom, nom + syst, nom - syst)
}

/// Append nominal/up/down electron trigger scale-factor columns.
///
/// Reads scalar `pt` and `eta` columns and defines three `Float64` columns.
/// Each column is defined independently, so the nominal evaluator runs once
/// for the nominal column and once inside each shifted column.
#[allow(clippy::too_many_arguments)]
pub fn electron_trigger_sf(
    store: &EventStore,
    nominal_output: &str,
    up_output: &str,
    down_output: &str,
    pt: &str,
    eta: &str,
    nominal: Arc<dyn ScaleFactorEvaluator>,
    systematic: Arc<dyn ScaleFactorEvaluator>,
) -> AnalysisResult<EventStore> {
    let pt_idx = store.column_index(pt)?;
    let eta_idx = store.column_index(eta)?;

    let nominal_for_nom = Arc::clone(&nominal);
    let with_nom = store.define(Field::new(nominal_output, DataType::Float64), |row| {
        let pt_v = float_scalar(row, pt_idx, pt)?;
        let eta_v = float_scalar(row, eta_idx, eta)?;
        let sf = if pt_v >= 0.0 {
            nominal_for_nom.evaluate(eta_v, pt_v)
        } else {
            1.0
        };
        Ok(Value::Float64(sf))
    })?;

    let nominal_for_up = Arc::clone(&nominal);
    let systematic_for_up = Arc::clone(&systematic);
    let with_up = with_nom.define(Field::new(up_output, DataType::Float64), |row| {
        let pt_v = float_scalar(row, pt_idx, pt)?;
        let eta_v = float_scalar(row, eta_idx, eta)?;
        let sf = if pt_v >= 0.0 {
            nominal_for_up.evaluate(eta_v, pt_v) + systematic_for_up.evaluate(eta_v, pt_v)
        } else {
            1.0
        };
        Ok(Value::Float64(sf))
    })?;

    with_up.define(Field::new(down_output, DataType::Float64), |row| {
        let pt_v = float_scalar(row, pt_idx, pt)?;
        let eta_v = float_scalar(row, eta_idx, eta)?;
        let sf = if pt_v >= 0.0 {
            nominal.evaluate(eta_v, pt_v) - systematic.evaluate(eta_v, pt_v)
        } else {
            1.0
        };
        Ok(Value::Float64(sf))
    })
}

/// [`electron_trigger_sf`] with evaluators resolved from calibration files.
///
/// Loads each correction set and looks up the named algorithm; any resolution
/// failure is a fatal [`crate::error::AnalysisError::Configuration`] raised
/// here at setup time, never per event.
#[allow(clippy::too_many_arguments)]
pub fn electron_trigger_sf_from_files(
    store: &EventStore,
    nominal_output: &str,
    up_output: &str,
    down_output: &str,
    pt: &str,
    eta: &str,
    nominal_file: &str,
    nominal_algorithm: &str,
    systematic_file: &str,
    systematic_algorithm: &str,
) -> AnalysisResult<EventStore> {
    let nominal = CorrectionSet::from_path(nominal_file)?.at(nominal_algorithm)?;
    let systematic = CorrectionSet::from_path(systematic_file)?.at(systematic_algorithm)?;
    electron_trigger_sf(
        store,
        nominal_output,
        up_output,
        down_output,
        pt,
        eta,
        nominal,
        systematic,
    )
}
