//! Derived-column producers.
//!
//! Each producer is a pure function `(store, params) -> store'` that reads
//! named input columns of an [`crate::types::EventStore`] and appends one or
//! more derived columns. The input store is never mutated, so producers
//! compose as a chain of transformations.
//!
//! Currently implemented:
//!
//! - [`jets`]: jet-lepton overlap veto masks
//! - [`scalefactors`]: calibration-backed trigger scale factors
//! - [`lorentzvectors`]: four-vector construction and quantity extraction
//! - [`masks`]: threshold cuts, mask combination, and flag-based event filters

pub mod jets;
pub mod lorentzvectors;
pub mod masks;
pub mod scalefactors;

pub use jets::{overlap_veto_mask, veto_overlapping_jets};
pub use lorentzvectors::{
    build_p4, build_p4_fixed_mass, get_eta, get_mass, get_phi, get_pt, sum_p4,
};
pub use masks::{combine_masks, cut_abs_max, cut_max, cut_min, filter_flags, MaskMode};
pub use scalefactors::{electron_trigger_sf, electron_trigger_sf_from_files, trigger_sf};

use crate::error::{AnalysisError, AnalysisResult};
use crate::kinematics::PtEtaPhiM;
use crate::types::Value;

/// Fetch a float-array cell, with a typed error naming the column.
pub(crate) fn float_list<'a>(
    row: &'a [Value],
    idx: usize,
    column: &str,
) -> AnalysisResult<&'a [f64]> {
    row[idx]
        .as_float_list()
        .ok_or_else(|| AnalysisError::ColumnType {
            column: column.to_string(),
            expected: "float list",
        })
}

/// Fetch an integer-array cell, with a typed error naming the column.
pub(crate) fn int_list<'a>(
    row: &'a [Value],
    idx: usize,
    column: &str,
) -> AnalysisResult<&'a [i64]> {
    row[idx]
        .as_int_list()
        .ok_or_else(|| AnalysisError::ColumnType {
            column: column.to_string(),
            expected: "int list",
        })
}

/// Fetch a float-scalar cell, with a typed error naming the column.
pub(crate) fn float_scalar(row: &[Value], idx: usize, column: &str) -> AnalysisResult<f64> {
    row[idx].as_f64().ok_or_else(|| AnalysisError::ColumnType {
        column: column.to_string(),
        expected: "float scalar",
    })
}

/// Fetch a four-momentum cell, with a typed error naming the column.
pub(crate) fn p4_value(row: &[Value], idx: usize, column: &str) -> AnalysisResult<PtEtaPhiM> {
    row[idx].as_p4().ok_or_else(|| AnalysisError::ColumnType {
        column: column.to_string(),
        expected: "four-momentum",
    })
}

/// Require `actual` to match the aligned length `expected` of a companion column.
pub(crate) fn check_aligned(
    column: &str,
    expected: usize,
    actual: usize,
) -> AnalysisResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(AnalysisError::LengthMismatch {
            column: column.to_string(),
            expected,
            actual,
        })
    }
}
