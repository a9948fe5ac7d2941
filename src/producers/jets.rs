//! Jet cleaning producers.

use crate::error::AnalysisResult;
use crate::kinematics::delta_r;
use crate::types::{DataType, EventStore, Field, Value};

use super::{check_aligned, float_list, int_list};

/// Per-event overlap-veto mask over jets.
///
/// Returns a 0/1 mask of the same length as `jet_eta`, initialized to 1
/// (keep). A jet is set to 0 when any lepton selected by `loose_lepton_mask`
/// lies within `delta_r_min` of it in eta-phi space; the first match wins and
/// later leptons are not checked. With no selected leptons the all-ones mask
/// is returned without any distance computation.
///
/// Callers are responsible for index alignment of the input slices; the
/// store-level wrapper [`veto_overlapping_jets`] validates lengths per event.
pub fn overlap_veto_mask(
    jet_eta: &[f64],
    jet_phi: &[f64],
    loose_lepton_mask: &[i64],
    lepton_eta: &[f64],
    lepton_phi: &[f64],
    delta_r_min: f64,
) -> Vec<i64> {
    let mut mask = vec![1i64; jet_eta.len()];

    let selected: Vec<usize> = loose_lepton_mask
        .iter()
        .enumerate()
        .filter(|&(_, &flag)| flag != 0)
        .map(|(i, _)| i)
        .collect();
    if selected.is_empty() {
        return mask;
    }

    for (jet, keep) in mask.iter_mut().enumerate() {
        for &lepton in &selected {
            let dr = delta_r(
                jet_eta[jet],
                jet_phi[jet],
                lepton_eta[lepton],
                lepton_phi[lepton],
            );
            if dr < delta_r_min {
                *keep = 0;
                break;
            }
        }
    }

    mask
}

/// Append a jet-lepton overlap-veto mask column.
///
/// Per event, reads the jet and lepton eta/phi arrays plus the loose-lepton
/// selection mask and produces an `IntList` column named `output`: 1 for jets
/// to keep, 0 for jets within `delta_r_min` of a selected lepton.
///
/// Misaligned array lengths within one event fail the definition with
/// [`crate::error::AnalysisError::LengthMismatch`].
#[allow(clippy::too_many_arguments)]
pub fn veto_overlapping_jets(
    store: &EventStore,
    output: &str,
    jet_eta: &str,
    jet_phi: &str,
    loose_lepton_mask: &str,
    lepton_eta: &str,
    lepton_phi: &str,
    delta_r_min: f64,
) -> AnalysisResult<EventStore> {
    let jet_eta_idx = store.column_index(jet_eta)?;
    let jet_phi_idx = store.column_index(jet_phi)?;
    let mask_idx = store.column_index(loose_lepton_mask)?;
    let lepton_eta_idx = store.column_index(lepton_eta)?;
    let lepton_phi_idx = store.column_index(lepton_phi)?;

    store.define(Field::new(output, DataType::IntList), |row| {
        let jet_etas = float_list(row, jet_eta_idx, jet_eta)?;
        let jet_phis = float_list(row, jet_phi_idx, jet_phi)?;
        let lepton_mask = int_list(row, mask_idx, loose_lepton_mask)?;
        let lepton_etas = float_list(row, lepton_eta_idx, lepton_eta)?;
        let lepton_phis = float_list(row, lepton_phi_idx, lepton_phi)?;

        check_aligned(jet_phi, jet_etas.len(), jet_phis.len())?;
        check_aligned(lepton_phi, lepton_etas.len(), lepton_phis.len())?;
        check_aligned(loose_lepton_mask, lepton_etas.len(), lepton_mask.len())?;

        Ok(Value::IntList(overlap_veto_mask(
            jet_etas,
            jet_phis,
            lepton_mask,
            lepton_etas,
            lepton_phis,
            delta_r_min,
        )))
    })
}
