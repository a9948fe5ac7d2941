//! Four-vector construction and quantity extraction.
//!
//! Objects are addressed indirectly: a pair-index column stores, per event,
//! the indices of the selected objects inside the kinematic arrays, and
//! `position` picks which entry of the pair to build. Absent objects (pair
//! position or object index out of range) degrade to the all-sentinel dummy
//! vector instead of failing the event, so events with fewer objects than the
//! pair expects flow through the chain.

use crate::error::AnalysisResult;
use crate::kinematics::PtEtaPhiM;
use crate::types::{DataType, EventStore, Field, Value};

use super::{check_aligned, float_list, int_list, p4_value};

/// Append a four-momentum column built from pair-indexed object arrays.
///
/// Per event, looks up `pair[position]` and builds a (pt, eta, phi, mass)
/// vector from the object arrays at that index. Out-of-range lookups yield
/// [`PtEtaPhiM::dummy`].
#[allow(clippy::too_many_arguments)]
pub fn build_p4(
    store: &EventStore,
    output: &str,
    pair: &str,
    pts: &str,
    etas: &str,
    phis: &str,
    masses: &str,
    position: usize,
) -> AnalysisResult<EventStore> {
    build_p4_impl(store, output, pair, pts, etas, phis, Some(masses), None, position)
}

/// [`build_p4`] with a caller-fixed mass instead of a mass column.
///
/// Used when the stored mass hypothesis is known to be wrong for the object
/// class, e.g. kaon candidates carrying the default pion mass.
#[allow(clippy::too_many_arguments)]
pub fn build_p4_fixed_mass(
    store: &EventStore,
    output: &str,
    pair: &str,
    pts: &str,
    etas: &str,
    phis: &str,
    mass: f64,
    position: usize,
) -> AnalysisResult<EventStore> {
    build_p4_impl(store, output, pair, pts, etas, phis, None, Some(mass), position)
}

#[allow(clippy::too_many_arguments)]
fn build_p4_impl(
    store: &EventStore,
    output: &str,
    pair: &str,
    pts: &str,
    etas: &str,
    phis: &str,
    masses: Option<&str>,
    fixed_mass: Option<f64>,
    position: usize,
) -> AnalysisResult<EventStore> {
    let pair_idx = store.column_index(pair)?;
    let pts_idx = store.column_index(pts)?;
    let etas_idx = store.column_index(etas)?;
    let phis_idx = store.column_index(phis)?;
    let masses_idx = match masses {
        Some(name) => Some(store.column_index(name)?),
        None => None,
    };

    store.define(Field::new(output, DataType::P4), |row| {
        let pair_v = int_list(row, pair_idx, pair)?;
        let pts_v = float_list(row, pts_idx, pts)?;
        let etas_v = float_list(row, etas_idx, etas)?;
        let phis_v = float_list(row, phis_idx, phis)?;

        check_aligned(etas, pts_v.len(), etas_v.len())?;
        check_aligned(phis, pts_v.len(), phis_v.len())?;

        let masses_v = match (masses_idx, masses) {
            (Some(idx), Some(name)) => {
                let m = float_list(row, idx, name)?;
                check_aligned(name, pts_v.len(), m.len())?;
                Some(m)
            }
            _ => None,
        };

        let p4 = match pair_v.get(position) {
            Some(&object) if object >= 0 && (object as usize) < pts_v.len() => {
                let object = object as usize;
                let mass = match (masses_v, fixed_mass) {
                    (Some(m), _) => m[object],
                    (None, Some(fixed)) => fixed,
                    (None, None) => unreachable!("either a mass column or a fixed mass is set"),
                };
                PtEtaPhiM::new(pts_v[object], etas_v[object], phis_v[object], mass)
            }
            _ => PtEtaPhiM::dummy(),
        };
        Ok(Value::P4(p4))
    })
}

/// Append the transverse momentum of a four-momentum column.
pub fn get_pt(store: &EventStore, output: &str, p4: &str) -> AnalysisResult<EventStore> {
    extract_quantity(store, output, p4, |v| v.pt)
}

/// Append the pseudorapidity of a four-momentum column.
pub fn get_eta(store: &EventStore, output: &str, p4: &str) -> AnalysisResult<EventStore> {
    extract_quantity(store, output, p4, |v| v.eta)
}

/// Append the azimuthal angle of a four-momentum column.
pub fn get_phi(store: &EventStore, output: &str, p4: &str) -> AnalysisResult<EventStore> {
    extract_quantity(store, output, p4, |v| v.phi)
}

/// Append the invariant mass of a four-momentum column.
pub fn get_mass(store: &EventStore, output: &str, p4: &str) -> AnalysisResult<EventStore> {
    extract_quantity(store, output, p4, |v| v.mass)
}

fn extract_quantity(
    store: &EventStore,
    output: &str,
    p4: &str,
    quantity: impl Fn(PtEtaPhiM) -> f64,
) -> AnalysisResult<EventStore> {
    let p4_idx = store.column_index(p4)?;
    store.define(Field::new(output, DataType::Float64), |row| {
        Ok(Value::Float64(quantity(p4_value(row, p4_idx, p4)?)))
    })
}

/// Append the four-momentum sum of several constituent columns.
///
/// Components are added in cartesian coordinates; the result carries the
/// invariant mass of the combined system (e.g. a Higgs candidate built from
/// its daughters).
pub fn sum_p4(store: &EventStore, output: &str, parts: &[&str]) -> AnalysisResult<EventStore> {
    let mut part_idxs = Vec::with_capacity(parts.len());
    for part in parts {
        part_idxs.push(store.column_index(part)?);
    }

    store.define(Field::new(output, DataType::P4), |row| {
        let mut px = 0.0;
        let mut py = 0.0;
        let mut pz = 0.0;
        let mut e = 0.0;
        for (&idx, part) in part_idxs.iter().zip(parts) {
            let p = p4_value(row, idx, part)?;
            px += p.px();
            py += p.py();
            pz += p.pz();
            e += p.energy();
        }
        Ok(Value::P4(PtEtaPhiM::from_cartesian(px, py, pz, e)))
    })
}

#[cfg(test)]
mod tests {
    use super::{build_p4, build_p4_fixed_mass, get_mass, get_pt, sum_p4};
    use crate::kinematics::{PtEtaPhiM, DEFAULT_FLOAT, KAON_MASS};
    use crate::types::{DataType, EventStore, Field, Schema, Value};

    fn candidate_store() -> EventStore {
        let schema = Schema::new(vec![
            Field::new("pair", DataType::IntList),
            Field::new("cand_pt", DataType::FloatList),
            Field::new("cand_eta", DataType::FloatList),
            Field::new("cand_phi", DataType::FloatList),
            Field::new("cand_mass", DataType::FloatList),
        ]);
        let events = vec![
            // Pair points at candidates 1 and 0.
            vec![
                Value::IntList(vec![1, 0]),
                Value::FloatList(vec![20.0, 35.0]),
                Value::FloatList(vec![0.5, -1.0]),
                Value::FloatList(vec![0.1, 2.0]),
                Value::FloatList(vec![0.139, 0.139]),
            ],
            // Pair has only one entry; position 1 is absent.
            vec![
                Value::IntList(vec![0]),
                Value::FloatList(vec![50.0]),
                Value::FloatList(vec![1.5]),
                Value::FloatList(vec![-0.4]),
                Value::FloatList(vec![0.105]),
            ],
        ];
        EventStore::new(schema, events)
    }

    #[test]
    fn builds_the_pair_indexed_candidate() {
        let store = candidate_store();
        let out = build_p4(
            &store, "p4_1", "pair", "cand_pt", "cand_eta", "cand_phi", "cand_mass", 0,
        )
        .unwrap();
        let p4_idx = out.schema.index_of("p4_1").unwrap();
        let p4 = out.events[0][p4_idx].as_p4().unwrap();
        assert_eq!(p4, PtEtaPhiM::new(35.0, -1.0, 2.0, 0.139));
    }

    #[test]
    fn out_of_range_positions_build_the_dummy_vector() {
        let store = candidate_store();
        let out = build_p4(
            &store, "p4_2", "pair", "cand_pt", "cand_eta", "cand_phi", "cand_mass", 1,
        )
        .unwrap();
        let p4_idx = out.schema.index_of("p4_2").unwrap();
        // Second event's pair has no entry at position 1.
        let p4 = out.events[1][p4_idx].as_p4().unwrap();
        assert!(p4.is_dummy());
        // First event is fine at position 1.
        assert!(!out.events[0][p4_idx].as_p4().unwrap().is_dummy());
    }

    #[test]
    fn out_of_range_object_index_builds_the_dummy_vector() {
        let mut store = candidate_store();
        // Pair index points past the candidate arrays.
        store.events[0][0] = Value::IntList(vec![7]);
        let out = build_p4(
            &store, "p4_1", "pair", "cand_pt", "cand_eta", "cand_phi", "cand_mass", 0,
        )
        .unwrap();
        let p4_idx = out.schema.index_of("p4_1").unwrap();
        assert!(out.events[0][p4_idx].as_p4().unwrap().is_dummy());
    }

    #[test]
    fn fixed_mass_overrides_the_stored_hypothesis() {
        let store = candidate_store();
        let out = build_p4_fixed_mass(
            &store, "kaon_p4", "pair", "cand_pt", "cand_eta", "cand_phi", KAON_MASS, 0,
        )
        .unwrap();
        let p4_idx = out.schema.index_of("kaon_p4").unwrap();
        let p4 = out.events[0][p4_idx].as_p4().unwrap();
        assert_eq!(p4.mass, KAON_MASS);
        assert_eq!(p4.pt, 35.0);
    }

    #[test]
    fn quantity_extraction_propagates_the_sentinel() {
        let store = candidate_store();
        let out = build_p4(
            &store, "p4_2", "pair", "cand_pt", "cand_eta", "cand_phi", "cand_mass", 1,
        )
        .unwrap();
        let out = get_pt(&out, "pt_2", "p4_2").unwrap();
        let pt_idx = out.schema.index_of("pt_2").unwrap();
        assert_eq!(out.events[1][pt_idx], Value::Float64(DEFAULT_FLOAT));
    }

    #[test]
    fn summed_p4_carries_the_system_mass() {
        let store = candidate_store();
        let out = build_p4(
            &store, "p4_1", "pair", "cand_pt", "cand_eta", "cand_phi", "cand_mass", 0,
        )
        .unwrap();
        let out = build_p4(
            &out, "p4_2", "pair", "cand_pt", "cand_eta", "cand_phi", "cand_mass", 1,
        )
        .unwrap();
        let out = sum_p4(&out, "system_p4", &["p4_1", "p4_2"]).unwrap();
        let out = get_mass(&out, "system_mass", "system_p4").unwrap();

        let mass_idx = out.schema.index_of("system_mass").unwrap();
        let mass = out.events[0][mass_idx].as_f64().unwrap();
        // Two well-separated candidates give a sizable invariant mass.
        assert!(mass > 10.0);
    }
}
