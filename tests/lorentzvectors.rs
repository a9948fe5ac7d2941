use std::f64::consts::PI;

use event_columns::kinematics::{DEFAULT_FLOAT, KAON_MASS};
use event_columns::producers::{
    build_p4, build_p4_fixed_mass, get_eta, get_mass, get_phi, get_pt, sum_p4,
};
use event_columns::types::{DataType, EventStore, Field, Schema, Value};

fn candidate_schema() -> Schema {
    Schema::new(vec![
        Field::new("pair", DataType::IntList),
        Field::new("cand_pt", DataType::FloatList),
        Field::new("cand_eta", DataType::FloatList),
        Field::new("cand_phi", DataType::FloatList),
        Field::new("cand_mass", DataType::FloatList),
    ])
}

fn f64_at(store: &EventStore, column: &str, event_idx: usize) -> f64 {
    let idx = store.schema.index_of(column).unwrap();
    store.events[event_idx][idx].as_f64().unwrap()
}

#[test]
fn builds_and_extracts_pair_indexed_candidates() {
    let store = EventStore::new(
        candidate_schema(),
        vec![vec![
            Value::IntList(vec![1, 0]),
            Value::FloatList(vec![20.0, 35.0]),
            Value::FloatList(vec![0.5, -1.0]),
            Value::FloatList(vec![0.1, 2.0]),
            Value::FloatList(vec![0.139, 0.139]),
        ]],
    );

    let out = build_p4(
        &store, "p4_1", "pair", "cand_pt", "cand_eta", "cand_phi", "cand_mass", 0,
    )
    .unwrap();
    let out = get_pt(&out, "pt_1", "p4_1").unwrap();
    let out = get_eta(&out, "eta_1", "p4_1").unwrap();
    let out = get_phi(&out, "phi_1", "p4_1").unwrap();
    let out = get_mass(&out, "mass_1", "p4_1").unwrap();

    // Pair position 0 points at candidate 1.
    assert_eq!(f64_at(&out, "pt_1", 0), 35.0);
    assert_eq!(f64_at(&out, "eta_1", 0), -1.0);
    assert_eq!(f64_at(&out, "phi_1", 0), 2.0);
    assert_eq!(f64_at(&out, "mass_1", 0), 0.139);
}

#[test]
fn kaon_hypothesis_replaces_the_stored_mass() {
    let store = EventStore::new(
        candidate_schema(),
        vec![vec![
            Value::IntList(vec![0]),
            Value::FloatList(vec![12.0]),
            Value::FloatList(vec![0.2]),
            Value::FloatList(vec![-1.1]),
            Value::FloatList(vec![0.139]),
        ]],
    );

    let out = build_p4_fixed_mass(
        &store, "kaon_p4", "pair", "cand_pt", "cand_eta", "cand_phi", KAON_MASS, 0,
    )
    .unwrap();
    let out = get_mass(&out, "kaon_mass", "kaon_p4").unwrap();
    let out = get_pt(&out, "kaon_pt", "kaon_p4").unwrap();

    assert_eq!(f64_at(&out, "kaon_mass", 0), KAON_MASS);
    assert_eq!(f64_at(&out, "kaon_pt", 0), 12.0);
}

#[test]
fn absent_candidates_carry_the_sentinel_through_extraction() {
    // Only one candidate: position 1 of the pair does not exist.
    let store = EventStore::new(
        candidate_schema(),
        vec![vec![
            Value::IntList(vec![0]),
            Value::FloatList(vec![50.0]),
            Value::FloatList(vec![1.5]),
            Value::FloatList(vec![-0.4]),
            Value::FloatList(vec![0.105]),
        ]],
    );

    let out = build_p4(
        &store, "p4_2", "pair", "cand_pt", "cand_eta", "cand_phi", "cand_mass", 1,
    )
    .unwrap();
    let out = get_pt(&out, "pt_2", "p4_2").unwrap();
    let out = get_eta(&out, "eta_2", "p4_2").unwrap();
    let out = get_mass(&out, "mass_2", "p4_2").unwrap();

    assert_eq!(f64_at(&out, "pt_2", 0), DEFAULT_FLOAT);
    assert_eq!(f64_at(&out, "eta_2", 0), DEFAULT_FLOAT);
    assert_eq!(f64_at(&out, "mass_2", 0), DEFAULT_FLOAT);
}

#[test]
fn back_to_back_massless_candidates_sum_to_the_system_mass() {
    // Two massless candidates with equal pt and opposite phi: the pair is at
    // rest with invariant mass 2*pt.
    let store = EventStore::new(
        candidate_schema(),
        vec![vec![
            Value::IntList(vec![0, 1]),
            Value::FloatList(vec![30.0, 30.0]),
            Value::FloatList(vec![0.0, 0.0]),
            Value::FloatList(vec![0.0, PI]),
            Value::FloatList(vec![0.0, 0.0]),
        ]],
    );

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
    let out = get_pt(&out, "system_pt", "system_p4").unwrap();

    assert!((f64_at(&out, "system_mass", 0) - 60.0).abs() < 1e-6);
    assert!(f64_at(&out, "system_pt", 0).abs() < 1e-6);
}
