//! Selection-mask producers and flag-based event filtering.
//!
//! Masks are 0/1 `IntList` columns aligned with the object arrays they were
//! cut from. Individual kinematic cuts each produce a mask; masks are then
//! combined into the final object selection.

use crate::error::AnalysisResult;
use crate::types::{DataType, EventStore, Field, Value};

use super::{check_aligned, float_list, int_list};

/// How several masks or flags are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskMode {
    /// An object/event passes when every input passes.
    AllOf,
    /// An object/event passes when at least one input passes.
    AnyOf,
}

/// Append a mask selecting objects with `value >= threshold`.
pub fn cut_min(
    store: &EventStore,
    output: &str,
    input: &str,
    threshold: f64,
) -> AnalysisResult<EventStore> {
    threshold_mask(store, output, input, move |v| v >= threshold)
}

/// Append a mask selecting objects with `value <= threshold`.
pub fn cut_max(
    store: &EventStore,
    output: &str,
    input: &str,
    threshold: f64,
) -> AnalysisResult<EventStore> {
    threshold_mask(store, output, input, move |v| v <= threshold)
}

/// Append a mask selecting objects with `|value| <= threshold`.
///
/// The usual acceptance cut on pseudorapidity.
pub fn cut_abs_max(
    store: &EventStore,
    output: &str,
    input: &str,
    threshold: f64,
) -> AnalysisResult<EventStore> {
    threshold_mask(store, output, input, move |v| v.abs() <= threshold)
}

fn threshold_mask(
    store: &EventStore,
    output: &str,
    input: &str,
    pass: impl Fn(f64) -> bool,
) -> AnalysisResult<EventStore> {
    let input_idx = store.column_index(input)?;
    store.define(Field::new(output, DataType::IntList), |row| {
        let values = float_list(row, input_idx, input)?;
        Ok(Value::IntList(
            values.iter().map(|&v| i64::from(pass(v))).collect(),
        ))
    })
}

/// Append the element-wise combination of several masks.
///
/// All input masks of one event must have the same length; a mismatch fails
/// the definition with [`crate::error::AnalysisError::LengthMismatch`].
pub fn combine_masks(
    store: &EventStore,
    output: &str,
    inputs: &[&str],
    mode: MaskMode,
) -> AnalysisResult<EventStore> {
    if inputs.is_empty() {
        return Err(crate::error::AnalysisError::SchemaMismatch {
            message: format!("combine_masks for '{output}' needs at least one input mask"),
        });
    }
    let mut input_idxs = Vec::with_capacity(inputs.len());
    for input in inputs {
        input_idxs.push(store.column_index(input)?);
    }

    store.define(Field::new(output, DataType::IntList), |row| {
        let first = int_list(row, input_idxs[0], inputs[0])?;
        let mut combined: Vec<i64> = first.iter().map(|&v| i64::from(v != 0)).collect();

        for (&idx, input) in input_idxs.iter().zip(inputs).skip(1) {
            let mask = int_list(row, idx, input)?;
            check_aligned(input, combined.len(), mask.len())?;
            for (acc, &v) in combined.iter_mut().zip(mask) {
                let passes = i64::from(v != 0);
                *acc = match mode {
                    MaskMode::AllOf => *acc & passes,
                    MaskMode::AnyOf => *acc | passes,
                };
            }
        }
        Ok(Value::IntList(combined))
    })
}

/// Keep only events whose 0/1 scalar flag columns pass in the given mode.
pub fn filter_flags(
    store: &EventStore,
    flags: &[&str],
    mode: MaskMode,
) -> AnalysisResult<EventStore> {
    let mut flag_idxs = Vec::with_capacity(flags.len());
    for flag in flags {
        flag_idxs.push(store.column_index(flag)?);
    }

    Ok(store.filter_events(|row| {
        let passes = |&idx: &usize| matches!(row[idx], Value::Int64(v) if v != 0);
        match mode {
            MaskMode::AllOf => flag_idxs.iter().all(passes),
            MaskMode::AnyOf => flag_idxs.iter().any(passes),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::{combine_masks, cut_abs_max, cut_min, filter_flags, MaskMode};
    use crate::error::AnalysisError;
    use crate::types::{DataType, EventStore, Field, Schema, Value};

    fn electron_store() -> EventStore {
        let schema = Schema::new(vec![
            Field::new("el_pt", DataType::FloatList),
            Field::new("el_eta", DataType::FloatList),
        ]);
        let events = vec![vec![
            Value::FloatList(vec![35.0, 12.0, 60.0]),
            Value::FloatList(vec![0.3, -2.8, 1.9]),
        ]];
        EventStore::new(schema, events)
    }

    #[test]
    fn threshold_cuts_produce_aligned_masks() {
        let store = electron_store();
        let out = cut_min(&store, "pt_mask", "el_pt", 20.0).unwrap();
        let out = cut_abs_max(&out, "eta_mask", "el_eta", 2.5).unwrap();

        let pt_idx = out.schema.index_of("pt_mask").unwrap();
        let eta_idx = out.schema.index_of("eta_mask").unwrap();
        assert_eq!(out.events[0][pt_idx], Value::IntList(vec![1, 0, 1]));
        assert_eq!(out.events[0][eta_idx], Value::IntList(vec![1, 0, 1]));
    }

    #[test]
    fn combine_all_of_intersects_masks() {
        let store = electron_store();
        let out = cut_min(&store, "pt_mask", "el_pt", 50.0).unwrap();
        let out = cut_abs_max(&out, "eta_mask", "el_eta", 2.5).unwrap();
        let out = combine_masks(&out, "good", &["pt_mask", "eta_mask"], MaskMode::AllOf).unwrap();

        let good_idx = out.schema.index_of("good").unwrap();
        assert_eq!(out.events[0][good_idx], Value::IntList(vec![0, 0, 1]));
    }

    #[test]
    fn combine_any_of_unions_masks() {
        let store = electron_store();
        let out = cut_min(&store, "pt_mask", "el_pt", 50.0).unwrap();
        let out = cut_abs_max(&out, "eta_mask", "el_eta", 2.5).unwrap();
        let out = combine_masks(&out, "loose", &["pt_mask", "eta_mask"], MaskMode::AnyOf).unwrap();

        let loose_idx = out.schema.index_of("loose").unwrap();
        assert_eq!(out.events[0][loose_idx], Value::IntList(vec![1, 0, 1]));
    }

    #[test]
    fn combine_rejects_misaligned_masks() {
        let schema = Schema::new(vec![
            Field::new("a", DataType::IntList),
            Field::new("b", DataType::IntList),
        ]);
        let store = EventStore::new(
            schema,
            vec![vec![Value::IntList(vec![1, 0]), Value::IntList(vec![1])]],
        );
        let err = combine_masks(&store, "c", &["a", "b"], MaskMode::AllOf).unwrap_err();
        assert!(matches!(err, AnalysisError::LengthMismatch { .. }));
    }

    #[test]
    fn filter_flags_selects_events() {
        let schema = Schema::new(vec![
            Field::new("good_pair", DataType::Int64),
            Field::new("trigger_fired", DataType::Int64),
        ]);
        let store = EventStore::new(
            schema,
            vec![
                vec![Value::Int64(1), Value::Int64(0)],
                vec![Value::Int64(1), Value::Int64(1)],
                vec![Value::Int64(0), Value::Int64(0)],
            ],
        );

        let all = filter_flags(&store, &["good_pair", "trigger_fired"], MaskMode::AllOf).unwrap();
        assert_eq!(all.event_count(), 1);

        let any = filter_flags(&store, &["good_pair", "trigger_fired"], MaskMode::AnyOf).unwrap();
        assert_eq!(any.event_count(), 2);
    }
}
