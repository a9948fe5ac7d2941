//! Calibration lookup tables for scale-factor producers.
//!
//! A [`CorrectionSet`] is loaded once from a JSON resource at analysis setup
//! time and holds named [`Correction`]s, each a 2-D binned grid over
//! (eta, pt). Resolution failures (missing file, malformed content, unknown
//! algorithm key) are [`AnalysisError::Configuration`] and abort setup;
//! per-event evaluation never fails.
//!
//! Expected resource layout:
//!
//! ```json
//! {
//!   "corrections": [
//!     {
//!       "name": "trigger_eff_nominal",
//!       "axes": [
//!         { "name": "eta", "edges": [-2.5, 0.0, 2.5] },
//!         { "name": "pt", "edges": [20.0, 40.0, 100.0] }
//!       ],
//!       "values": [[0.90, 0.95], [0.92, 0.97]]
//!     }
//!   ]
//! }
//! ```
//!
//! `values[i][j]` is the scale factor for eta bin `i` and pt bin `j`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{AnalysisError, AnalysisResult};

/// An opaque `(eta, pt) -> scale factor` capability.
///
/// Implementations must be immutable after construction so that one evaluator
/// can be shared read-only across worker threads.
pub trait ScaleFactorEvaluator: Send + Sync {
    /// Evaluate the scale factor at `(eta, pt)`.
    fn evaluate(&self, eta: f64, pt: f64) -> f64;
}

#[derive(Debug, Deserialize)]
struct RawCorrectionSet {
    corrections: Vec<RawCorrection>,
}

#[derive(Debug, Deserialize)]
struct RawCorrection {
    name: String,
    axes: Vec<RawAxis>,
    values: Vec<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
struct RawAxis {
    name: String,
    edges: Vec<f64>,
}

/// One binned axis of a [`Correction`].
#[derive(Debug, Clone, PartialEq)]
struct Axis {
    name: String,
    edges: Vec<f64>,
}

impl Axis {
    /// Bin index for `v`, clamped to the outermost bins.
    ///
    /// Out-of-domain lookups are therefore answered with the nearest edge bin
    /// rather than an error; callers that need stricter domains must cut
    /// upstream.
    fn find_bin(&self, v: f64) -> usize {
        let last_bin = self.edges.len() - 2;
        if v < self.edges[0] {
            return 0;
        }
        for i in 0..=last_bin {
            if v < self.edges[i + 1] {
                return i;
            }
        }
        last_bin
    }

    fn bin_count(&self) -> usize {
        self.edges.len() - 1
    }
}

/// A single named 2-D binned correction over (eta, pt).
#[derive(Debug, Clone, PartialEq)]
pub struct Correction {
    name: String,
    eta_axis: Axis,
    pt_axis: Axis,
    values: Vec<Vec<f64>>,
}

impl Correction {
    /// Name of this correction inside its set.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ScaleFactorEvaluator for Correction {
    fn evaluate(&self, eta: f64, pt: f64) -> f64 {
        let i = self.eta_axis.find_bin(eta);
        let j = self.pt_axis.find_bin(pt);
        self.values[i][j]
    }
}

/// A set of named corrections loaded from one calibration resource.
#[derive(Debug, Clone)]
pub struct CorrectionSet {
    resource: String,
    corrections: HashMap<String, Arc<Correction>>,
}

impl CorrectionSet {
    /// Load a correction set from a JSON file.
    ///
    /// A missing or unreadable file is an [`AnalysisError::Configuration`].
    pub fn from_path(path: impl AsRef<Path>) -> AnalysisResult<Self> {
        let path = path.as_ref();
        let resource = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|e| AnalysisError::Configuration {
            resource: resource.clone(),
            message: format!("cannot read calibration file: {e}"),
        })?;
        Self::from_str_named(&text, &resource)
    }

    /// Parse a correction set from in-memory JSON, labelled by `resource` in errors.
    pub fn from_str_named(input: &str, resource: &str) -> AnalysisResult<Self> {
        let raw: RawCorrectionSet =
            serde_json::from_str(input).map_err(|e| AnalysisError::Configuration {
                resource: resource.to_string(),
                message: format!("invalid calibration json: {e}"),
            })?;

        let mut corrections = HashMap::with_capacity(raw.corrections.len());
        for rc in raw.corrections {
            let correction = validate_correction(rc, resource)?;
            corrections.insert(correction.name.clone(), Arc::new(correction));
        }

        Ok(Self {
            resource: resource.to_string(),
            corrections,
        })
    }

    /// Resolve a correction by algorithm name.
    ///
    /// Unknown keys are an [`AnalysisError::Configuration`].
    pub fn at(&self, name: &str) -> AnalysisResult<Arc<Correction>> {
        self.corrections
            .get(name)
            .cloned()
            .ok_or_else(|| AnalysisError::Configuration {
                resource: self.resource.clone(),
                message: format!("no correction named '{name}' in set"),
            })
    }

    /// Names of all corrections in this set, in arbitrary order.
    pub fn correction_names(&self) -> impl Iterator<Item = &str> {
        self.corrections.keys().map(|s| s.as_str())
    }
}

fn validate_correction(rc: RawCorrection, resource: &str) -> AnalysisResult<Correction> {
    let config_err = |message: String| AnalysisError::Configuration {
        resource: resource.to_string(),
        message,
    };

    if rc.axes.len() != 2 {
        return Err(config_err(format!(
            "correction '{}' must have exactly 2 axes, found {}",
            rc.name,
            rc.axes.len()
        )));
    }

    let mut axes = rc.axes.into_iter();
    let eta_axis = validate_axis(axes.next().unwrap(), &rc.name, resource)?;
    let pt_axis = validate_axis(axes.next().unwrap(), &rc.name, resource)?;

    if rc.values.len() != eta_axis.bin_count() {
        return Err(config_err(format!(
            "correction '{}': {} value rows for {} '{}' bins",
            rc.name,
            rc.values.len(),
            eta_axis.bin_count(),
            eta_axis.name
        )));
    }
    for row in &rc.values {
        if row.len() != pt_axis.bin_count() {
            return Err(config_err(format!(
                "correction '{}': {} value columns for {} '{}' bins",
                rc.name,
                row.len(),
                pt_axis.bin_count(),
                pt_axis.name
            )));
        }
    }

    Ok(Correction {
        name: rc.name,
        eta_axis,
        pt_axis,
        values: rc.values,
    })
}

fn validate_axis(raw: RawAxis, correction: &str, resource: &str) -> AnalysisResult<Axis> {
    if raw.edges.len() < 2 {
        return Err(AnalysisError::Configuration {
            resource: resource.to_string(),
            message: format!(
                "correction '{correction}': axis '{}' needs at least 2 edges",
                raw.name
            ),
        });
    }
    if !raw.edges.windows(2).all(|w| w[0] < w[1]) {
        return Err(AnalysisError::Configuration {
            resource: resource.to_string(),
            message: format!(
                "correction '{correction}': axis '{}' edges must be strictly increasing",
                raw.name
            ),
        });
    }
    Ok(Axis {
        name: raw.name,
        edges: raw.edges,
    })
}
