use std::{fmt::Write as _, fs, io, path::Path};

use num::complex::Complex64;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
    config::AngleUnit,
    engine::SynthesisResult,
    methods::MethodMetadata,
    params::{Method, SynthesisParameters},
    pattern_metrics::PatternMetrics,
};

pub const EXCITATIONS_KEY: &str = "element_excitations";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document has no \"{0}\" entry")]
    MissingKey(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExcitationEntry {
    pub index: usize,
    pub re: f64,
    pub im: f64,
    pub magnitude: f64,
    // Radians.
    pub phase: f64,
}

impl ExcitationEntry {
    fn new(index: usize, x: Complex64) -> Self {
        ExcitationEntry {
            index,
            re: x.re,
            im: x.im,
            magnitude: x.norm(),
            phase: x.arg(),
        }
    }
}

// Serialized view of a [SynthesisResult].
#[derive(Serialize)]
struct ResultDocument<'a> {
    method: Method,
    parameters: &'a SynthesisParameters,
    element_excitations: Vec<ExcitationEntry>,
    normalized_excitations: Vec<ExcitationEntry>,
    theta_radians: Vec<f64>,
    af_linear: Vec<f64>,
    af_phase: Vec<f64>,
    af_db: Vec<f64>,
    db_floor: f64,
    metrics: &'a PatternMetrics,
    metadata: &'a MethodMetadata,
}

fn entries<'a>(values: impl Iterator<Item = &'a Complex64>) -> Vec<ExcitationEntry> {
    values
        .enumerate()
        .map(|(i, &x)| ExcitationEntry::new(i, x))
        .collect()
}

/// Pretty printed JSON. Angles are radians regardless of the configured display unit.
pub fn to_json(result: &SynthesisResult) -> Result<String, ExportError> {
    let af = result.array_factor();
    let document = ResultDocument {
        method: result.method(),
        parameters: result.parameters(),
        element_excitations: entries(result.excitations().iter()),
        normalized_excitations: entries(result.normalized_excitations().iter()),
        theta_radians: result.grid().theta().to_vec(),
        af_linear: af.magnitude().to_vec(),
        af_phase: af.phase().to_vec(),
        af_db: af.db().to_vec(),
        db_floor: af.floor_db(),
        metrics: result.metrics(),
        metadata: result.metadata(),
    };

    Ok(serde_json::to_string_pretty(&document)?)
}

pub fn write_json(result: &SynthesisResult, path: impl AsRef<Path>) -> Result<(), ExportError> {
    fs::write(path, to_json(result)?)?;
    Ok(())
}

/// Reads the element excitations back out of a document written by [to_json], in index order.
pub fn excitations_from_json(text: &str) -> Result<Vec<Complex64>, ExportError> {
    let document: Value = serde_json::from_str(text)?;
    let raw = document
        .get(EXCITATIONS_KEY)
        .cloned()
        .ok_or(ExportError::MissingKey(EXCITATIONS_KEY))?;

    let mut entries: Vec<ExcitationEntry> = serde_json::from_value(raw)?;
    entries.sort_by_key(|e| e.index);
    Ok(entries
        .into_iter()
        .map(|e| Complex64::new(e.re, e.im))
        .collect())
}

/// One row per angle sample: angle, magnitude, level in dB, phase. Angles and phases use `unit`.
pub fn array_factor_csv(result: &SynthesisResult, unit: AngleUnit, digits: usize) -> String {
    let af = result.array_factor();
    let angle_header = match unit {
        AngleUnit::Degrees => "theta_deg",
        AngleUnit::Radians => "theta_rad",
    };

    let mut out = format!("{},magnitude,db,phase\n", angle_header);
    for (i, θ) in result.angles(unit).iter().enumerate() {
        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "{:.*},{:.*},{:.*},{:.*}",
            digits,
            θ,
            digits,
            af.magnitude()[i],
            digits,
            af.db()[i],
            digits,
            unit.from_radians(af.phase()[i]),
        );
    }
    out
}
