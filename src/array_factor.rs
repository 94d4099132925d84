use ndarray::Array1;
use num::complex::Complex64;

use crate::{
    angle_grid::AngleGrid,
    error::Result,
    helper::{decibels, k},
    normalize::Normalization,
    polynomial,
};

/// AF(θ) = Σ I_n exp(j·n·k·d·cos θ), evaluated as a polynomial in z = exp(j·k·d·cos θ).
pub fn array_factor_at(excitations: &Array1<Complex64>, d_lambda: f64, θ: f64) -> Complex64 {
    let z = Complex64::from_polar(1., k * d_lambda * θ.cos());
    polynomial::evaluate(excitations, z)
}

/**
Relative level 20·log10(|AF|/max|AF|) clamped below at `floor_db`.

Zero samples, an all-zero pattern and anything else that does not produce a finite level all
land on the floor.
*/
pub fn relative_db(magnitude: &Array1<f64>, floor_db: f64) -> Array1<f64> {
    let peak = magnitude.fold(0., |max: f64, &x| max.max(x));
    magnitude.mapv(|m| {
        let level = decibels(m / peak);
        if level.is_finite() {
            level.max(floor_db)
        } else {
            floor_db
        }
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayFactorResult {
    values: Array1<Complex64>,
    magnitude: Array1<f64>,
    phase: Array1<f64>,
    db: Array1<f64>,
    floor_db: f64,
}

impl ArrayFactorResult {
    pub fn evaluate(
        excitations: &Array1<Complex64>,
        d_lambda: f64,
        grid: &AngleGrid,
        floor_db: f64,
    ) -> ArrayFactorResult {
        let values = grid
            .theta()
            .mapv(|θ| array_factor_at(excitations, d_lambda, θ));
        ArrayFactorResult::from_values(values, floor_db)
    }

    pub fn from_values(values: Array1<Complex64>, floor_db: f64) -> ArrayFactorResult {
        let magnitude = values.mapv(|x| x.norm());
        let phase = values.mapv(|x| x.arg());
        let db = relative_db(&magnitude, floor_db);

        ArrayFactorResult {
            values,
            magnitude,
            phase,
            db,
            floor_db,
        }
    }

    /// The same pattern with its peak magnitude scaled to 1. Levels in dB do not change.
    pub fn normalized(&self) -> Result<ArrayFactorResult> {
        let values = Normalization::Max.apply(&self.values)?;
        Ok(ArrayFactorResult::from_values(values, self.floor_db))
    }

    pub fn values(&self) -> &Array1<Complex64> {
        &self.values
    }

    pub fn magnitude(&self) -> &Array1<f64> {
        &self.magnitude
    }

    pub fn phase(&self) -> &Array1<f64> {
        &self.phase
    }

    pub fn db(&self) -> &Array1<f64> {
        &self.db
    }

    pub fn floor_db(&self) -> f64 {
        self.floor_db
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    // First index of the largest magnitude.
    pub fn peak_index(&self) -> usize {
        self.magnitude
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |(best, max), (i, &m)| {
                if m > max {
                    (i, m)
                } else {
                    (best, max)
                }
            })
            .0
    }

    pub fn peak_magnitude(&self) -> f64 {
        self.magnitude.fold(0., |max: f64, &x| max.max(x))
    }
}
