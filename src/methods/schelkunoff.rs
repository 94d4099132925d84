use std::f64::consts::PI;

use ndarray::Array1;
use num::complex::Complex64;
use tracing::debug;

use super::{MethodMetadata, Synthesized};
use crate::{
    error::{Result, SynthesisError},
    helper::{k, progressive_phase},
    polynomial::{display, poly_from_roots},
};

// Unit circle root that produces a null at θ.
pub fn null_root(d_lambda: f64, θ: f64) -> Complex64 {
    Complex64::from_polar(1., k * d_lambda * θ.cos())
}

/// Roots of Σ_{p=0}^{m} (z·e^{jα})^p, the polynomial of an (m+1)-element uniform array
/// steered by α. None of them lies on the main beam.
pub fn free_roots(m: usize, d_lambda: f64, θ0: f64) -> Vec<Complex64> {
    let α = progressive_phase(d_lambda, θ0);
    (1..=m)
        .map(|q| Complex64::from_polar(1., 2. * PI * q as f64 / (m + 1) as f64 - α))
        .collect()
}

/**
All N-1 roots of the array polynomial Σ I_n z^n with z = exp(j·k·d·cos θ): one per requested
null, the rest taken from an evenly excited subarray steered to θ0 so the main beam stays there.
*/
pub fn roots(n: usize, d_lambda: f64, θ0: f64, null_angles: &[f64]) -> Result<Vec<Complex64>> {
    if n < null_angles.len() + 1 {
        return Err(SynthesisError::TooManyNulls {
            nulls: null_angles.len(),
            elements: n,
        });
    }

    let mut roots: Vec<Complex64> = null_angles
        .iter()
        .map(|&θ| null_root(d_lambda, θ))
        .collect();
    roots.extend(free_roots(n - 1 - null_angles.len(), d_lambda, θ0));

    Ok(roots)
}

pub fn excitations(
    n: usize,
    d_lambda: f64,
    θ0: f64,
    null_angles: &[f64],
) -> Result<Array1<Complex64>> {
    Ok(poly_from_roots(&roots(n, d_lambda, θ0, null_angles)?))
}

pub fn synthesize(
    n: usize,
    d_lambda: f64,
    θ0: f64,
    null_angles: &[f64],
    precision: usize,
) -> Result<Synthesized> {
    let excitations = excitations(n, d_lambda, θ0, null_angles)?;
    let free = n - 1 - null_angles.len();
    debug!(nulls = null_angles.len(), free, "placed polynomial roots");

    Ok(Synthesized {
        metadata: MethodMetadata::Schelkunoff {
            polynomial_order: n - 1,
            requested_nulls: null_angles.to_vec(),
            free_roots: free,
            polynomial: display(&excitations, precision),
        },
        excitations,
    })
}
