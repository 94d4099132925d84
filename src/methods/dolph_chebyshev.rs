use std::f64::consts::PI;

use ndarray::{array, Array1};
use num::complex::Complex64;
use tracing::{debug, warn};

use super::{MethodMetadata, Synthesized};
use crate::{
    error::{Result, SynthesisError},
    fft::FFT,
    helper::{from_decibels, steer},
    polynomial::T,
};

/**
Equiripple design: the array factor is T_{N-1}(x0·cos(ψ/2)), so every sidelobe sits exactly
`ratio` below the main lobe.
*/
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChebyshevDesign {
    // Main lobe to sidelobe amplitude ratio, R = 10^(level/20).
    pub ratio: f64,
    // Chebyshev argument that maps onto the main lobe peak.
    pub x0: f64,
    pub order: usize,
}

impl ChebyshevDesign {
    pub fn new(n: usize, sidelobe_level_db: f64) -> Result<ChebyshevDesign> {
        let ratio = from_decibels(sidelobe_level_db.abs());
        let order = n.saturating_sub(1).max(1);
        let x0 = (ratio.acosh() / order as f64).cosh();

        // Levels past a few hundred dB overflow R and leave x0 infinite.
        if !ratio.is_finite() || !x0.is_finite() || x0 <= 1. {
            return Err(SynthesisError::SidelobeLevelUnachievable {
                level_db: sidelobe_level_db,
            });
        }

        Ok(ChebyshevDesign { ratio, x0, order })
    }

    /// Largest spacing at broadside with no sidelobe above the design level.
    pub fn d_max(&self) -> f64 {
        (-1. / self.x0).acos() / PI
    }

    pub fn d_opt(&self) -> f64 {
        (1. - (1. / self.x0).acos() / PI).abs()
    }
}

/**
T_{N-1}(x0·cos(πk/N)) for k in 0..N, the sampled pattern whose transform is the weight
vector.

For even N the samples carry an extra phase exp(jπk/N). That is a half sample shift in
the element domain, which keeps the weights symmetric about the array centre.
*/
pub fn pattern_samples(n: usize, x0: f64) -> Array1<Complex64> {
    let N = n as f64;

    (0..n)
        .map(|i| {
            let x = i as f64;
            let sample = Complex64::new(T(n - 1, x0 * (PI * x / N).cos()), 0.);
            if n % 2 == 1 {
                sample
            } else {
                sample * Complex64::from_polar(1., PI * x / N)
            }
        })
        .collect()
}

/// Real, symmetric weights scaled so the broadside peak Σ w_n equals the design ratio.
pub fn weights(n: usize, design: &ChebyshevDesign) -> Array1<f64> {
    if n == 2 {
        return array![design.ratio / 2., design.ratio / 2.];
    }

    // The forward transform is used in place of the inverse; the scale is fixed below anyway.
    let mut w = pattern_samples(n, design.x0).fft().mapv(|x| x.re).to_vec();
    w.rotate_right((n - 1) / 2);
    let w = Array1::from(w);

    let total = w.sum();
    w * (design.ratio / total)
}

pub fn excitations(
    n: usize,
    sidelobe_level_db: f64,
    d_lambda: f64,
    θ0: f64,
) -> Result<Array1<Complex64>> {
    let design = ChebyshevDesign::new(n, sidelobe_level_db)?;
    let w = weights(n, &design).mapv(|x| Complex64::new(x, 0.));
    Ok(steer(&w, d_lambda, θ0))
}

pub fn synthesize(
    n: usize,
    d_lambda: f64,
    θ0: f64,
    sidelobe_level_db: f64,
) -> Result<Synthesized> {
    let design = ChebyshevDesign::new(n, sidelobe_level_db)?;
    let d_max = design.d_max();
    if d_lambda > d_max {
        warn!(
            d_lambda,
            d_max, "spacing is above the largest spacing that keeps sidelobes at the design level"
        );
    }
    debug!(ratio = design.ratio, x0 = design.x0, "chebyshev design");

    let w = weights(n, &design).mapv(|x| Complex64::new(x, 0.));

    Ok(Synthesized {
        excitations: steer(&w, d_lambda, θ0),
        metadata: MethodMetadata::DolphChebyshev {
            ratio: design.ratio,
            x0: design.x0,
            polynomial_order: design.order,
            d_max,
            d_opt: design.d_opt(),
        },
    })
}
