use std::f64::consts::PI;

use ndarray::Array1;
use num::complex::Complex64;

// Real or imaginary parts smaller than this are treated as rounding noise.
pub const NUMERICAL_ZERO_THRESHOLD: f64 = 1e-10;

// Guards divisions and logarithms.
pub const EPSILON: f64 = 1e-12;

// Wavenumber in units where the wavelength is 1.
pub const k: f64 = 2. * PI;

// Amplitude ratio to decibels.
pub fn decibels(x: f64) -> f64 {
    20. * x.log10()
}

pub fn decibels_or_else(x: f64, or: f64) -> f64 {
    if x <= 0. || !x.is_finite() {
        or
    } else {
        20. * x.log10()
    }
}

// Decibels to amplitude ratio.
pub fn from_decibels(db: f64) -> f64 {
    10f64.powf(db / 20.)
}

/// Progressive phase α = -k·d·cos(θ0) that points the main beam of a linear array at θ0.
pub fn progressive_phase(d_lambda: f64, theta0: f64) -> f64 {
    -k * d_lambda * theta0.cos()
}

/// Multiplies element n by exp(j·n·α) so the beam points at θ0.
pub fn steer(excitations: &Array1<Complex64>, d_lambda: f64, theta0: f64) -> Array1<Complex64> {
    let α = progressive_phase(d_lambda, theta0);
    excitations
        .iter()
        .enumerate()
        .map(|(n, x)| x * Complex64::from_polar(1., n as f64 * α))
        .collect()
}

/// Sets real and imaginary parts below [NUMERICAL_ZERO_THRESHOLD] to exactly zero.
pub fn zero_small_parts(values: &Array1<Complex64>) -> Array1<Complex64> {
    let snap = |x: f64| if x.abs() < NUMERICAL_ZERO_THRESHOLD { 0. } else { x };
    values.mapv(|x| Complex64::new(snap(x.re), snap(x.im)))
}

// Trapezoidal integral of samples y taken at abscissae x.
pub fn trapezoid(y: &Array1<f64>, x: &Array1<f64>) -> f64 {
    y.iter()
        .zip(x.iter())
        .zip(y.iter().skip(1).zip(x.iter().skip(1)))
        .map(|((y0, x0), (y1, x1))| 0.5 * (y0 + y1) * (x1 - x0))
        .sum()
}
