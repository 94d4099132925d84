use ndarray::Array1;
use num::complex::Complex64;

use super::{MethodMetadata, Synthesized};
use crate::helper::{progressive_phase, steer};

// Unit amplitudes with the linear phase progression that points the beam at θ0.
pub fn excitations(n: usize, d_lambda: f64, θ0: f64) -> Array1<Complex64> {
    steer(&Array1::from_elem(n, Complex64::new(1., 0.)), d_lambda, θ0)
}

pub fn synthesize(n: usize, d_lambda: f64, θ0: f64) -> Synthesized {
    Synthesized {
        excitations: excitations(n, d_lambda, θ0),
        metadata: MethodMetadata::Uniform {
            progressive_phase: progressive_phase(d_lambda, θ0),
        },
    }
}
