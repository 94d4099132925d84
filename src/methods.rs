use ndarray::Array1;
use num::complex::Complex64;
use serde::Serialize;

use crate::{
    angle_grid::AngleGrid,
    config::EngineConfig,
    error::Result,
    params::{BeamRegion, BeamShape, MethodParameters, SynthesisParameters},
};

pub mod dolph_chebyshev;
pub mod fourier;
pub mod schelkunoff;
pub mod uniform;

/// Facts about a run that only make sense for the method that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum MethodMetadata {
    Uniform {
        progressive_phase: f64,
    },
    Schelkunoff {
        polynomial_order: usize,
        requested_nulls: Vec<f64>,
        free_roots: usize,
        polynomial: String,
    },
    Fourier {
        beam_shape: BeamShape,
        beams: Vec<BeamRegion>,
        // Target pattern sampled on the result's angle grid.
        desired_pattern: Vec<f64>,
        desired_directivity: f64,
        desired_directivity_db: f64,
    },
    DolphChebyshev {
        ratio: f64,
        x0: f64,
        polynomial_order: usize,
        d_max: f64,
        d_opt: f64,
    },
}

/// Complex element excitations, index n being the element at n·d along the array axis.
pub struct Synthesized {
    pub excitations: Array1<Complex64>,
    pub metadata: MethodMetadata,
}

/// Runs whichever method `params` selects.
pub fn synthesize(
    params: &SynthesisParameters,
    grid: &AngleGrid,
    config: &EngineConfig,
) -> Result<Synthesized> {
    let n = params.element_count();
    let d = params.d_lambda();
    let θ0 = params.theta0();

    match params.method_parameters() {
        MethodParameters::Uniform => Ok(uniform::synthesize(n, d, θ0)),
        MethodParameters::Schelkunoff { null_angles } => {
            schelkunoff::synthesize(n, d, θ0, null_angles, config.precision_digits)
        }
        MethodParameters::Fourier { beam_shape, beams } => Ok(fourier::synthesize(
            n,
            d,
            θ0,
            beams,
            *beam_shape,
            grid,
            params.resolution(),
        )),
        MethodParameters::DolphChebyshev { sidelobe_level_db } => {
            dolph_chebyshev::synthesize(n, d, θ0, *sidelobe_level_db)
        }
    }
}
