use ndarray::Array1;
use num::complex::Complex64;
use tracing::{debug, instrument};

use crate::{
    angle_grid::AngleGrid,
    array_factor::ArrayFactorResult,
    config::{AngleUnit, EngineConfig, Scale},
    error::Result,
    helper::{k, zero_small_parts},
    methods::{self, MethodMetadata},
    params::{validate, Method, RawParameters, SynthesisParameters},
    pattern_metrics::{self, PatternMetrics},
};

/// Everything a run produced. Immutable once assembled.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisResult {
    parameters: SynthesisParameters,
    excitations: Array1<Complex64>,
    normalized_excitations: Array1<Complex64>,
    grid: AngleGrid,
    array_factor: ArrayFactorResult,
    metrics: PatternMetrics,
    metadata: MethodMetadata,
}

impl SynthesisResult {
    pub fn method(&self) -> Method {
        self.parameters.method()
    }

    pub fn parameters(&self) -> &SynthesisParameters {
        &self.parameters
    }

    /// Excitations as synthesized, element n at n·d.
    pub fn excitations(&self) -> &Array1<Complex64> {
        &self.excitations
    }

    /// Excitations after the configured [crate::normalize::Normalization].
    pub fn normalized_excitations(&self) -> &Array1<Complex64> {
        &self.normalized_excitations
    }

    pub fn grid(&self) -> &AngleGrid {
        &self.grid
    }

    pub fn array_factor(&self) -> &ArrayFactorResult {
        &self.array_factor
    }

    pub fn metrics(&self) -> &PatternMetrics {
        &self.metrics
    }

    pub fn metadata(&self) -> &MethodMetadata {
        &self.metadata
    }

    pub fn angles(&self, unit: AngleUnit) -> Array1<f64> {
        self.grid.in_unit(unit)
    }

    pub fn pattern(&self, scale: Scale) -> Array1<f64> {
        match scale {
            Scale::Db => self.array_factor.db().clone(),
            Scale::Linear => self.array_factor.magnitude().clone(),
        }
    }

    pub fn excitation_phases(&self, unit: AngleUnit) -> Array1<f64> {
        self.normalized_excitations
            .mapv(|x| unit.from_radians(x.arg()))
    }
}

/// Validates `raw` for `method` and runs it.
pub fn synthesize(
    method: Method,
    raw: &RawParameters,
    config: &EngineConfig,
) -> Result<SynthesisResult> {
    let params = validate(method, raw, config)?;
    run(params, config)
}

/// Same as [synthesize] with the method given by name.
pub fn synthesize_named(
    method: &str,
    raw: &RawParameters,
    config: &EngineConfig,
) -> Result<SynthesisResult> {
    synthesize(method.parse()?, raw, config)
}

/**
Runs already validated parameters: synthesize, evaluate, normalize, assemble.

A run is a pure function of its parameters and [EngineConfig], so independent runs may execute
concurrently.
*/
#[instrument(skip_all, fields(method = %params.method(), n = params.element_count()))]
pub fn run(params: SynthesisParameters, config: &EngineConfig) -> Result<SynthesisResult> {
    let grid = AngleGrid::full(params.resolution());
    debug!(kd = k * params.d_lambda(), samples = params.resolution(), "sampling pattern");

    let synthesized = methods::synthesize(&params, &grid, config)?;
    let excitations = zero_small_parts(&synthesized.excitations);

    let mut array_factor =
        ArrayFactorResult::evaluate(&excitations, params.d_lambda(), &grid, config.db_floor);
    if config.normalize_array_factor {
        array_factor = array_factor.normalized()?;
    }

    let normalized_excitations = config.excitation_normalization.apply(&excitations)?;
    let metrics =
        pattern_metrics::compute(&array_factor, grid.theta(), params.d_lambda(), params.theta0());
    debug!(
        peak_angle = metrics.peak_angle,
        directivity_db = metrics.directivity_db,
        "synthesis complete"
    );

    Ok(SynthesisResult {
        parameters: params,
        excitations,
        normalized_excitations,
        grid,
        array_factor,
        metrics,
        metadata: synthesized.metadata,
    })
}
