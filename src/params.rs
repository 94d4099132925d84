use std::{collections::BTreeMap, f64::consts::PI, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    config::{AngleUnit, EngineConfig, RESOLUTION_MIN},
    error::{Result, SynthesisError},
    expression,
    methods::dolph_chebyshev::ChebyshevDesign,
};

// Slack allowed on the [0, π] bounds so that e.g. 180° converts to an in-range angle.
const ANGLE_TOLERANCE: f64 = 1e-9;

const ELEMENT_COUNT: [&str; 2] = ["element_count", "n_elements"];
const THETA0: [&str; 2] = ["theta0", "theta0_angle"];

/// A single unvalidated input value as a host application would hand it over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    List(Vec<RawValue>),
}

impl From<f64> for RawValue {
    fn from(x: f64) -> Self {
        RawValue::Number(x)
    }
}

impl From<i32> for RawValue {
    fn from(x: i32) -> Self {
        RawValue::Number(x as f64)
    }
}

impl From<usize> for RawValue {
    fn from(x: usize) -> Self {
        RawValue::Number(x as f64)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_owned())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl<T: Into<RawValue>> From<Vec<T>> for RawValue {
    fn from(v: Vec<T>) -> Self {
        RawValue::List(v.into_iter().map(Into::into).collect())
    }
}

/// String-keyed bag of unvalidated inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawParameters {
    values: BTreeMap<String, RawValue>,
}

impl RawParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<RawValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<RawValue>) {
        self.values.insert(key.to_owned(), value.into());
    }

    // First present key among `keys`; later entries are accepted aliases.
    fn lookup(&self, keys: &[&str]) -> Option<&RawValue> {
        keys.iter().find_map(|key| self.values.get(*key))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Uniform,
    Schelkunoff,
    Fourier,
    DolphChebyshev,
}

impl FromStr for Method {
    type Err = SynthesisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uniform" => Ok(Method::Uniform),
            "schelkunoff" => Ok(Method::Schelkunoff),
            "fourier" => Ok(Method::Fourier),
            "dolph_chebyshev" | "dolph-chebyshev" => Ok(Method::DolphChebyshev),
            _ => Err(SynthesisError::UnknownMethod {
                value: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Uniform => "uniform",
            Method::Schelkunoff => "schelkunoff",
            Method::Fourier => "fourier",
            Method::DolphChebyshev => "dolph_chebyshev",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeamShape {
    Rectangular,
    Triangular,
}

impl FromStr for BeamShape {
    type Err = SynthesisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rectangular" => Ok(BeamShape::Rectangular),
            "triangular" => Ok(BeamShape::Triangular),
            _ => Err(SynthesisError::UnknownBeamShape {
                value: s.to_owned(),
            }),
        }
    }
}

/// An angular region [start, end] in radians with start < end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamRegion {
    pub start: f64,
    pub end: f64,
}

/// Inputs only one method consumes. Each variant carries exactly what its method needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum MethodParameters {
    Uniform,
    Schelkunoff {
        /// Sorted, de-duplicated, radians.
        null_angles: Vec<f64>,
    },
    Fourier {
        beam_shape: BeamShape,
        beams: Vec<BeamRegion>,
    },
    DolphChebyshev {
        /// Magnitude in dB of the sidelobes below the main lobe.
        sidelobe_level_db: f64,
    },
}

impl MethodParameters {
    pub fn method(&self) -> Method {
        match self {
            MethodParameters::Uniform => Method::Uniform,
            MethodParameters::Schelkunoff { .. } => Method::Schelkunoff,
            MethodParameters::Fourier { .. } => Method::Fourier,
            MethodParameters::DolphChebyshev { .. } => Method::DolphChebyshev,
        }
    }
}

/// A validated parameter set. All angles are radians. Only [validate] builds one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesisParameters {
    element_count: usize,
    d_lambda: f64,
    theta0: f64,
    resolution: usize,
    #[serde(flatten)]
    method: MethodParameters,
}

impl SynthesisParameters {
    pub fn element_count(&self) -> usize {
        self.element_count
    }

    pub fn d_lambda(&self) -> f64 {
        self.d_lambda
    }

    pub fn theta0(&self) -> f64 {
        self.theta0
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn method(&self) -> Method {
        self.method.method()
    }

    pub fn method_parameters(&self) -> &MethodParameters {
        &self.method
    }
}

/**
Checks and normalizes `raw` for `method`.

Every rule runs before any synthesis math: spacing must be positive and finite, element
counts integral and large enough for the method, angles within [0, π] after unit conversion,
resolution within the configured bounds, and method-specific inputs present and well formed.
The first violation is returned and names the offending field.
*/
pub fn validate(
    method: Method,
    raw: &RawParameters,
    config: &EngineConfig,
) -> Result<SynthesisParameters> {
    let unit = config.angle_unit;

    let d_lambda = number(required(raw, &["d_lambda"])?, "d_lambda")?;
    if !(d_lambda.is_finite() && d_lambda > 0.) {
        return Err(SynthesisError::InvalidSpacing { value: d_lambda });
    }

    let minimum_elements = if method == Method::Uniform { 1 } else { 2 };
    let element_count = match raw.lookup(&ELEMENT_COUNT) {
        Some(value) => Some(element_count(value, minimum_elements)?),
        None if method == Method::Schelkunoff => None,
        None => return Err(SynthesisError::MissingField { field: "element_count" }),
    };

    let theta0 = angle(required(raw, &THETA0)?, "theta0", unit)?;

    let resolution = match raw.lookup(&["resolution"]) {
        Some(value) => integer(value, "resolution")?,
        None => config.resolution_default as i64,
    };
    // The grid needs at least two samples whatever the config says.
    let (min, max) = (
        config.resolution_min.max(RESOLUTION_MIN),
        config.resolution_max.max(RESOLUTION_MIN),
    );
    if resolution < min as i64 || resolution > max as i64 {
        return Err(SynthesisError::ResolutionOutOfRange {
            value: resolution,
            min,
            max,
        });
    }
    let resolution = resolution as usize;

    let (element_count, method) = match method {
        Method::Uniform => (element_count.unwrap_or(1), MethodParameters::Uniform),
        Method::Schelkunoff => {
            let null_angles = null_angles(required(raw, &["null_angles"])?, unit)?;
            let n = match element_count {
                Some(n) if null_angles.len() > n - 1 => {
                    return Err(SynthesisError::TooManyNulls {
                        nulls: null_angles.len(),
                        elements: n,
                    })
                }
                Some(n) => n,
                None => null_angles.len() + 1,
            };
            if null_angles.iter().any(|x| (x - theta0).abs() < 1e-8) {
                warn!(theta0, "a requested null coincides with the main beam direction");
            }
            if n % 2 == 0 {
                warn!(n, "even element count; an odd count gives a more symmetric pattern");
            }
            (n, MethodParameters::Schelkunoff { null_angles })
        }
        Method::Fourier => {
            let beam_shape = match required(raw, &["beam_shape"])? {
                RawValue::Text(s) => s.parse()?,
                _ => {
                    return Err(SynthesisError::InvalidType {
                        field: "beam_shape",
                        expected: "text",
                    })
                }
            };
            let beams = beams(raw, unit)?;
            (
                element_count.unwrap_or(minimum_elements),
                MethodParameters::Fourier { beam_shape, beams },
            )
        }
        Method::DolphChebyshev => {
            let level = number(required(raw, &["sidelobe_level_db"])?, "sidelobe_level_db")?;
            if !level.is_finite() {
                return Err(SynthesisError::NonFiniteSidelobeLevel { value: level });
            }
            if level < 0. {
                warn!(level, "negative sidelobe level, using its magnitude");
            }
            let n = element_count.unwrap_or(minimum_elements);
            ChebyshevDesign::new(n, level)?;
            (
                n,
                MethodParameters::DolphChebyshev {
                    sidelobe_level_db: level.abs(),
                },
            )
        }
    };

    Ok(SynthesisParameters {
        element_count,
        d_lambda,
        theta0,
        resolution,
        method,
    })
}

fn required<'a>(raw: &'a RawParameters, keys: &[&'static str]) -> Result<&'a RawValue> {
    raw.lookup(keys)
        .ok_or(SynthesisError::MissingField { field: keys[0] })
}

fn number(value: &RawValue, field: &'static str) -> Result<f64> {
    match value {
        RawValue::Number(x) => Ok(*x),
        RawValue::Text(text) => expression::evaluate(text),
        RawValue::List(_) => Err(SynthesisError::InvalidType {
            field,
            expected: "a number or expression",
        }),
    }
}

fn integer(value: &RawValue, field: &'static str) -> Result<i64> {
    let x = number(value, field)?;
    if !x.is_finite() || x.fract() != 0. {
        return Err(SynthesisError::NotAnInteger { field, value: x });
    }
    Ok(x as i64)
}

fn element_count(value: &RawValue, minimum: usize) -> Result<usize> {
    let n = integer(value, "element_count")?;
    if n < minimum as i64 {
        return Err(SynthesisError::ElementCountTooSmall {
            field: "element_count",
            value: n,
            minimum,
        });
    }
    Ok(n as usize)
}

// Converts from `unit` and checks the result lies in [0, π].
fn to_checked_radians(x: f64, field: &'static str, unit: AngleUnit) -> Result<f64> {
    let rad = unit.to_radians(x);
    if !rad.is_finite() || rad < -ANGLE_TOLERANCE || rad > PI + ANGLE_TOLERANCE {
        return Err(SynthesisError::AngleOutOfRange { field, value: rad });
    }
    Ok(rad.clamp(0., PI))
}

fn angle(value: &RawValue, field: &'static str, unit: AngleUnit) -> Result<f64> {
    to_checked_radians(number(value, field)?, field, unit)
}

// A list given either as an actual list or as comma separated text. Items are expressions.
fn number_list(value: &RawValue, field: &'static str) -> Result<Vec<f64>> {
    match value {
        RawValue::Text(text) if text.trim().is_empty() => Ok(Vec::new()),
        RawValue::Text(text) => text
            .split(',')
            .map(|item| {
                expression::evaluate(item).map_err(|_| SynthesisError::ListParse {
                    field,
                    text: text.clone(),
                })
            })
            .collect(),
        RawValue::List(items) => items.iter().map(|item| number(item, field)).collect(),
        RawValue::Number(x) => Ok(vec![*x]),
    }
}

fn null_angles(value: &RawValue, unit: AngleUnit) -> Result<Vec<f64>> {
    let field = "null_angles";
    let mut nulls = number_list(value, field)?
        .into_iter()
        .map(|x| to_checked_radians(x, field, unit))
        .collect::<Result<Vec<f64>>>()?;
    if nulls.is_empty() {
        return Err(SynthesisError::EmptyNullAngles);
    }

    nulls.sort_by(|x, y| x.total_cmp(y));
    nulls.dedup();
    Ok(nulls)
}

fn beams(raw: &RawParameters, unit: AngleUnit) -> Result<Vec<BeamRegion>> {
    let count = integer(required(raw, &["number_of_beams"])?, "number_of_beams")?;
    if !(1..=3).contains(&count) {
        return Err(SynthesisError::InvalidBeamCount { value: count });
    }
    let count = count as usize;

    let angles = number_list(required(raw, &["beam_angles"])?, "beam_angles")?;
    if angles.len() != 2 * count {
        return Err(SynthesisError::BeamAngleCount {
            beams: count,
            expected: 2 * count,
            got: angles.len(),
        });
    }

    angles
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| {
            let start = to_checked_radians(pair[0], "beam_angles", unit)?;
            let end = to_checked_radians(pair[1], "beam_angles", unit)?;
            if start >= end {
                return Err(SynthesisError::BeamPairOrder {
                    beam: i + 1,
                    start,
                    end,
                });
            }
            Ok(BeamRegion { start, end })
        })
        .collect()
}

#[cfg(test)]
mod test {
    use std::f64::consts::PI;

    use approx::assert_relative_eq;

    use super::{validate, BeamShape, Method, MethodParameters, RawParameters};
    use crate::{
        config::{AngleUnit, EngineConfig, RESOLUTION_MIN},
        error::SynthesisError,
    };

    fn uniform(d_lambda: f64) -> RawParameters {
        RawParameters::new()
            .with("element_count", 8)
            .with("d_lambda", d_lambda)
            .with("theta0", 90.)
    }

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn spacing_must_be_positive_and_finite() {
        for bad in [0., -0.5, f64::NAN, f64::INFINITY] {
            let err = validate(Method::Uniform, &uniform(bad), &config()).unwrap_err();
            assert!(matches!(err, SynthesisError::InvalidSpacing { .. }));
            assert_eq!(err.field(), Some("d_lambda"));
        }
        assert!(validate(Method::Uniform, &uniform(0.25), &config()).is_ok());
    }

    #[test]
    fn resolution_boundary() {
        let raw = uniform(0.5).with("resolution", 15);
        assert_eq!(
            validate(Method::Uniform, &raw, &config()),
            Err(SynthesisError::ResolutionOutOfRange {
                value: 15,
                min: 16,
                max: 10_000
            })
        );

        let raw = uniform(0.5).with("resolution", 16);
        assert_eq!(
            validate(Method::Uniform, &raw, &config())
                .unwrap()
                .resolution(),
            16
        );

        let params = validate(Method::Uniform, &uniform(0.5), &config()).unwrap();
        assert_eq!(params.resolution(), 3600);

        // A config loosened past the grid minimum still cannot reach a degenerate grid.
        let loose = EngineConfig {
            resolution_min: 1,
            ..config()
        };
        let raw = uniform(0.5).with("resolution", 1);
        assert_eq!(
            validate(Method::Uniform, &raw, &loose),
            Err(SynthesisError::ResolutionOutOfRange {
                value: 1,
                min: 16,
                max: 10_000
            })
        );
    }

    #[test]
    fn element_count_rules() {
        let raw = uniform(0.5).with("element_count", 1);
        assert_eq!(
            validate(Method::Uniform, &raw, &config())
                .unwrap()
                .element_count(),
            1
        );

        let raw = uniform(0.5)
            .with("element_count", 1)
            .with("sidelobe_level_db", 30.);
        assert_eq!(
            validate(Method::DolphChebyshev, &raw, &config()),
            Err(SynthesisError::ElementCountTooSmall {
                field: "element_count",
                value: 1,
                minimum: 2
            })
        );

        let raw = uniform(0.5).with("element_count", 4.5);
        assert_eq!(
            validate(Method::Uniform, &raw, &config()),
            Err(SynthesisError::NotAnInteger {
                field: "element_count",
                value: 4.5
            })
        );

        // The n_elements alias and expression text are both accepted.
        let raw = RawParameters::new()
            .with("n_elements", "2*6")
            .with("d_lambda", "1/2")
            .with("theta0", 90.);
        assert_eq!(
            validate(Method::Uniform, &raw, &config())
                .unwrap()
                .element_count(),
            12
        );
    }

    #[test]
    fn missing_fields_are_named() {
        let raw = RawParameters::new().with("d_lambda", 0.5).with("theta0", 90.);
        assert_eq!(
            validate(Method::Fourier, &raw, &config()),
            Err(SynthesisError::MissingField {
                field: "element_count"
            })
        );

        let raw = RawParameters::new()
            .with("element_count", 8)
            .with("d_lambda", 0.5);
        assert_eq!(
            validate(Method::Uniform, &raw, &config()),
            Err(SynthesisError::MissingField { field: "theta0" })
        );

        let raw = uniform(0.5);
        assert_eq!(
            validate(Method::DolphChebyshev, &raw, &config()),
            Err(SynthesisError::MissingField {
                field: "sidelobe_level_db"
            })
        );
    }

    #[test]
    fn theta0_units_and_range() {
        let raw = uniform(0.5).with("theta0", 180.);
        assert_eq!(
            validate(Method::Uniform, &raw, &config()).unwrap().theta0(),
            PI
        );

        let raw = uniform(0.5).with("theta0", 181.);
        let err = validate(Method::Uniform, &raw, &config()).unwrap_err();
        assert_eq!(err.field(), Some("theta0"));

        let radians = config().with_angle_unit(AngleUnit::Radians);
        let raw = uniform(0.5).with("theta0", "3*pi/4");
        assert_relative_eq!(
            validate(Method::Uniform, &raw, &radians).unwrap().theta0(),
            3. * PI / 4.
        );

        let raw = uniform(0.5).with("theta0", "pi/2 + x");
        assert!(matches!(
            validate(Method::Uniform, &raw, &radians),
            Err(SynthesisError::Expression { expression, .. }) if expression == "pi/2 + x"
        ));
    }

    #[test]
    fn sidelobe_level() {
        let raw = uniform(0.5).with("sidelobe_level_db", f64::NAN);
        assert!(matches!(
            validate(Method::DolphChebyshev, &raw, &config()),
            Err(SynthesisError::NonFiniteSidelobeLevel { .. })
        ));

        let raw = uniform(0.5).with("sidelobe_level_db", -25.);
        let params = validate(Method::DolphChebyshev, &raw, &config()).unwrap();
        assert_eq!(
            params.method_parameters(),
            &MethodParameters::DolphChebyshev {
                sidelobe_level_db: 25.
            }
        );

        let raw = uniform(0.5).with("sidelobe_level_db", 0.);
        assert!(matches!(
            validate(Method::DolphChebyshev, &raw, &config()),
            Err(SynthesisError::SidelobeLevelUnachievable { .. })
        ));

        let raw = uniform(0.5).with("sidelobe_level_db", 7000.);
        assert_eq!(
            validate(Method::DolphChebyshev, &raw, &config()),
            Err(SynthesisError::SidelobeLevelUnachievable { level_db: 7000. })
        );
    }

    #[test]
    fn null_angle_lists() {
        let raw = RawParameters::new()
            .with("d_lambda", 0.5)
            .with("theta0", 90.)
            .with("null_angles", "135, 45, 45");
        let params = validate(Method::Schelkunoff, &raw, &config()).unwrap();
        // No element count given: one more element than there are distinct nulls.
        assert_eq!(params.element_count(), 3);
        match params.method_parameters() {
            MethodParameters::Schelkunoff { null_angles } => {
                assert_eq!(null_angles.len(), 2);
                assert_relative_eq!(null_angles[0], PI / 4.);
                assert_relative_eq!(null_angles[1], 3. * PI / 4.);
            }
            other => panic!("unexpected {:?}", other),
        }

        let raw = raw.with("null_angles", "45, forty");
        assert_eq!(
            validate(Method::Schelkunoff, &raw, &config()),
            Err(SynthesisError::ListParse {
                field: "null_angles",
                text: "45, forty".into()
            })
        );

        let raw = raw.with("null_angles", " ");
        assert_eq!(
            validate(Method::Schelkunoff, &raw, &config()),
            Err(SynthesisError::EmptyNullAngles)
        );

        let raw = raw.with("null_angles", vec![10., 200.]);
        let err = validate(Method::Schelkunoff, &raw, &config()).unwrap_err();
        assert_eq!(err.field(), Some("null_angles"));
        assert!(matches!(err, SynthesisError::AngleOutOfRange { .. }));

        let raw = raw
            .with("null_angles", vec![10., 20., 30.])
            .with("element_count", 3);
        assert_eq!(
            validate(Method::Schelkunoff, &raw, &config()),
            Err(SynthesisError::TooManyNulls {
                nulls: 3,
                elements: 3
            })
        );
    }

    fn fourier(beams: usize, angles: &str) -> RawParameters {
        RawParameters::new()
            .with("element_count", 10)
            .with("d_lambda", 0.5)
            .with("theta0", 90.)
            .with("beam_shape", "Rectangular")
            .with("number_of_beams", beams)
            .with("beam_angles", angles)
    }

    #[test]
    fn beam_pairs() {
        let params = validate(Method::Fourier, &fourier(2, "20, 40, 100, 150"), &config()).unwrap();
        match params.method_parameters() {
            MethodParameters::Fourier { beam_shape, beams } => {
                assert_eq!(*beam_shape, BeamShape::Rectangular);
                assert_eq!(beams.len(), 2);
                assert_relative_eq!(beams[0].start, 20f64.to_radians());
                assert_relative_eq!(beams[1].end, 150f64.to_radians());
            }
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(
            validate(Method::Fourier, &fourier(2, "20, 40, 100"), &config()),
            Err(SynthesisError::BeamAngleCount {
                beams: 2,
                expected: 4,
                got: 3
            })
        );

        assert!(matches!(
            validate(Method::Fourier, &fourier(1, "60, 60"), &config()),
            Err(SynthesisError::BeamPairOrder { beam: 1, .. })
        ));

        assert!(matches!(
            validate(Method::Fourier, &fourier(1, "60, 190"), &config()),
            Err(SynthesisError::AngleOutOfRange { .. })
        ));

        assert_eq!(
            validate(Method::Fourier, &fourier(4, "1,2,3,4,5,6,7,8"), &config()),
            Err(SynthesisError::InvalidBeamCount { value: 4 })
        );

        let raw = fourier(1, "60, 120").with("beam_shape", "gaussian");
        assert_eq!(
            validate(Method::Fourier, &raw, &config()),
            Err(SynthesisError::UnknownBeamShape {
                value: "gaussian".into()
            })
        );
    }

    #[test]
    fn method_identifiers() {
        assert_eq!("dolph_chebyshev".parse::<Method>(), Ok(Method::DolphChebyshev));
        assert_eq!("Uniform".parse::<Method>(), Ok(Method::Uniform));
        assert_eq!(
            "genetic".parse::<Method>(),
            Err(SynthesisError::UnknownMethod {
                value: "genetic".into()
            })
        );
        assert_eq!(Method::Schelkunoff.to_string(), "schelkunoff");
    }

    #[test]
    fn raw_parameters_from_json() {
        let raw: RawParameters = serde_json::from_str(
            r#"{"element_count": 5, "d_lambda": "1/4", "theta0": 60, "null_angles": [30, "45"]}"#,
        )
        .unwrap();
        let params = validate(Method::Schelkunoff, &raw, &config()).unwrap();
        assert_eq!(params.element_count(), 5);
        assert_relative_eq!(params.d_lambda(), 0.25);
        assert_relative_eq!(params.theta0(), PI / 3.);
    }
}
