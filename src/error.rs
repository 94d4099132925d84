use thiserror::Error;

// Every condition the engine can raise. Validation variants name the field they came from so a
// caller can point at the offending input without parsing the message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynthesisError {
    #[error("missing required parameter `{field}`")]
    MissingField { field: &'static str },

    #[error("parameter `{field}` must be {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("parameter `{field}` must be an integer, got {value}")]
    NotAnInteger { field: &'static str, value: f64 },

    #[error("parameter `{field}` must be at least {minimum}, got {value}")]
    ElementCountTooSmall {
        field: &'static str,
        value: i64,
        minimum: usize,
    },

    #[error("element spacing `d_lambda` must be positive and finite, got {value}")]
    InvalidSpacing { value: f64 },

    #[error("angle `{field}` must lie in [0, pi] radians, got {value}")]
    AngleOutOfRange { field: &'static str, value: f64 },

    #[error("`resolution` must lie in [{min}, {max}], got {value}")]
    ResolutionOutOfRange { value: i64, min: usize, max: usize },

    #[error("`sidelobe_level_db` must be finite, got {value}")]
    NonFiniteSidelobeLevel { value: f64 },

    #[error("sidelobe level of {level_db} dB is not achievable (x0 <= 1); request a non-zero level")]
    SidelobeLevelUnachievable { level_db: f64 },

    #[error("unknown synthesis method '{value}'")]
    UnknownMethod { value: String },

    #[error("unsupported beam shape '{value}', expected one of: rectangular, triangular")]
    UnknownBeamShape { value: String },

    #[error("`number_of_beams` must be 1, 2 or 3, got {value}")]
    InvalidBeamCount { value: i64 },

    #[error("{beams} beam(s) require exactly {expected} angles in `beam_angles`, got {got}")]
    BeamAngleCount {
        beams: usize,
        expected: usize,
        got: usize,
    },

    #[error("beam #{beam}: start angle {start} must be strictly less than end angle {end}")]
    BeamPairOrder { beam: usize, start: f64, end: f64 },

    #[error("`null_angles` must contain at least one angle")]
    EmptyNullAngles,

    #[error("could not parse `{field}` from '{text}'")]
    ListParse { field: &'static str, text: String },

    #[error("could not evaluate expression '{expression}': {reason}")]
    Expression { expression: String, reason: String },

    #[error("{nulls} nulls cannot be placed with {elements} elements (at most {})", .elements.saturating_sub(1))]
    TooManyNulls { nulls: usize, elements: usize },

    #[error("unknown normalization method '{value}', expected one of: max, reference_element, unity_sum")]
    UnknownNormalization { value: String },

    #[error("reference element {index} has zero magnitude and cannot be normalized to unity")]
    ZeroMagnitudeReference { index: usize },

    #[error("reference element {index} is out of range for {len} elements")]
    ReferenceOutOfRange { index: usize, len: usize },

    #[error("cannot apply `{method}` normalization to an all-zero array")]
    DegenerateNormalization { method: &'static str },
}

impl SynthesisError {
    /// Name of the input field this error refers to, where there is one.
    pub fn field(&self) -> Option<&str> {
        use SynthesisError::*;
        match self {
            MissingField { field }
            | InvalidType { field, .. }
            | NotAnInteger { field, .. }
            | ElementCountTooSmall { field, .. }
            | AngleOutOfRange { field, .. }
            | ListParse { field, .. } => Some(*field),
            InvalidSpacing { .. } => Some("d_lambda"),
            ResolutionOutOfRange { .. } => Some("resolution"),
            NonFiniteSidelobeLevel { .. } | SidelobeLevelUnachievable { .. } => {
                Some("sidelobe_level_db")
            }
            UnknownMethod { .. } => Some("method"),
            UnknownBeamShape { .. } => Some("beam_shape"),
            InvalidBeamCount { .. } => Some("number_of_beams"),
            BeamAngleCount { .. } | BeamPairOrder { .. } => Some("beam_angles"),
            EmptyNullAngles | TooManyNulls { .. } => Some("null_angles"),
            Expression { .. }
            | UnknownNormalization { .. }
            | ZeroMagnitudeReference { .. }
            | ReferenceOutOfRange { .. }
            | DegenerateNormalization { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SynthesisError>;
