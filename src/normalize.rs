use std::{fmt, str::FromStr};

use ndarray::Array1;
use num::complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthesisError};

/// How an excitation or pattern array is rescaled.
///
/// Textual identifiers are `max`, `unity_sum` and `reference_element[:index]` (index defaults
/// to 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Normalization {
    // Largest magnitude becomes 1, phases untouched.
    Max,
    // The referenced entry becomes exactly 1 + 0j.
    ReferenceElement(usize),
    // Magnitudes sum to 1, phases untouched.
    UnitySum,
}

impl Normalization {
    /// Returns a rescaled copy of `values`. The input is never modified.
    pub fn apply(self, values: &Array1<Complex64>) -> Result<Array1<Complex64>> {
        match self {
            Normalization::Max => {
                let peak = values.iter().map(|x| x.norm()).fold(0., f64::max);
                if peak == 0. {
                    return Err(SynthesisError::DegenerateNormalization { method: "max" });
                }
                Ok(values.mapv(|x| x / peak))
            }
            Normalization::ReferenceElement(index) => {
                let reference = *values.get(index).ok_or(SynthesisError::ReferenceOutOfRange {
                    index,
                    len: values.len(),
                })?;
                if reference.norm() == 0. {
                    return Err(SynthesisError::ZeroMagnitudeReference { index });
                }
                Ok(values.mapv(|x| x / reference))
            }
            Normalization::UnitySum => {
                let total: f64 = values.iter().map(|x| x.norm()).sum();
                if total == 0. {
                    return Err(SynthesisError::DegenerateNormalization {
                        method: "unity_sum",
                    });
                }
                Ok(values.mapv(|x| x / total))
            }
        }
    }

    /// Same as [Normalization::apply] for real-valued patterns.
    pub fn apply_real(self, values: &Array1<f64>) -> Result<Array1<f64>> {
        let complex = values.mapv(|x| Complex64::new(x, 0.));
        Ok(self.apply(&complex)?.mapv(|x| x.re))
    }
}

impl FromStr for Normalization {
    type Err = SynthesisError;

    fn from_str(s: &str) -> Result<Self> {
        let unknown = || SynthesisError::UnknownNormalization {
            value: s.to_owned(),
        };

        match s.trim() {
            "max" => Ok(Normalization::Max),
            "unity_sum" => Ok(Normalization::UnitySum),
            "reference_element" => Ok(Normalization::ReferenceElement(0)),
            other => {
                let index = match other.strip_prefix("reference_element:") {
                    Some(index) => index,
                    None => return Err(unknown()),
                };
                index
                    .trim()
                    .parse()
                    .map(Normalization::ReferenceElement)
                    .map_err(|_| unknown())
            }
        }
    }
}

impl TryFrom<String> for Normalization {
    type Error = SynthesisError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Normalization> for String {
    fn from(n: Normalization) -> String {
        n.to_string()
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Normalization::Max => write!(f, "max"),
            Normalization::ReferenceElement(i) => write!(f, "reference_element:{}", i),
            Normalization::UnitySum => write!(f, "unity_sum"),
        }
    }
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;
    use ndarray::array;
    use num::complex::Complex64;

    use super::Normalization;
    use crate::error::SynthesisError;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn max_scales_peak_to_one() {
        let values = array![c(1., 0.), c(0., -4.), c(2., 0.)];
        let out = Normalization::Max.apply(&values).unwrap();

        assert_relative_eq!(out[1].norm(), 1.);
        assert_relative_eq!(out[1].im, -1.);
        assert_relative_eq!(out[0].re, 0.25);
        // Input left alone.
        assert_relative_eq!(values[1].im, -4.);
    }

    #[test]
    fn reference_element_becomes_unity() {
        let values = array![c(0., 2.), c(3., 0.)];
        let out = Normalization::ReferenceElement(0).apply(&values).unwrap();

        assert_relative_eq!(out[0].re, 1.);
        assert_relative_eq!(out[0].im, 0.);
        assert_relative_eq!(out[1].im, -1.5);
    }

    #[test]
    fn zero_reference_names_the_index() {
        let values = array![c(1., 0.), c(0., 0.), c(2., 0.)];
        let err = Normalization::ReferenceElement(1)
            .apply(&values)
            .unwrap_err();

        assert_eq!(err, SynthesisError::ZeroMagnitudeReference { index: 1 });
        assert!(err.to_string().contains("element 1"));
    }

    #[test]
    fn reference_out_of_range() {
        let values = array![c(1., 0.)];
        assert_eq!(
            Normalization::ReferenceElement(3).apply(&values),
            Err(SynthesisError::ReferenceOutOfRange { index: 3, len: 1 })
        );
    }

    #[test]
    fn unity_sum_magnitudes() {
        let values = array![c(3., 0.), c(0., 1.)];
        let out = Normalization::UnitySum.apply(&values).unwrap();
        let total: f64 = out.iter().map(|x| x.norm()).sum();

        assert_relative_eq!(total, 1.);
    }

    #[test]
    fn all_zero_is_degenerate() {
        let values = array![c(0., 0.), c(0., 0.)];
        assert!(matches!(
            Normalization::Max.apply(&values),
            Err(SynthesisError::DegenerateNormalization { method: "max" })
        ));
        assert!(Normalization::UnitySum.apply(&values).is_err());
    }

    #[test]
    fn parse_identifiers() {
        assert_eq!("max".parse::<Normalization>(), Ok(Normalization::Max));
        assert_eq!("unity_sum".parse::<Normalization>(), Ok(Normalization::UnitySum));
        assert_eq!(
            "reference_element".parse::<Normalization>(),
            Ok(Normalization::ReferenceElement(0))
        );
        assert_eq!(
            "reference_element:7".parse::<Normalization>(),
            Ok(Normalization::ReferenceElement(7))
        );

        let err = "center".parse::<Normalization>().unwrap_err();
        assert_eq!(
            err,
            SynthesisError::UnknownNormalization {
                value: "center".into()
            }
        );
    }

    #[test]
    fn real_patterns() {
        let pattern = array![0.5, 2., 1.];
        let out = Normalization::Max.apply_real(&pattern).unwrap();
        assert_relative_eq!(out, array![0.25, 1., 0.5]);
    }
}
