use ndarray::Array1;
use num::complex::Complex64;

use crate::helper::NUMERICAL_ZERO_THRESHOLD;

/**
Expands Π (z - r_k) into coefficients, lowest degree first.

The coefficients live in a fixed accumulator of length `roots.len() + 1`; each root is folded
in by convolving the current coefficients with the binomial [-r, 1]. Index n of the output is
the coefficient of z^n, so it can be read directly as the excitation of element n. The
highest-degree coefficient is always 1.
*/
pub fn poly_from_roots(roots: &[Complex64]) -> Array1<Complex64> {
    let mut coeffs = Array1::zeros(roots.len() + 1);
    coeffs[0] = Complex64::new(1., 0.);

    for (degree, &r) in roots.iter().enumerate() {
        // After this step the polynomial has degree `degree + 1`. Walk downwards so every read
        // sees the previous step's value.
        for n in (1..=degree + 1).rev() {
            coeffs[n] = coeffs[n - 1] - r * coeffs[n];
        }
        coeffs[0] = -r * coeffs[0];
    }

    coeffs
}

/// Evaluates Σ c_n z^n by Horner's rule.
pub fn evaluate(coeffs: &Array1<Complex64>, z: Complex64) -> Complex64 {
    coeffs
        .iter()
        .rev()
        .fold(Complex64::new(0., 0.), |acc, &c| acc * z + c)
}

/// Chebyshev polynomial of the first kind, T_n(x), valid for every real x.
pub fn T(n: usize, x: f64) -> f64 {
    let n1 = n as f64;
    if (-1. ..=1.).contains(&x) {
        (n1 * x.acos()).cos()
    } else if x > 1. {
        (n1 * x.acosh()).cosh()
    } else {
        (-1f64).powi(n as i32) * (n1 * (-x).acosh()).cosh()
    }
}

/**
Renders coefficients as a polynomial in z, e.g. `1.0000 - 2.0000·z + z^2`.

Terms with negligible magnitude are dropped, real coefficients of exactly ±1 are written as
the bare power (except the constant term), and complex coefficients are written in
parentheses as `(a+bj)`.
*/
pub fn display(coeffs: &Array1<Complex64>, decimals: usize) -> String {
    let visible = 10f64.powi(-(decimals as i32));
    let mut out = String::new();

    for (n, c) in coeffs.iter().enumerate() {
        if c.norm() < NUMERICAL_ZERO_THRESHOLD {
            continue;
        }

        let show_re = c.re.abs() >= visible;
        let show_im = c.im.abs() >= visible;
        if !show_re && !show_im {
            continue;
        }

        let leading = if show_re { c.re } else { c.im };
        let negative = leading < 0.;
        let magnitude_text = match (show_re, show_im) {
            (true, false) => format!("{:.*}", decimals, c.re.abs()),
            (false, true) => format!("{:.*}j", decimals, c.im.abs()),
            _ => {
                // The sign of the leading part is factored out in front of the parentheses.
                let s = if negative { -1. } else { 1. };
                format!("({:.*}{:+.*}j)", decimals, s * c.re, decimals, s * c.im)
            }
        };

        let unit = n > 0 && !show_im && (c.re.abs() - 1.).abs() < visible;
        let power = match n {
            0 => String::new(),
            1 => "z".to_owned(),
            _ => format!("z^{}", n),
        };
        let term = match (unit, power.is_empty()) {
            (true, _) => power,
            (false, true) => magnitude_text,
            (false, false) => format!("{}·{}", magnitude_text, power),
        };

        match (out.is_empty(), negative) {
            (true, true) => out.push('-'),
            (true, false) => {}
            (false, true) => out.push_str(" - "),
            (false, false) => out.push_str(" + "),
        }
        out.push_str(&term);
    }

    if out.is_empty() {
        "0".to_owned()
    } else {
        out
    }
}
