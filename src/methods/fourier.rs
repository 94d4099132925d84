use std::f64::consts::PI;

use ndarray::Array1;
use num::complex::Complex64;

use super::{MethodMetadata, Synthesized};
use crate::{
    angle_grid::AngleGrid,
    helper::{k, steer, trapezoid},
    params::{BeamRegion, BeamShape},
    pattern_metrics,
};

/// Target amplitude of one region at θ.
pub fn beam_amplitude(θ: f64, beam: &BeamRegion, shape: BeamShape) -> f64 {
    match shape {
        BeamShape::Rectangular => {
            if beam.start <= θ && θ <= beam.end {
                1.
            } else {
                0.
            }
        }
        BeamShape::Triangular => {
            let half_width = 0.5 * (beam.end - beam.start);
            let centre = beam.start + half_width;
            (1. - (θ - centre).abs() / half_width).max(0.)
        }
    }
}

// Regions add. Overlaps are not clipped, so the target is linear in its beams.
pub fn target(θ: f64, beams: &[BeamRegion], shape: BeamShape) -> f64 {
    beams.iter().map(|beam| beam_amplitude(θ, beam, shape)).sum()
}

pub fn desired_pattern(theta: &Array1<f64>, beams: &[BeamRegion], shape: BeamShape) -> Array1<f64> {
    theta.mapv(|θ| target(θ, beams, shape))
}

/**
Fourier coefficients of the target, unsteered.

c_m = 1/(2π) ∫ F(ψ) e^{-jmψ} dψ with m = n - (N-1)/2 and F the target at θ = acos(ψ/(k·d)),
zero outside the visible region. The integral covers the whole visible band |ψ| <= k·d, so for
d > λ/2 the parts of the target beyond one period fold onto their images instead of being lost.
`samples` is the trapezoid density per 2π of ψ.
*/
pub fn coefficients(
    n: usize,
    d_lambda: f64,
    beams: &[BeamRegion],
    shape: BeamShape,
    samples: usize,
) -> Array1<Complex64> {
    let kd = k * d_lambda;
    let band = kd.max(PI);
    let samples = ((samples as f64) * band / PI).ceil() as usize;
    let ψ = Array1::linspace(-band, band, samples);
    let F = ψ.mapv(|ψ| {
        let u = ψ / kd;
        if u.abs() <= 1. {
            target(u.acos(), beams, shape)
        } else {
            0.
        }
    });

    let centre = (n as f64 - 1.) / 2.;
    (0..n)
        .map(|i| {
            let m = i as f64 - centre;
            let re = trapezoid(&(&F * &ψ.mapv(|ψ| (m * ψ).cos())), &ψ);
            let im = trapezoid(&(&F * &ψ.mapv(|ψ| -(m * ψ).sin())), &ψ);
            Complex64::new(re, im) / (2. * PI)
        })
        .collect()
}

pub fn excitations(
    n: usize,
    d_lambda: f64,
    θ0: f64,
    beams: &[BeamRegion],
    shape: BeamShape,
    samples: usize,
) -> Array1<Complex64> {
    steer(&coefficients(n, d_lambda, beams, shape, samples), d_lambda, θ0)
}

pub fn synthesize(
    n: usize,
    d_lambda: f64,
    θ0: f64,
    beams: &[BeamRegion],
    shape: BeamShape,
    grid: &AngleGrid,
    samples: usize,
) -> Synthesized {
    let desired = desired_pattern(grid.theta(), beams, shape);
    let directivity = pattern_metrics::directivity(&desired, grid.theta());

    Synthesized {
        excitations: excitations(n, d_lambda, θ0, beams, shape, samples),
        metadata: MethodMetadata::Fourier {
            beam_shape: shape,
            beams: beams.to_vec(),
            desired_pattern: desired.to_vec(),
            desired_directivity: directivity,
            desired_directivity_db: 10. * directivity.log10(),
        },
    }
}

#[cfg(test)]
mod test {
    use std::f64::consts::PI;

    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use proptest::prelude::*;

    use super::{beam_amplitude, coefficients, excitations, target};
    use crate::{
        array_factor::array_factor_at,
        params::{BeamRegion, BeamShape},
    };

    fn region(start_deg: f64, end_deg: f64) -> BeamRegion {
        BeamRegion {
            start: start_deg.to_radians(),
            end: end_deg.to_radians(),
        }
    }

    #[test]
    fn shapes() {
        let beam = region(60., 120.);
        assert_eq!(beam_amplitude(PI / 2., &beam, BeamShape::Rectangular), 1.);
        assert_eq!(beam_amplitude(0.2, &beam, BeamShape::Rectangular), 0.);
        assert_relative_eq!(beam_amplitude(PI / 2., &beam, BeamShape::Triangular), 1.);
        assert_relative_eq!(
            beam_amplitude(75f64.to_radians(), &beam, BeamShape::Triangular),
            0.5,
            epsilon = 1e-12
        );
        assert_eq!(beam_amplitude(PI / 6., &beam, BeamShape::Triangular), 0.);
    }

    #[test]
    fn overlapping_regions_add() {
        let beams = [region(40., 100.), region(80., 140.)];
        assert_eq!(target(PI / 2., &beams, BeamShape::Rectangular), 2.);
    }

    #[test]
    fn sector_beam() {
        let beams = [region(60., 120.)];
        let out = excitations(21, 0.5, PI / 2., &beams, BeamShape::Rectangular, 3600);

        let inside = array_factor_at(&out, 0.5, PI / 2.).norm();
        let outside = array_factor_at(&out, 0.5, 20f64.to_radians()).norm();
        assert_abs_diff_eq!(inside, 1., epsilon = 0.1);
        assert!(inside > 5. * outside);
    }

    #[test]
    fn wide_spacing_keeps_beams_past_one_period() {
        // At d = 0.75λ the 30° to 50° sector sits at k·d·cos θ > π.
        let beams = [region(30., 50.)];
        let out = excitations(16, 0.75, PI / 2., &beams, BeamShape::Rectangular, 1441);
        let inside = array_factor_at(&out, 0.75, 40f64.to_radians()).norm();
        assert!(inside > 0.7, "|AF(40°)| = {inside}");

        // At d = λ a sector near endfire lies entirely beyond ψ = π.
        let beams = [region(10., 30.)];
        let out = excitations(10, 1., PI / 2., &beams, BeamShape::Rectangular, 1441);
        assert!(out.iter().any(|c| c.norm() > 1e-3));
        let inside = array_factor_at(&out, 1., 20f64.to_radians()).norm();
        assert!(inside > 0.7, "|AF(20°)| = {inside}");
    }

    #[test]
    fn symmetric_target_has_real_coefficients() {
        // A region symmetric about broadside gives an even F(ψ).
        let out = coefficients(9, 0.5, &[region(60., 120.)], BeamShape::Triangular, 2001);
        for (i, c) in out.iter().enumerate() {
            assert_abs_diff_eq!(c.im, 0., epsilon = 1e-9);
            assert_abs_diff_eq!(c.re, out[8 - i].re, epsilon = 1e-9);
        }
    }

    proptest! {
        #[test]
        fn linear_in_beams(
            n in 2usize..24,
            d in 0.2f64..1.,
            low in 5f64..80.,
            high in 100f64..170.,
            width in 2f64..9.,
            triangular in any::<bool>(),
        ) {
            let shape = if triangular { BeamShape::Triangular } else { BeamShape::Rectangular };
            let first = region(low, low + width);
            let second = region(high, high + width);

            let both = excitations(n, d, PI / 2., &[first, second], shape, 720);
            let one = excitations(n, d, PI / 2., &[first], shape, 720);
            let other = excitations(n, d, PI / 2., &[second], shape, 720);

            for i in 0..n {
                prop_assert!((both[i] - one[i] - other[i]).norm() < 1e-12);
            }
        }
    }
}
