use ndarray::Array1;
use serde::Serialize;

use crate::{
    array_factor::ArrayFactorResult,
    helper::{decibels, k, progressive_phase, trapezoid, EPSILON},
};

// A minimum at or below this level counts as a realized null.
pub const NULL_DEPTH_DB: f64 = -40.;

// Half power relative to the peak.
const HALF_POWER_DB: f64 = -3.;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternMetrics {
    pub peak_angle: f64,
    pub half_power_beamwidth: Option<f64>,
    pub directivity: f64,
    pub directivity_db: f64,
    // Range of ψ = k·d·cos θ + α seen over θ ∈ [0, π].
    pub visible_margin: (f64, f64),
    pub realized_nulls: Vec<f64>,
    // How far below the main lobe the strongest remaining sample sits, as a positive number.
    pub sidelobe_level_db: Option<f64>,
}

/// 20·log10(|AF|/max|AF|) with a tiny offset instead of a floor.
pub fn unclamped_db(magnitude: &Array1<f64>) -> Array1<f64> {
    let peak = magnitude.fold(EPSILON, |max: f64, &x| max.max(x));
    magnitude.mapv(|m| decibels(m / peak + EPSILON))
}

/// Indices bounding the lobe around `peak`: walk outwards while the level keeps falling.
pub fn main_lobe(db: &Array1<f64>, peak: usize) -> (usize, usize) {
    let mut left = peak;
    while left > 0 && db[left - 1] <= db[left] {
        left -= 1;
    }

    let mut right = peak;
    while right + 1 < db.len() && db[right + 1] <= db[right] {
        right += 1;
    }

    (left, right)
}

// Linear interpolation of the θ where the level crosses `level` between samples i and j.
fn crossing(db: &Array1<f64>, theta: &Array1<f64>, i: usize, j: usize, level: f64) -> f64 {
    let span = db[j] - db[i];
    if span.abs() < EPSILON {
        return theta[i];
    }
    theta[i] + (level - db[i]) / span * (theta[j] - theta[i])
}

/// Width in radians between the -3 dB points on either side of `peak`, if both are on the grid.
pub fn half_power_beamwidth(db: &Array1<f64>, theta: &Array1<f64>, peak: usize) -> Option<f64> {
    let left = (0..peak).rev().find(|&i| db[i] < HALF_POWER_DB)?;
    let right = (peak + 1..db.len()).find(|&i| db[i] < HALF_POWER_DB)?;

    let θl = crossing(db, theta, left, left + 1, HALF_POWER_DB);
    let θr = crossing(db, theta, right - 1, right, HALF_POWER_DB);
    Some(θr - θl)
}

/// D = 2·max|AF|² / ∫|AF|² sin θ dθ for a pattern symmetric about the array axis.
pub fn directivity(magnitude: &Array1<f64>, theta: &Array1<f64>) -> f64 {
    let power = magnitude.mapv(|m| m * m);
    let peak = power.fold(0., |max: f64, &x| max.max(x));
    let integral = trapezoid(&(&power * &theta.mapv(f64::sin)), theta);

    if integral < EPSILON {
        return 0.;
    }
    2. * peak / integral
}

/// Angles of local minima at or below [NULL_DEPTH_DB], grid edges included.
pub fn realized_nulls(db: &Array1<f64>, theta: &Array1<f64>) -> Vec<f64> {
    let n = db.len();
    (0..n)
        .filter(|&i| db[i] <= NULL_DEPTH_DB)
        .filter(|&i| {
            let below_left = i == 0 || db[i] < db[i - 1];
            let below_right = i + 1 == n || db[i] <= db[i + 1];
            below_left && below_right
        })
        .map(|i| theta[i])
        .collect()
}

/// Strongest level outside the main lobe, as a positive number of dB below the peak.
pub fn sidelobe_level(db: &Array1<f64>, peak: usize) -> Option<f64> {
    let (left, right) = main_lobe(db, peak);
    db.iter()
        .enumerate()
        .filter(|&(i, _)| i < left || i > right)
        .map(|(_, &x)| x)
        .fold(None, |best: Option<f64>, x| Some(best.map_or(x, |b| b.max(x))))
        .map(|x| -x)
}

/// Figures of merit of a sampled pattern. Levels are unclamped, so nulls below the display
/// floor still count.
pub fn compute(
    af: &ArrayFactorResult,
    theta: &Array1<f64>,
    d_lambda: f64,
    theta0: f64,
) -> PatternMetrics {
    let db = unclamped_db(af.magnitude());
    let peak = af.peak_index();
    let directivity = directivity(af.magnitude(), theta);
    let α = progressive_phase(d_lambda, theta0);
    let kd = k * d_lambda;

    PatternMetrics {
        peak_angle: theta[peak],
        half_power_beamwidth: half_power_beamwidth(&db, theta, peak),
        directivity,
        directivity_db: if directivity > 0. {
            10. * directivity.log10()
        } else {
            f64::NEG_INFINITY
        },
        visible_margin: (α - kd, α + kd),
        realized_nulls: realized_nulls(&db, theta),
        sidelobe_level_db: sidelobe_level(&db, peak),
    }
}
