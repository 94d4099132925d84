use std::f64::consts::PI;

use ndarray::Array1;

use crate::config::AngleUnit;

// Evenly spaced observation angles θ, always in radians, endpoints included. Every method and
// the evaluator sample on the same grid so indices line up across a result.
#[derive(Clone, Debug, PartialEq)]
pub struct AngleGrid {
    start: f64,
    end: f64,
    theta: Array1<f64>,
}

impl AngleGrid {
    // The full pattern, θ ∈ [0, π].
    pub fn full(samples: usize) -> AngleGrid {
        AngleGrid::span(0., PI, samples)
    }

    pub fn span(start: f64, end: f64, samples: usize) -> AngleGrid {
        assert!(start < end);
        assert!(samples >= 2);

        let step = (end - start) / (samples - 1) as f64;
        // Pin the last sample so the grid ends exactly on `end`.
        let theta = (0..samples)
            .map(|i| {
                if i == samples - 1 {
                    end
                } else {
                    start + step * i as f64
                }
            })
            .collect();

        AngleGrid { start, end, theta }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn len(&self) -> usize {
        self.theta.len()
    }

    pub fn is_empty(&self) -> bool {
        self.theta.is_empty()
    }

    pub fn step(&self) -> f64 {
        (self.end - self.start) / (self.len() - 1) as f64
    }

    pub fn theta(&self) -> &Array1<f64> {
        &self.theta
    }

    pub fn cos_theta(&self) -> Array1<f64> {
        self.theta.mapv(f64::cos)
    }

    // Index of the sample closest to `angle`.
    pub fn nearest_index(&self, angle: f64) -> usize {
        let i = ((angle - self.start) / self.step()).round();
        (i.max(0.) as usize).min(self.len() - 1)
    }

    // Angles expressed in `unit`, for presentation.
    pub fn in_unit(&self, unit: AngleUnit) -> Array1<f64> {
        self.theta.mapv(|x| unit.from_radians(x))
    }
}

impl From<AngleGrid> for Array1<f64> {
    fn from(grid: AngleGrid) -> Self {
        grid.theta
    }
}

#[cfg(test)]
mod test {
    use std::f64::consts::PI;

    use approx::assert_relative_eq;

    use super::AngleGrid;
    use crate::config::AngleUnit;

    #[test]
    fn full_grid_spans_zero_to_pi() {
        let grid = AngleGrid::full(16);
        assert_eq!(grid.len(), 16);
        assert_eq!(grid.theta()[0], 0.);
        assert_eq!(grid.theta()[15], PI);
        assert!(grid.theta().windows(2).into_iter().all(|w| w[0] < w[1]));
    }

    #[test]
    fn sub_range() {
        let grid = AngleGrid::span(PI / 4., PI / 2., 5);
        assert_relative_eq!(grid.step(), PI / 16.);
        assert_eq!(grid.theta()[4], PI / 2.);
        assert_eq!(grid.nearest_index(3. * PI / 8.), 2);
        assert_eq!(grid.nearest_index(-1.), 0);
        assert_eq!(grid.nearest_index(10.), 4);
    }

    #[test]
    fn odd_grid_hits_quarter_angles() {
        let grid = AngleGrid::full(361);
        assert_relative_eq!(grid.theta()[90], PI / 4., epsilon = 1e-15);
        let degrees = grid.in_unit(AngleUnit::Degrees);
        assert_relative_eq!(degrees[270], 135., epsilon = 1e-12);
    }
}
