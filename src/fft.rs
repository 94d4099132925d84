use std::sync::Arc;

use ndarray::Array1;
use num::complex::Complex64;
use rustfft::FftPlanner;

pub trait FFT {
    fn fft_planned(self, plan: &Arc<dyn rustfft::Fft<f64>>) -> Array1<Complex64>;
    fn fft(self) -> Array1<Complex64>;

    fn ifft(self) -> Array1<Complex64>;
}

impl FFT for Array1<f64> {
    fn fft(self) -> Array1<Complex64> {
        self.mapv(|x| Complex64::new(x, 0.)).fft()
    }

    fn ifft(self) -> Array1<Complex64> {
        self.mapv(|x| Complex64::new(x, 0.)).ifft()
    }

    fn fft_planned(self, plan: &Arc<dyn rustfft::Fft<f64>>) -> Array1<Complex64> {
        self.mapv(|x| Complex64::new(x, 0.)).fft_planned(plan)
    }
}

impl FFT for Array1<Complex64> {
    fn fft_planned(self, plan: &Arc<dyn rustfft::Fft<f64>>) -> Array1<Complex64> {
        // Arrays built by collect or mapv are always contiguous, but go through a Vec so a
        // strided view can never reach the planner.
        let mut buffer = self.to_vec();
        plan.process(&mut buffer);

        Array1::from(buffer)
    }

    fn fft(self) -> Array1<Complex64> {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(self.len());

        self.fft_planned(&fft)
    }

    fn ifft(self) -> Array1<Complex64> {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_inverse(self.len());

        let N = self.len() as f64;

        self.fft_planned(&fft) / Complex64::new(N, 0.)
    }
}

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;
    use ndarray::Array1;
    use num::complex::Complex64;

    use super::FFT;

    #[test]
    fn ifft_commutes_with_fft() {
        let signal: Array1<Complex64> = (0..12)
            .map(|n| Complex64::from_polar(1. + 0.1 * n as f64, 0.37 * (n * n) as f64))
            .collect();

        let there_and_back = signal.clone().fft().ifft();
        for (got, want) in signal.iter().zip(there_and_back.iter()) {
            assert_abs_diff_eq!((got - want).norm(), 0., epsilon = 1e-12);
        }

        let back_and_there = signal.clone().ifft().fft();
        for (got, want) in signal.iter().zip(back_and_there.iter()) {
            assert_abs_diff_eq!((got - want).norm(), 0., epsilon = 1e-12);
        }
    }

    #[test]
    fn constant_transforms_to_impulse() {
        let out = Array1::from_elem(8, 1f64).fft();
        assert_abs_diff_eq!(out[0].re, 8., epsilon = 1e-12);
        for x in out.iter().skip(1) {
            assert_abs_diff_eq!(x.norm(), 0., epsilon = 1e-12);
        }
    }
}
