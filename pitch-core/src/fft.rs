//! # Fast Fourier Transform (FFT) Module
//!
//! Autocorrelation through the frequency domain. The direct sum costs
//! O(N²) per frame, which is too slow for 4096-sample frames at display
//! rate; the Wiener-Khinchin route (power spectrum, then inverse FFT) is
//! O(N log N).
//!
//! The signal is zero-padded to at least twice its length so the inverse
//! transform yields the linear autocorrelation rather than the circular one.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Reusable autocorrelation engine.
///
/// Plans are cached by the planner, so repeated frames of the same length
/// only pay for planning once.
pub struct Autocorrelator {
    planner: FftPlanner<f32>,
    scratch: Vec<Complex<f32>>,
}

impl Default for Autocorrelator {
    fn default() -> Self {
        Self::new()
    }
}

impl Autocorrelator {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
            scratch: Vec::new(),
        }
    }

    /// Returns `corr[L] = Σ signal[i] * signal[i + L]` for `L` in `0..signal.len()`.
    ///
    /// `corr[0]` is the signal energy. No normalization is applied.
    pub fn autocorrelate(&mut self, signal: &[f32]) -> Vec<f32> {
        let n = signal.len();
        if n == 0 {
            return Vec::new();
        }

        let padded_len = (2 * n).next_power_of_two();
        let forward: Arc<dyn Fft<f32>> = self.planner.plan_fft_forward(padded_len);
        let inverse: Arc<dyn Fft<f32>> = self.planner.plan_fft_inverse(padded_len);

        let buffer = &mut self.scratch;
        buffer.clear();
        buffer.extend(signal.iter().map(|&sample| Complex { re: sample, im: 0.0 }));
        buffer.resize(padded_len, Complex { re: 0.0, im: 0.0 });

        forward.process(buffer);
        for bin in buffer.iter_mut() {
            // |X|² is the power spectrum
            *bin = Complex { re: bin.norm_sqr(), im: 0.0 };
        }
        inverse.process(buffer);

        // rustfft does not normalize, so the round trip scales by padded_len.
        let scale = 1.0 / padded_len as f32;
        buffer[..n].iter().map(|c| c.re * scale).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Direct O(N²) sum, the reference for the FFT route.
    fn autocorrelate_direct(signal: &[f32]) -> Vec<f32> {
        let n = signal.len();
        (0..n)
            .map(|lag| {
                signal[..n - lag]
                    .iter()
                    .zip(&signal[lag..])
                    .map(|(a, b)| a * b)
                    .sum::<f32>()
            })
            .collect()
    }

    #[test]
    fn empty_signal_has_empty_correlation() {
        assert!(Autocorrelator::new().autocorrelate(&[]).is_empty());
    }

    #[test]
    fn silence_correlates_to_zero() {
        let corr = Autocorrelator::new().autocorrelate(&[0.0; 512]);
        assert_eq!(corr.len(), 512);
        assert!(corr.iter().all(|&c| c == 0.0));
    }

    #[test]
    fn matches_direct_sum() {
        let mut rng = StdRng::seed_from_u64(7);
        let signal: Vec<f32> = (0..700).map(|_| rng.gen_range(-1.0..1.0)).collect();

        let fast = Autocorrelator::new().autocorrelate(&signal);
        let direct = autocorrelate_direct(&signal);

        assert_eq!(fast.len(), direct.len());
        let energy = direct[0];
        for (lag, (a, b)) in fast.iter().zip(&direct).enumerate() {
            assert!((a - b).abs() < energy * 1e-4, "lag {lag}: {a} vs {b}");
        }
    }

    #[test]
    fn zero_lag_is_energy() {
        let signal = [0.5, -0.25, 1.0, 0.0];
        let corr = Autocorrelator::new().autocorrelate(&signal);
        assert!((corr[0] - 1.3125).abs() < 1e-5);
        // lag 3: 0.5 * 0.0
        assert!(corr[3].abs() < 1e-5);
    }

    #[test]
    fn planner_is_reused_across_lengths() {
        let mut engine = Autocorrelator::new();
        let a = engine.autocorrelate(&[1.0; 100]);
        let b = engine.autocorrelate(&[1.0; 30]);
        assert!((a[0] - 100.0).abs() < 1e-3);
        assert!((b[29] - 1.0).abs() < 1e-3);
    }
}
