//! # Pitch Detection Module
//!
//! Monophonic fundamental-frequency estimation for the singing voice using
//! time-domain autocorrelation.
//!
//! ## Features
//! - Autocorrelation computed through the FFT (see [`crate::fft`])
//! - Lag floor that skips the zero-lag peak
//! - Absolute correlation threshold that rejects silence and weak noise
//! - Parabolic interpolation for sub-sample lag accuracy
//! - Voice band guard on the final frequency

use tracing::trace;

use crate::config::EstimatorConfig;
use crate::fft::Autocorrelator;

/// One block of mono samples in `[-1, 1]` at a fixed sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioFrame {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Autocorrelation pitch estimator.
///
/// Holds the FFT plans between frames; otherwise stateless, so each call
/// depends only on the frame passed in.
pub struct PitchEstimator {
    config: EstimatorConfig,
    autocorrelator: Autocorrelator,
}

impl Default for PitchEstimator {
    fn default() -> Self {
        Self::new(EstimatorConfig::default())
    }
}

impl PitchEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self {
            config,
            autocorrelator: Autocorrelator::new(),
        }
    }

    /// Estimates the fundamental frequency of one frame.
    ///
    /// # Returns
    /// * `Some(frequency)` - Frequency in Hz inside the configured band
    /// * `None` - Silence, noise, or a pitch outside the band
    pub fn estimate(&mut self, frame: &AudioFrame) -> Option<f32> {
        let n = frame.len();
        let corr = self.autocorrelator.autocorrelate(&frame.samples);

        // --- Peak search between the lag floor and half the frame ---
        let max_lag = (n / 2).min(n.saturating_sub(1));
        let best_lag = find_best_lag(&corr, self.config.min_lag, max_lag, self.config.correlation_threshold)?;

        // --- Parabolic interpolation for sub-sample precision ---
        let refined_lag = refine_lag(&corr, best_lag);

        let frequency = frame.sample_rate as f32 / refined_lag;

        // --- Final guard: voice band only ---
        if frequency.is_finite()
            && frequency >= self.config.min_frequency
            && frequency <= self.config.max_frequency
        {
            trace!(lag = refined_lag, frequency, "pitch detected");
            Some(frequency)
        } else {
            None
        }
    }
}

/// Finds the lag in `min_lag..=max_lag` with the largest correlation.
///
/// Ties keep the smallest lag. Returns `None` when the range is empty or
/// the winning value does not exceed `threshold`.
fn find_best_lag(corr: &[f32], min_lag: usize, max_lag: usize, threshold: f32) -> Option<usize> {
    if min_lag > max_lag || max_lag >= corr.len() {
        return None;
    }

    let mut best_lag = min_lag;
    let mut best_value = corr[min_lag];
    for (lag, &value) in corr.iter().enumerate().take(max_lag + 1).skip(min_lag + 1) {
        if value > best_value {
            best_lag = lag;
            best_value = value;
        }
    }

    if best_value > threshold {
        Some(best_lag)
    } else {
        None
    }
}

/// Fits a parabola through the peak and its neighbours.
///
/// When the period is just below the lag floor the winning lag sits on the
/// falling edge of the true peak, and the vertex lies below `lag`.
/// At the buffer edge or when the three points are collinear the integer
/// lag is returned unchanged.
fn refine_lag(corr: &[f32], lag: usize) -> f32 {
    if lag == 0 || lag + 1 >= corr.len() {
        return lag as f32;
    }

    let left = corr[lag - 1];
    let center = corr[lag];
    let right = corr[lag + 1];
    let denominator = left - 2.0 * center + right;
    if denominator == 0.0 {
        return lag as f32;
    }

    let delta = 0.5 * (left - right) / denominator;
    if delta.is_finite() {
        lag as f32 + delta
    } else {
        lag as f32
    }
}
