//! Baseline estimation: the learned picture of "normal" for one sensor.
//!
//! A baseline is fit once from a batch of samples. It records the arithmetic
//! mean and the population standard deviation (divide by N). When every
//! sample is identical the deviation is zero, so the spread is floored to the
//! configured epsilon and later z-scores never divide by zero.
//!
//! Only an exactly-zero deviation is floored. A tiny but non-zero deviation
//! is kept as computed, so near-constant training data yields large z-scores.

use serde::{Deserialize, Serialize};

use crate::error::{SentinelError, SentinelResult};

/// Default floor applied to a zero standard deviation.
pub const DEFAULT_EPSILON: f64 = 1e-4;

/// Fitted location and spread of the normal signal.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    /// Arithmetic mean of the training samples.
    pub mean: f64,
    /// Population standard deviation, or `epsilon` when that is zero.
    /// Always strictly positive.
    pub spread: f64,
    /// Floor used when the samples have no variance.
    pub epsilon: f64,
    /// Number of samples the baseline was fit from.
    pub sample_count: usize,
}

impl Baseline {
    /// Fit a baseline from a batch of normal-operation samples.
    ///
    /// Fails with `InvalidArgument` when `samples` is empty or holds a
    /// non-finite value, when `epsilon` is not a positive finite number, or
    /// when the fitted mean or deviation would not be finite.
    pub fn fit(samples: &[f64], epsilon: f64) -> SentinelResult<Self> {
        validate_epsilon(epsilon)?;
        if samples.is_empty() {
            return Err(SentinelError::invalid(
                "samples",
                "must be a non-empty list of numeric values",
            ));
        }
        if let Some(pos) = samples.iter().position(|x| !x.is_finite()) {
            return Err(SentinelError::invalid(
                "samples",
                format!("value at index {} is not finite ({})", pos, samples[pos]),
            ));
        }

        // Identical samples have an exact zero deviation; summing them could
        // leave rounding noise instead.
        let origin = samples[0];
        if samples.iter().all(|&x| x == origin) {
            return Ok(Self {
                mean: origin,
                spread: epsilon,
                epsilon,
                sample_count: samples.len(),
            });
        }

        let (mean, std_dev) = scaled_moments(samples);
        if !mean.is_finite() || !std_dev.is_finite() {
            return Err(SentinelError::invalid(
                "samples",
                format!("mean {} / deviation {} is not representable", mean, std_dev),
            ));
        }
        let spread = if std_dev > 0.0 { std_dev } else { epsilon };

        Ok(Self {
            mean,
            spread,
            epsilon,
            sample_count: samples.len(),
        })
    }

    /// Normalized distance of `reading` from the mean, in units of spread.
    pub fn z_score(&self, reading: f64) -> f64 {
        (reading - self.mean).abs() / self.spread
    }

    /// Whether the spread came from the epsilon floor rather than the data.
    pub fn is_floored(&self) -> bool {
        self.spread == self.epsilon
    }
}

/// Mean and population standard deviation of non-constant, finite samples.
///
/// Samples are divided by a power of two near their largest magnitude, so the
/// sums and squares stay within range for any finite input. A power-of-two
/// scale is exact, which keeps the mean identical to `sum / n` wherever that
/// does not overflow.
fn scaled_moments(samples: &[f64]) -> (f64, f64) {
    let n = samples.len() as f64;
    let max_abs = samples.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
    let scale = max_abs.log2().floor().exp2();

    let mean = samples.iter().map(|x| x / scale).sum::<f64>() / n;
    let variance = samples
        .iter()
        .map(|x| (x / scale - mean).powi(2))
        .sum::<f64>()
        / n;

    (mean * scale, variance.sqrt() * scale)
}

pub(crate) fn validate_epsilon(epsilon: f64) -> SentinelResult<()> {
    if epsilon.is_finite() && epsilon > 0.0 {
        Ok(())
    } else {
        Err(SentinelError::invalid(
            "epsilon",
            format!("must be a positive finite number, got {}", epsilon),
        ))
    }
}
