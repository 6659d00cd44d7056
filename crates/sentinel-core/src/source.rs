//! Reading sources for the monitoring loop, including a simulated motion sensor.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::{SentinelError, SentinelResult};

/// Produces one reading per call.
pub trait ReadingSource {
    fn next_reading(&mut self) -> f64;
}

impl<F> ReadingSource for F
where
    F: FnMut() -> f64,
{
    fn next_reading(&mut self) -> f64 {
        self()
    }
}

// ── Simulation ──────────────────────────────────────────────────────────

/// Parameters of the simulated motion-count sensor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Samples generated for the training batch.
    #[serde(default = "default_training_samples")]
    pub training_samples: usize,
    /// Mean of normal activity.
    #[serde(default = "default_normal_mean")]
    pub normal_mean: f64,
    /// Standard deviation of normal activity.
    #[serde(default = "default_normal_std_dev")]
    pub normal_std_dev: f64,
    /// Probability that a live reading is an intruder spike.
    #[serde(default = "default_spike_probability")]
    pub spike_probability: f64,
    /// Lower bound of a spike (inclusive).
    #[serde(default = "default_spike_min")]
    pub spike_min: f64,
    /// Upper bound of a spike (exclusive).
    #[serde(default = "default_spike_max")]
    pub spike_max: f64,
    /// RNG seed; entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_training_samples() -> usize {
    100
}

fn default_normal_mean() -> f64 {
    5.0
}

fn default_normal_std_dev() -> f64 {
    1.0
}

fn default_spike_probability() -> f64 {
    0.05
}

fn default_spike_min() -> f64 {
    12.0
}

fn default_spike_max() -> f64 {
    20.0
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            training_samples: default_training_samples(),
            normal_mean: default_normal_mean(),
            normal_std_dev: default_normal_std_dev(),
            spike_probability: default_spike_probability(),
            spike_min: default_spike_min(),
            spike_max: default_spike_max(),
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> SentinelResult<()> {
        if self.training_samples == 0 {
            return Err(SentinelError::invalid("training_samples", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.spike_probability) {
            return Err(SentinelError::invalid(
                "spike_probability",
                format!("must be within 0..=1, got {}", self.spike_probability),
            ));
        }
        if !(self.spike_min.is_finite() && self.spike_max.is_finite())
            || self.spike_min >= self.spike_max
        {
            return Err(SentinelError::invalid(
                "spike_min",
                format!(
                    "spike range {}..{} must be finite and non-empty",
                    self.spike_min, self.spike_max
                ),
            ));
        }
        Ok(())
    }
}

/// Simulated motion sensor: mostly Gaussian noise, occasionally a spike.
pub struct SimulatedSensor {
    normal: Normal<f64>,
    spike_probability: f64,
    spike_min: f64,
    spike_max: f64,
    rng: StdRng,
}

impl SimulatedSensor {
    pub fn new(config: &SimulationConfig) -> SentinelResult<Self> {
        config.validate()?;
        let normal = Normal::new(config.normal_mean, config.normal_std_dev).map_err(|e| {
            SentinelError::invalid("normal_std_dev", format!("{}", e))
        })?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            normal,
            spike_probability: config.spike_probability,
            spike_min: config.spike_min,
            spike_max: config.spike_max,
            rng,
        })
    }

    /// Draw `count` readings of normal activity (no spikes).
    pub fn normal_samples(&mut self, count: usize) -> Vec<f64> {
        (0..count).map(|_| self.normal.sample(&mut self.rng)).collect()
    }
}

impl ReadingSource for SimulatedSensor {
    fn next_reading(&mut self) -> f64 {
        if self.rng.gen::<f64>() < self.spike_probability {
            self.rng.gen_range(self.spike_min..self.spike_max)
        } else {
            self.normal.sample(&mut self.rng)
        }
    }
}
