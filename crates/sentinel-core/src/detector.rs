//! Intrusion detector: learns a baseline, then classifies single readings.
//!
//! ## Lifecycle
//!
//! ```text
//!   Untrained ──learn_normal(samples)──► Trained(Baseline)
//!                                           │   ▲
//!                                           │   └── learn_normal again replaces it
//!                                           ▼
//!                                   detect(reading) ──► Detection { is_anomalous, score }
//! ```
//!
//! `detect` on an untrained detector is a programming error and fails with
//! `SentinelError::NotTrained`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::baseline::{validate_epsilon, Baseline, DEFAULT_EPSILON};
use crate::error::{SentinelError, SentinelResult};

/// Default z-score threshold.
pub const DEFAULT_SENSITIVITY: f64 = 3.0;

// ── Configuration ───────────────────────────────────────────────────────

/// Detector parameters, fixed at construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Z-score above which a reading is anomalous (default: 3.0).
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f64,
    /// Floor for a zero standard deviation (default: 1e-4).
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
}

fn default_sensitivity() -> f64 {
    DEFAULT_SENSITIVITY
}

fn default_epsilon() -> f64 {
    DEFAULT_EPSILON
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            sensitivity: DEFAULT_SENSITIVITY,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl DetectorConfig {
    pub fn new(sensitivity: f64, epsilon: f64) -> Self {
        Self {
            sensitivity,
            epsilon,
        }
    }

    /// Reject parameters the detector cannot work with.
    pub fn validate(&self) -> SentinelResult<()> {
        if !self.sensitivity.is_finite() || self.sensitivity < 0.0 {
            return Err(SentinelError::invalid(
                "sensitivity",
                format!("must be a non-negative finite number, got {}", self.sensitivity),
            ));
        }
        validate_epsilon(self.epsilon)
    }
}

// ── Result ──────────────────────────────────────────────────────────────

/// Outcome of classifying one reading.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// `score > sensitivity`.
    pub is_anomalous: bool,
    /// `|reading - mean| / spread`.
    pub score: f64,
}

impl From<Detection> for (bool, f64) {
    fn from(d: Detection) -> Self {
        (d.is_anomalous, d.score)
    }
}

// ── Detector ────────────────────────────────────────────────────────────

/// Training state of a detector.
#[derive(Clone, Debug, PartialEq)]
pub enum DetectorState {
    Untrained,
    Trained(Baseline),
}

/// Z-score intrusion detector for a single numeric signal.
#[derive(Clone, Debug)]
pub struct IntrusionDetector {
    config: DetectorConfig,
    state: DetectorState,
}

impl IntrusionDetector {
    /// Create an untrained detector. Fails if the configuration is invalid.
    pub fn new(config: DetectorConfig) -> SentinelResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: DetectorState::Untrained,
        })
    }

    /// Create an untrained detector with the given threshold and default epsilon.
    pub fn with_sensitivity(sensitivity: f64) -> SentinelResult<Self> {
        Self::new(DetectorConfig {
            sensitivity,
            ..DetectorConfig::default()
        })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn sensitivity(&self) -> f64 {
        self.config.sensitivity
    }

    pub fn state(&self) -> &DetectorState {
        &self.state
    }

    /// The learned baseline, if training has happened.
    pub fn baseline(&self) -> Option<&Baseline> {
        match &self.state {
            DetectorState::Trained(baseline) => Some(baseline),
            DetectorState::Untrained => None,
        }
    }

    pub fn is_trained(&self) -> bool {
        matches!(self.state, DetectorState::Trained(_))
    }

    /// Learn mean and spread from normal-operation samples.
    ///
    /// Replaces any previous baseline. On error the previous state is kept.
    pub fn learn_normal(&mut self, samples: &[f64]) -> SentinelResult<()> {
        let baseline = Baseline::fit(samples, self.config.epsilon)?;
        debug!(
            samples = baseline.sample_count,
            mean = baseline.mean,
            spread = baseline.spread,
            floored = baseline.is_floored(),
            "baseline learned"
        );
        self.state = DetectorState::Trained(baseline);
        Ok(())
    }

    /// Classify a reading against the learned baseline.
    pub fn detect(&self, reading: f64) -> SentinelResult<Detection> {
        let baseline = self.baseline().ok_or(SentinelError::NotTrained)?;
        let score = baseline.z_score(reading);
        Ok(Detection {
            is_anomalous: score > self.config.sensitivity,
            score,
        })
    }
}

impl Default for IntrusionDetector {
    fn default() -> Self {
        Self {
            config: DetectorConfig::default(),
            state: DetectorState::Untrained,
        }
    }
}
