//! Configuration for the sentinel monitor.
//!
//! Layered with the `config` crate: built-in defaults, then an optional file
//! (TOML, JSON or YAML by extension), then `SENTINEL_`-prefixed environment
//! variables using `__` between sections, e.g. `SENTINEL_DETECTOR__SENSITIVITY=2.5`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::detector::DetectorConfig;
use crate::error::SentinelResult;
use crate::monitor::MonitorConfig;
use crate::source::SimulationConfig;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "SENTINEL";

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentinelConfig {
    /// Detector parameters
    #[serde(default)]
    pub detector: DetectorConfig,

    /// Polling loop parameters
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Simulated sensor parameters
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl SentinelConfig {
    /// Load configuration from defaults, an optional file and the process environment.
    pub fn load(path: Option<&Path>) -> SentinelResult<Self> {
        Self::load_with_env(path, Self::environment())
    }

    /// Like [`SentinelConfig::load`], with an explicit environment source.
    pub fn load_with_env(
        path: Option<&Path>,
        environment: config::Environment,
    ) -> SentinelResult<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config: Self = builder.add_source(environment).build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// The `SENTINEL_` environment source.
    pub fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// Reject values the detector or simulation would refuse.
    pub fn validate(&self) -> SentinelResult<()> {
        self.detector.validate()?;
        self.simulation.validate()
    }
}
