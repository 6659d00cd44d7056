//! Sentinel - train on normal sensor readings, then watch for intruders
//!
//! The monitor:
//! - learns a baseline from a JSON sample file or a simulated training batch
//! - polls the simulated motion sensor on a fixed interval
//! - prints an OK or ALERT line per reading and notifies on alerts

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use sentinel_core::{
    ConsoleSink, IntrusionDetector, Monitor, SentinelConfig, SimulatedSensor,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod samples;

/// Sentinel CLI
#[derive(Parser, Debug)]
#[command(name = "sentinel")]
#[command(about = "Z-score intrusion monitor for a single sensor stream", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path (TOML, JSON or YAML)
    #[arg(short, long, env = "SENTINEL_CONFIG")]
    config: Option<PathBuf>,

    /// Z-score above which a reading is an intrusion
    #[arg(short, long)]
    sensitivity: Option<f64>,

    /// Floor for a zero standard deviation
    #[arg(long)]
    epsilon: Option<f64>,

    /// Pause between readings in milliseconds
    #[arg(short, long)]
    interval_ms: Option<u64>,

    /// Number of readings to take
    #[arg(short = 'n', long)]
    iterations: Option<u32>,

    /// JSON file holding an array of normal training samples
    #[arg(long)]
    samples: Option<PathBuf>,

    /// Seed for the simulated sensor
    #[arg(long)]
    seed: Option<u64>,

    /// Log level
    #[arg(long, env = "SENTINEL_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// Override configuration values with the ones given on the command line.
    fn apply(&self, config: &mut SentinelConfig) {
        if let Some(sensitivity) = self.sensitivity {
            config.detector.sensitivity = sensitivity;
        }
        if let Some(epsilon) = self.epsilon {
            config.detector.epsilon = epsilon;
        }
        if let Some(interval_ms) = self.interval_ms {
            config.monitor.interval_ms = interval_ms;
        }
        if let Some(iterations) = self.iterations {
            config.monitor.iterations = iterations;
        }
        if let Some(seed) = self.seed {
            config.simulation.seed = Some(seed);
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.json {
            config.logging.json = true;
        }
    }
}

fn init_tracing(level: &str, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.to_string().into());

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = SentinelConfig::load(cli.config.as_deref())
        .context("failed to load configuration")?;
    cli.apply(&mut config);
    config.validate().context("invalid configuration")?;

    init_tracing(&config.logging.level, config.logging.json);

    let mut sensor = SimulatedSensor::new(&config.simulation)?;
    let training = match &cli.samples {
        Some(path) => samples::load(path)?,
        None => sensor.normal_samples(config.simulation.training_samples),
    };

    let mut detector = IntrusionDetector::new(config.detector.clone())?;
    detector.learn_normal(&training)?;
    if let Some(baseline) = detector.baseline() {
        println!(
            "Learned mean={:.2}, std={:.2}",
            baseline.mean, baseline.spread
        );
    }

    info!(
        iterations = config.monitor.iterations,
        interval_ms = config.monitor.interval_ms,
        sensitivity = config.detector.sensitivity,
        "monitoring started"
    );
    let report = Monitor::new(&detector, config.monitor.clone())
        .with_sink(ConsoleSink)
        .run(&mut sensor)
        .await?;
    info!(
        readings = report.readings,
        alerts = report.alerts,
        sink_failures = report.sink_failures,
        "monitoring finished"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_leave_config_untouched() {
        let cli = Cli::try_parse_from(["sentinel"]).unwrap();
        let mut config = SentinelConfig::default();
        cli.apply(&mut config);
        assert_eq!(config, SentinelConfig::default());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "sentinel",
            "--sensitivity",
            "2.5",
            "--epsilon",
            "0.001",
            "-i",
            "500",
            "-n",
            "12",
            "--seed",
            "7",
            "--log-level",
            "debug",
            "--json",
        ])
        .unwrap();
        let mut config = SentinelConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.detector.sensitivity, 2.5);
        assert_eq!(config.detector.epsilon, 0.001);
        assert_eq!(config.monitor.interval_ms, 500);
        assert_eq!(config.monitor.iterations, 12);
        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_cli_rejects_non_numeric_sensitivity() {
        assert!(Cli::try_parse_from(["sentinel", "--sensitivity", "high"]).is_err());
    }

    #[test]
    fn test_cli_samples_path() {
        let cli = Cli::try_parse_from(["sentinel", "--samples", "normal.json"]).unwrap();
        assert_eq!(cli.samples, Some(PathBuf::from("normal.json")));
    }
}
