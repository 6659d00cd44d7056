//! Polling driver: pulls readings, classifies them, reports the outcome.
//!
//! Each iteration writes one line to the monitor output (stdout unless
//! replaced):
//!
//! ```text
//! [2026-10-16 09:30:00] OK: reading=5.12 z=0.14
//! [2026-10-16 09:30:01] ALERT: Intruder detected! reading=16.40 z=11.20
//! ```
//!
//! An untrained detector aborts the loop on the first reading. A failing
//! alert sink is reported and counted, and the loop carries on.

use std::io::{self, Write};
use std::time::Duration;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::detector::{Detection, IntrusionDetector};
use crate::error::{SentinelError, SentinelResult};
use crate::sink::AlertSink;
use crate::source::ReadingSource;

/// Timestamp layout used in report lines.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Loop parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Pause between readings in milliseconds (default: 1000).
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Number of readings to take (default: 30).
    #[serde(default = "default_iterations")]
    pub iterations: u32,
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_iterations() -> u32 {
    30
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            iterations: default_iterations(),
        }
    }
}

impl MonitorConfig {
    /// Fails with `InvalidArgument` unless `interval` is a whole number of
    /// milliseconds that fits in `interval_ms`.
    pub fn new(interval: Duration, iterations: u32) -> SentinelResult<Self> {
        if interval.subsec_nanos() % 1_000_000 != 0 {
            return Err(SentinelError::invalid(
                "interval",
                format!("{:?} is not a whole number of milliseconds", interval),
            ));
        }
        let interval_ms = u64::try_from(interval.as_millis()).map_err(|_| {
            SentinelError::invalid("interval", format!("{:?} is too long", interval))
        })?;
        Ok(Self {
            interval_ms,
            iterations,
        })
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Counters from a completed run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorReport {
    pub readings: u32,
    pub alerts: u32,
    pub sink_failures: u32,
}

/// Format the report line for one classified reading.
pub fn format_line(timestamp: &str, reading: f64, detection: &Detection) -> String {
    if detection.is_anomalous {
        format!(
            "[{}] ALERT: Intruder detected! reading={:.2} z={:.2}",
            timestamp, reading, detection.score
        )
    } else {
        format!(
            "[{}] OK: reading={:.2} z={:.2}",
            timestamp, reading, detection.score
        )
    }
}

/// Monitoring loop bound to a trained detector.
pub struct Monitor<'d, W = io::Stdout> {
    detector: &'d IntrusionDetector,
    config: MonitorConfig,
    sink: Option<Box<dyn AlertSink + 'd>>,
    out: W,
}

impl<'d> Monitor<'d, io::Stdout> {
    /// Create a monitor that reports to stdout and has no alert sink.
    pub fn new(detector: &'d IntrusionDetector, config: MonitorConfig) -> Self {
        Self {
            detector,
            config,
            sink: None,
            out: io::stdout(),
        }
    }
}

impl<'d, W: Write> Monitor<'d, W> {
    /// Forward anomalous readings to `sink`.
    pub fn with_sink(mut self, sink: impl AlertSink + 'd) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Write report lines to `out` instead.
    pub fn with_output<W2: Write>(self, out: W2) -> Monitor<'d, W2> {
        Monitor {
            detector: self.detector,
            config: self.config,
            sink: self.sink,
            out,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Run `config.iterations` polling rounds against `source`.
    ///
    /// Returns `NotTrained` (after reporting it) if the detector has no
    /// baseline, or an output error if a report line cannot be written.
    pub async fn run<S>(&mut self, source: &mut S) -> SentinelResult<MonitorReport>
    where
        S: ReadingSource + ?Sized,
    {
        let interval = self.config.interval();
        let iterations = self.config.iterations;
        let mut report = MonitorReport::default();

        for i in 0..iterations {
            let reading = source.next_reading();
            let detection = match self.detector.detect(reading) {
                Ok(detection) => detection,
                Err(e) => {
                    error!(error = %e, "monitoring aborted");
                    writeln!(self.out, "Error: {}", e)?;
                    return Err(e);
                }
            };
            report.readings += 1;

            let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
            writeln!(self.out, "{}", format_line(&timestamp, reading, &detection))?;

            if detection.is_anomalous {
                report.alerts += 1;
                warn!(reading, score = detection.score, "intruder detected");
                if let Some(sink) = &self.sink {
                    if let Err(e) = sink.notify(reading, detection.score) {
                        report.sink_failures += 1;
                        warn!(error = %e, reading, "alert sink failed");
                        writeln!(self.out, "Alert callback error: {}", e)?;
                    }
                }
            } else {
                debug!(reading, score = detection.score, "reading ok");
            }

            if i + 1 < iterations {
                tokio::time::sleep(interval).await;
            }
        }

        self.out.flush()?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::SinkError;
    use std::cell::{Cell, RefCell};

    fn trained() -> IntrusionDetector {
        let mut detector = IntrusionDetector::default();
        // mean 1.0, spread 1.0
        detector.learn_normal(&[0.0, 2.0]).unwrap();
        detector
    }

    fn scripted(readings: Vec<f64>) -> impl FnMut() -> f64 {
        let mut iter = readings.into_iter().cycle();
        move || iter.next().unwrap_or(0.0)
    }

    fn lines(out: &[u8]) -> Vec<String> {
        String::from_utf8(out.to_vec())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn format_ok_and_alert_lines() {
        let ok = Detection {
            is_anomalous: false,
            score: 0.5,
        };
        assert_eq!(
            format_line("2026-01-01 00:00:00", 1.234, &ok),
            "[2026-01-01 00:00:00] OK: reading=1.23 z=0.50"
        );

        let alert = Detection {
            is_anomalous: true,
            score: 14.0,
        };
        assert_eq!(
            format_line("2026-01-01 00:00:00", 15.0, &alert),
            "[2026-01-01 00:00:00] ALERT: Intruder detected! reading=15.00 z=14.00"
        );
    }

    #[test]
    fn monitor_config_interval() {
        let cfg = MonitorConfig::new(Duration::from_millis(500), 3).unwrap();
        assert_eq!(cfg.interval(), Duration::from_millis(500));
        assert_eq!(MonitorConfig::default().iterations, 30);
    }

    #[test]
    fn monitor_config_rejects_sub_millisecond_interval() {
        let err = MonitorConfig::new(Duration::from_micros(500), 3).unwrap_err();
        assert!(matches!(err, SentinelError::InvalidArgument { ref name, .. } if name == "interval"));
        assert!(MonitorConfig::new(Duration::from_micros(1500), 3).is_err());
        assert!(MonitorConfig::new(Duration::MAX, 3).is_err());

        let cfg = MonitorConfig::new(Duration::from_micros(2000), 3).unwrap();
        assert_eq!(cfg.interval(), Duration::from_millis(2));
    }

    #[tokio::test(start_paused = true)]
    async fn reports_each_reading() {
        let detector = trained();
        let cfg = MonitorConfig::new(Duration::from_secs(1), 3).unwrap();
        let mut monitor = Monitor::new(&detector, cfg).with_output(Vec::new());
        let mut source = scripted(vec![1.0, 10.0, 2.0]);

        let report = monitor.run(&mut source).await.unwrap();
        assert_eq!(
            report,
            MonitorReport {
                readings: 3,
                alerts: 1,
                sink_failures: 0
            }
        );

        let out = lines(monitor.output());
        assert_eq!(out.len(), 3);
        assert!(out[0].ends_with("] OK: reading=1.00 z=0.00"), "{}", out[0]);
        assert!(
            out[1].ends_with("] ALERT: Intruder detected! reading=10.00 z=9.00"),
            "{}",
            out[1]
        );
        assert!(out[2].ends_with("] OK: reading=2.00 z=1.00"), "{}", out[2]);
        assert!(out[0].starts_with('['));
    }

    #[tokio::test(start_paused = true)]
    async fn pauses_between_readings_only() {
        let detector = trained();
        let cfg = MonitorConfig::new(Duration::from_millis(500), 4).unwrap();
        let mut monitor = Monitor::new(&detector, cfg).with_output(Vec::new());
        let mut source = scripted(vec![1.0]);

        let start = tokio::time::Instant::now();
        monitor.run(&mut source).await.unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1500), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(2000), "{:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn untrained_detector_aborts_immediately() {
        let detector = IntrusionDetector::default();
        let pulls = Cell::new(0);
        let mut source = || {
            pulls.set(pulls.get() + 1);
            5.0
        };
        let mut monitor =
            Monitor::new(&detector, MonitorConfig::new(Duration::from_secs(1), 10).unwrap())
                .with_output(Vec::new());

        let err = monitor.run(&mut source).await.unwrap_err();
        assert!(matches!(err, SentinelError::NotTrained));
        assert_eq!(pulls.get(), 1);

        let out = lines(monitor.output());
        assert_eq!(out.len(), 1);
        assert!(out[0].starts_with("Error: detector has not been trained"));
    }

    #[tokio::test(start_paused = true)]
    async fn sink_receives_only_alerts() {
        let detector = trained();
        let seen = RefCell::new(Vec::new());
        let sink = |reading: f64, score: f64| -> Result<(), SinkError> {
            seen.borrow_mut().push((reading, score));
            Ok(())
        };
        let mut monitor = Monitor::new(&detector, MonitorConfig::new(Duration::ZERO, 4).unwrap())
            .with_sink(sink)
            .with_output(Vec::new());
        let mut source = scripted(vec![1.0, 20.0, 1.5, -9.0]);

        let report = monitor.run(&mut source).await.unwrap();
        assert_eq!(report.alerts, 2);
        drop(monitor);
        assert_eq!(*seen.borrow(), vec![(20.0, 19.0), (-9.0, 10.0)]);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_sink_does_not_stop_loop() {
        let detector = trained();
        let sink = |_: f64, _: f64| -> Result<(), SinkError> { Err("pager offline".into()) };
        let mut monitor = Monitor::new(&detector, MonitorConfig::new(Duration::from_secs(1), 5).unwrap())
            .with_sink(sink)
            .with_output(Vec::new());
        let mut source = scripted(vec![50.0]);

        let report = monitor.run(&mut source).await.unwrap();
        assert_eq!(
            report,
            MonitorReport {
                readings: 5,
                alerts: 5,
                sink_failures: 5
            }
        );

        let out = lines(&monitor.into_output());
        assert_eq!(out.len(), 10);
        assert!(out[0].contains("ALERT: Intruder detected!"));
        assert_eq!(out[1], "Alert callback error: pager offline");
    }

    #[tokio::test(start_paused = true)]
    async fn zero_iterations_reads_nothing() {
        let detector = IntrusionDetector::default();
        let mut monitor = Monitor::new(&detector, MonitorConfig::new(Duration::from_secs(1), 0).unwrap())
            .with_output(Vec::new());
        let mut source = || -> f64 { panic!("source should not be polled") };

        let report = monitor.run(&mut source).await.unwrap();
        assert_eq!(report, MonitorReport::default());
        assert!(monitor.output().is_empty());
    }
}
