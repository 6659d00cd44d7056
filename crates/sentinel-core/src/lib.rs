//! # sentinel-core
//!
//! Learns what "normal" looks like for a single numeric sensor, then flags
//! readings that sit too many standard deviations away from it.
//!
//! ## Architecture
//!
//! ```text
//!   normal samples ──► Baseline::fit ──► IntrusionDetector (Trained)
//!                                              │
//!   ReadingSource ──► Monitor ──► detect(reading) ──► OK / ALERT line
//!                                              │
//!                                              └──► AlertSink (failures contained)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use sentinel_core::{IntrusionDetector, SentinelError};
//!
//! let mut detector = IntrusionDetector::default();
//! assert!(matches!(detector.detect(5.0), Err(SentinelError::NotTrained)));
//!
//! detector.learn_normal(&[4.0, 5.0, 5.0, 6.0, 5.0, 5.0, 4.0, 6.0, 5.0, 5.0]).unwrap();
//! let detection = detector.detect(9.0).unwrap();
//! assert!(detection.is_anomalous);
//! assert!(!detector.detect(5.5).unwrap().is_anomalous);
//! ```

#![deny(unsafe_code)]

pub mod baseline;
pub mod config;
pub mod detector;
pub mod error;
pub mod monitor;
pub mod sink;
pub mod source;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use baseline::{Baseline, DEFAULT_EPSILON};
pub use crate::config::{LoggingConfig, SentinelConfig};
pub use detector::{
    Detection, DetectorConfig, DetectorState, IntrusionDetector, DEFAULT_SENSITIVITY,
};
pub use error::{SentinelError, SentinelResult};
pub use monitor::{format_line, Monitor, MonitorConfig, MonitorReport};
pub use sink::{AlertSink, ConsoleSink, SinkError};
pub use source::{ReadingSource, SimulatedSensor, SimulationConfig};
