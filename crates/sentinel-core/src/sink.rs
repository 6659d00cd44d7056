//! Alert sinks: where anomalous readings are forwarded.
//!
//! A sink may fail. The monitoring loop contains every sink failure (it is
//! logged and counted) so notification problems never stop detection.

use std::io::{self, Write};

use tracing::info;

/// Error type returned by a sink.
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Receives `(reading, score)` for every anomalous reading.
pub trait AlertSink {
    fn notify(&self, reading: f64, score: f64) -> Result<(), SinkError>;
}

impl<F> AlertSink for F
where
    F: Fn(f64, f64) -> Result<(), SinkError>,
{
    fn notify(&self, reading: f64, score: f64) -> Result<(), SinkError> {
        self(reading, score)
    }
}

/// Prints a notification line to stdout for each alert.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    /// The line printed for an alert.
    pub fn format(reading: f64, score: f64) -> String {
        format!("--> (callback) notify: reading={:.2}, z={:.2}", reading, score)
    }

    /// Write the notification line to `out`. Write failures are returned, not panicked on.
    pub fn write_to<W: Write>(
        &self,
        out: &mut W,
        reading: f64,
        score: f64,
    ) -> Result<(), SinkError> {
        writeln!(out, "{}", Self::format(reading, score))?;
        out.flush()?;
        Ok(())
    }
}

impl AlertSink for ConsoleSink {
    fn notify(&self, reading: f64, score: f64) -> Result<(), SinkError> {
        self.write_to(&mut io::stdout().lock(), reading, score)?;
        info!(reading, score, "intruder notification sent");
        Ok(())
    }
}
