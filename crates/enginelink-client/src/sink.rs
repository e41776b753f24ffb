use std::fmt;
use std::time::Duration;

use enginelink_transport::{Endpoint, TransportError};
use tracing::info;

use crate::record::TelemetryRecord;
use crate::session::SessionEnd;

/// Human-readable lifecycle events reported by the session and supervisor.
#[derive(Debug)]
pub enum StatusEvent<'a> {
    /// A connection attempt succeeded.
    Connected { endpoint: &'a Endpoint },
    /// A connection attempt failed; the supervisor waits `retry_in` before
    /// trying again.
    ConnectFailed {
        endpoint: &'a Endpoint,
        error: &'a TransportError,
        retry_in: Duration,
    },
    /// A session on a live connection finished.
    SessionEnded(&'a SessionEnd),
    /// The client loop stopped because it was cancelled.
    Cancelled,
}

impl fmt::Display for StatusEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusEvent::Connected { endpoint } => write!(f, "Connected to {endpoint}."),
            StatusEvent::ConnectFailed { retry_in, .. } => write!(
                f,
                "Unable to connect to server, retrying in {}...",
                format_duration(*retry_in)
            ),
            StatusEvent::SessionEnded(end) => write!(f, "{end}"),
            StatusEvent::Cancelled => f.write_str("Exiting client."),
        }
    }
}

/// `2 seconds`, `1 second`, `250 ms`.
fn format_duration(d: Duration) -> String {
    if d.subsec_nanos() == 0 {
        match d.as_secs() {
            1 => "1 second".to_string(),
            secs => format!("{secs} seconds"),
        }
    } else {
        format!("{} ms", d.as_millis())
    }
}

/// Destination for decoded records and status lines.
pub trait Sink {
    /// Called once per successfully decoded frame.
    fn record(&mut self, record: &TelemetryRecord);

    /// Called on connection lifecycle changes.
    fn status(&mut self, event: &StatusEvent<'_>);
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn record(&mut self, record: &TelemetryRecord) {
        (**self).record(record)
    }

    fn status(&mut self, event: &StatusEvent<'_>) {
        (**self).status(event)
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn record(&mut self, record: &TelemetryRecord) {
        (**self).record(record)
    }

    fn status(&mut self, event: &StatusEvent<'_>) {
        (**self).status(event)
    }
}

/// Sends everything to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl Sink for TracingSink {
    fn record(&mut self, record: &TelemetryRecord) {
        info!(
            rpm = record.rpm(),
            temperature = record.temperature(),
            oil_pressure = record.oil_pressure(),
            "Received: {record}"
        );
    }

    fn status(&mut self, event: &StatusEvent<'_>) {
        info!("{event}");
    }
}

/// Collects records and rendered status lines in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub records: Vec<TelemetryRecord>,
    pub statuses: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sink for MemorySink {
    fn record(&mut self, record: &TelemetryRecord) {
        self.records.push(*record);
    }

    fn status(&mut self, event: &StatusEvent<'_>) {
        self.statuses.push(event.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_failure_line() {
        let endpoint = Endpoint::default();
        let error = TransportError::Connect {
            endpoint: endpoint.clone(),
            source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
        };
        let event = StatusEvent::ConnectFailed {
            endpoint: &endpoint,
            error: &error,
            retry_in: Duration::from_secs(2),
        };
        assert_eq!(
            event.to_string(),
            "Unable to connect to server, retrying in 2 seconds..."
        );
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(Duration::from_secs(1)), "1 second");
        assert_eq!(format_duration(Duration::from_millis(250)), "250 ms");
    }

    #[test]
    fn memory_sink_collects() {
        let mut sink = MemorySink::new();
        sink.record(&TelemetryRecord::new(1, 2.0, 3));
        sink.status(&StatusEvent::Cancelled);

        assert_eq!(sink.records, vec![TelemetryRecord::new(1, 2.0, 3)]);
        assert_eq!(sink.statuses, vec!["Exiting client.".to_string()]);
    }
}
