use std::time::Duration;

use enginelink_transport::{Connection, Connector, Endpoint};
use tracing::{error, info, info_span, warn};

use crate::cancel::CancelToken;
use crate::clock::{Sleeper, ThreadSleeper, Wake};
use crate::decoder::Decoder;
use crate::session::{Session, SessionConfig};
use crate::sink::{Sink, StatusEvent};

/// Default wait after a failed connection attempt.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(2);

/// Supervisor settings.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Wait after a failed connection attempt. Default: 2 s.
    pub backoff: Duration,
    /// Settings for each session.
    pub session: SessionConfig,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            backoff: DEFAULT_BACKOFF,
            session: SessionConfig::default(),
        }
    }
}

/// Counters for one [`Supervisor::run`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Connection attempts, successful or not.
    pub attempts: u64,
    /// Attempts that failed to connect.
    pub failed_attempts: u64,
    /// Sessions served on established connections.
    pub sessions: u64,
    /// Records emitted across all sessions.
    pub records: u64,
}

/// Keeps a session running against `endpoint`, reconnecting whenever the
/// connection fails, until cancelled.
///
/// A failed connection attempt is followed by the backoff wait. A session
/// that ends on an established connection (peer close, I/O error, decode
/// failure) is followed by an immediate reconnect.
pub struct Supervisor<C, D, S, Z = ThreadSleeper> {
    endpoint: Endpoint,
    config: SupervisorConfig,
    connector: C,
    decoder: D,
    sink: S,
    sleeper: Z,
}

impl<C, D, S> Supervisor<C, D, S>
where
    C: Connector,
    D: Decoder,
    S: Sink,
{
    /// Create a supervisor with default config and real-time waits.
    pub fn new(endpoint: Endpoint, connector: C, decoder: D, sink: S) -> Self {
        Self {
            endpoint,
            config: SupervisorConfig::default(),
            connector,
            decoder,
            sink,
            sleeper: ThreadSleeper,
        }
    }
}

impl<C, D, S, Z> Supervisor<C, D, S, Z>
where
    C: Connector,
    D: Decoder,
    S: Sink,
    Z: Sleeper,
{
    pub fn with_config(mut self, config: SupervisorConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the wait primitive (e.g. with a virtual clock in tests).
    pub fn with_sleeper<Z2: Sleeper>(self, sleeper: Z2) -> Supervisor<C, D, S, Z2> {
        Supervisor {
            endpoint: self.endpoint,
            config: self.config,
            connector: self.connector,
            decoder: self.decoder,
            sink: self.sink,
            sleeper,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consume the supervisor and return its sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Run until `cancel` fires. This is the only way it returns.
    pub fn run(&mut self, cancel: &CancelToken) -> RunStats {
        let span = info_span!("supervisor", endpoint = %self.endpoint);
        let _enter = span.enter();

        let mut stats = RunStats::default();
        let backoff = self.config.backoff;

        while !cancel.is_cancelled() {
            stats.attempts += 1;

            let mut conn = match self.connector.connect(&self.endpoint) {
                Ok(conn) => conn,
                Err(err) => {
                    stats.failed_attempts += 1;
                    if err.is_recoverable() {
                        warn!(error = %err, retry_in = ?backoff, "connection attempt failed");
                    } else {
                        error!(error = %err, retry_in = ?backoff, "connection attempt failed");
                    }
                    self.sink.status(&StatusEvent::ConnectFailed {
                        endpoint: &self.endpoint,
                        error: &err,
                        retry_in: backoff,
                    });

                    if self.sleeper.sleep(backoff, cancel) == Wake::Cancelled {
                        break;
                    }
                    continue;
                }
            };

            info!("connected");
            self.sink.status(&StatusEvent::Connected {
                endpoint: &self.endpoint,
            });
            stats.sessions += 1;

            let armed = conn.interrupt_handle().map(|handle| cancel.arm(handle));
            let outcome = Session::new(
                self.config.session.clone(),
                &mut self.decoder,
                &mut self.sink,
                &mut self.sleeper,
            )
            .serve(&mut conn, cancel);
            stats.records += outcome.records;

            drop(armed);
            drop(conn);
        }

        info!(
            attempts = stats.attempts,
            sessions = stats.sessions,
            records = stats.records,
            "client stopped"
        );
        self.sink.status(&StatusEvent::Cancelled);
        stats
    }
}
