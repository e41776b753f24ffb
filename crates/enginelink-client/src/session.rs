use std::fmt;
use std::io::{Read, Write};
use std::time::Duration;

use bytes::Bytes;
use enginelink_frame::{
    write_request, FrameConfig, FrameError, FrameRead, FrameReader, FrameStage,
    DEFAULT_MAX_PAYLOAD, DEFAULT_REQUEST_TOKEN,
};
use tracing::{debug, error, info, warn};

use crate::cancel::CancelToken;
use crate::clock::{Sleeper, Wake};
use crate::decoder::Decoder;
use crate::error::DecodeError;
use crate::sink::{Sink, StatusEvent};

/// Default pause between a reply and the next request.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Per-connection request/reply settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Bytes written before every expected reply. Default: `get\n`.
    pub request_token: Bytes,
    /// Pause after each emitted record. Default: 1 s.
    pub poll_interval: Duration,
    /// Largest accepted payload; a bigger length prefix drops the
    /// connection. Default: 16 MiB.
    pub max_payload_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            request_token: Bytes::from_static(DEFAULT_REQUEST_TOKEN),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

impl SessionConfig {
    pub(crate) fn frame_config(&self) -> FrameConfig {
        FrameConfig {
            max_payload_size: self.max_payload_size,
        }
    }
}

/// Why a session stopped using its connection.
#[derive(Debug)]
pub enum SessionEnd {
    /// The peer closed the stream before a full frame arrived.
    PeerClosed {
        stage: FrameStage,
        expected: usize,
        received: usize,
    },
    /// Writing the request token failed.
    WriteFailed(FrameError),
    /// Reading a reply failed (including an expired read timeout).
    ReadFailed(FrameError),
    /// The length prefix exceeds the configured maximum; the stream is no
    /// longer aligned on frame boundaries.
    Desynchronized { size: usize, max: usize },
    /// The payload did not decode.
    DecodeFailed(DecodeError),
    /// Cancellation was observed.
    Cancelled,
}

impl SessionEnd {
    /// Whether the stream was abandoned because its contents could not be
    /// trusted, as opposed to being lost or closed.
    pub fn is_desynchronized(&self) -> bool {
        matches!(
            self,
            SessionEnd::Desynchronized { .. } | SessionEnd::DecodeFailed(_)
        )
    }
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEnd::PeerClosed {
                stage: FrameStage::LengthPrefix,
                received: 0,
                ..
            } => f.write_str("Server closed connection."),
            SessionEnd::PeerClosed {
                stage,
                expected,
                received,
            } => write!(
                f,
                "Server closed connection mid-frame ({received} of {expected} {stage} bytes)."
            ),
            SessionEnd::WriteFailed(err) => {
                write!(f, "Connection lost while sending request: {err}")
            }
            SessionEnd::ReadFailed(err) => write!(f, "Connection lost while reading reply: {err}"),
            SessionEnd::Desynchronized { size, max } => write!(
                f,
                "Dropping connection: frame length {size} exceeds limit of {max} bytes"
            ),
            SessionEnd::DecodeFailed(err) => write!(f, "Dropping connection: {err}"),
            SessionEnd::Cancelled => f.write_str("Session cancelled."),
        }
    }
}

/// Result of one [`Session::serve`] call.
#[derive(Debug)]
pub struct SessionOutcome {
    pub end: SessionEnd,
    /// Records emitted before the session ended.
    pub records: u64,
}

/// Drives the request → length → payload → decode → emit → pause cycle on
/// one live connection.
pub struct Session<D, S, Z> {
    config: SessionConfig,
    decoder: D,
    sink: S,
    sleeper: Z,
}

impl<D: Decoder, S: Sink, Z: Sleeper> Session<D, S, Z> {
    pub fn new(config: SessionConfig, decoder: D, sink: S, sleeper: Z) -> Self {
        Self {
            config,
            decoder,
            sink,
            sleeper,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Serve `conn` until it is no longer usable or `cancel` fires.
    ///
    /// Never returns an error: every way the connection can end is reported
    /// through [`SessionEnd`], which is also forwarded to the sink.
    pub fn serve<C>(&mut self, conn: &mut C, cancel: &CancelToken) -> SessionOutcome
    where
        C: Read + Write + ?Sized,
    {
        let mut reader = FrameReader::with_config(conn, self.config.frame_config());
        let mut records = 0u64;

        let end = loop {
            if cancel.is_cancelled() {
                break SessionEnd::Cancelled;
            }

            if let Err(err) = write_request(reader.get_mut(), &self.config.request_token) {
                break lost_or_cancelled(cancel, SessionEnd::WriteFailed(err));
            }

            let payload = match reader.read_frame() {
                Ok(FrameRead::Frame(payload)) => payload,
                Ok(FrameRead::Closed {
                    stage,
                    expected,
                    received,
                }) => {
                    break lost_or_cancelled(
                        cancel,
                        SessionEnd::PeerClosed {
                            stage,
                            expected,
                            received,
                        },
                    )
                }
                Err(FrameError::PayloadTooLarge { size, max }) => {
                    break SessionEnd::Desynchronized { size, max }
                }
                Err(err) => break lost_or_cancelled(cancel, SessionEnd::ReadFailed(err)),
            };
            debug!(len = payload.len(), "received frame");

            match self.decoder.decode(&payload) {
                Ok(record) => {
                    self.sink.record(&record);
                    records += 1;
                }
                Err(err) => break SessionEnd::DecodeFailed(err),
            }

            if self.sleeper.sleep(self.config.poll_interval, cancel) == Wake::Cancelled {
                break SessionEnd::Cancelled;
            }
        };

        match &end {
            SessionEnd::Cancelled => debug!(records, "session cancelled"),
            SessionEnd::PeerClosed { .. } => info!(records, "{end}"),
            SessionEnd::WriteFailed(_) | SessionEnd::ReadFailed(_) => warn!(records, "{end}"),
            SessionEnd::Desynchronized { .. } | SessionEnd::DecodeFailed(_) => {
                error!(records, "{end}")
            }
        }
        self.sink.status(&StatusEvent::SessionEnded(&end));

        SessionOutcome { end, records }
    }
}

/// I/O that fails because the cancel path shut the socket down is a
/// cancellation, not a lost connection.
fn lost_or_cancelled(cancel: &CancelToken, end: SessionEnd) -> SessionEnd {
    if cancel.is_cancelled() {
        SessionEnd::Cancelled
    } else {
        end
    }
}
