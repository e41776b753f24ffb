//! Reconnecting telemetry client.
//!
//! The [`Supervisor`] owns the retry loop: it opens a connection, hands it
//! to a [`Session`], and reconnects when the session ends. The session runs
//! the request → length-prefixed reply → decode → emit → pause cycle.
//!
//! Everything with side effects is injected: the [`Connector`] opens
//! sockets, the [`Decoder`] understands payloads, the [`Sink`] receives
//! records and status lines, the [`Sleeper`] waits, and a [`CancelToken`]
//! stops the whole thing.
//!
//! [`Connector`]: enginelink_transport::Connector

pub mod cancel;
pub mod clock;
pub mod decoder;
pub mod error;
pub mod probe;
#[cfg(feature = "protobuf")]
pub mod protobuf;
pub mod record;
pub mod session;
pub mod sink;
pub mod supervisor;

#[cfg(test)]
mod testing;

pub use cancel::{ArmGuard, CancelToken};
pub use clock::{Sleeper, ThreadSleeper, VirtualClock, Wake};
pub use decoder::{from_fn, Decoder, FnDecoder};
pub use error::{ClientError, DecodeError, Result};
pub use probe::probe;
#[cfg(feature = "protobuf")]
pub use protobuf::{encode_record, EngineData, ProtobufDecoder};
pub use record::TelemetryRecord;
pub use session::{Session, SessionConfig, SessionEnd, SessionOutcome, DEFAULT_POLL_INTERVAL};
pub use sink::{MemorySink, Sink, StatusEvent, TracingSink};
pub use supervisor::{RunStats, Supervisor, SupervisorConfig, DEFAULT_BACKOFF};
