//! Reconnecting engine telemetry client.
//!
//! enginelink keeps a TCP connection to a telemetry server, asks for a
//! sample on a fixed cadence, and decodes each length-prefixed reply into a
//! [`TelemetryRecord`](client::TelemetryRecord).
//!
//! # Crate Structure
//!
//! - [`transport`] — Endpoints and TCP connections
//! - [`frame`] — Big-endian length-prefixed framing and exact-length reads
//! - [`client`] — Session, supervisor, decoders and sinks
//!
//! ```no_run
//! use enginelink::client::{CancelToken, ProtobufDecoder, Supervisor, TracingSink};
//! use enginelink::transport::{Endpoint, TcpConnector};
//!
//! let cancel = CancelToken::new();
//! let mut supervisor = Supervisor::new(
//!     Endpoint::default(),
//!     TcpConnector::new(),
//!     ProtobufDecoder::new(),
//!     TracingSink,
//! );
//! supervisor.run(&cancel);
//! ```

/// Re-export transport types.
pub mod transport {
    pub use enginelink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use enginelink_frame::*;
}

/// Re-export client types.
pub mod client {
    pub use enginelink_client::*;
}
