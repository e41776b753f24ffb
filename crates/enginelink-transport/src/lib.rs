//! TCP transport abstraction for telemetry clients.
//!
//! This is the lowest layer of enginelink. It names the remote server
//! ([`Endpoint`]), opens connections to it ([`Connector`]) and hands out
//! [`Connection`]s that the framing layer reads from. The [`TcpConnector`]
//! is the production implementation; tests substitute scripted connectors.

pub mod endpoint;
pub mod error;
pub mod tcp;
pub mod traits;

pub use endpoint::{Endpoint, DEFAULT_HOST, DEFAULT_PORT};
pub use error::{Result, TransportError};
pub use tcp::{TcpConfig, TcpConnector, TelemetryStream};
pub use traits::{Connection, Connector, InterruptHandle};
