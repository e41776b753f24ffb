use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use tracing::{debug, trace};

use crate::endpoint::Endpoint;
use crate::error::{Result, TransportError};
use crate::traits::{Connection, Connector, InterruptHandle};

/// Socket options applied to every TCP connection.
#[derive(Debug, Clone, Default)]
pub struct TcpConfig {
    /// Bound on each connect attempt. `None` uses the OS default.
    pub connect_timeout: Option<Duration>,
    /// Deadline for each blocking read. `None` blocks indefinitely.
    pub read_timeout: Option<Duration>,
    /// Deadline for each blocking write. `None` blocks indefinitely.
    pub write_timeout: Option<Duration>,
    /// Disable Nagle's algorithm so small requests go out immediately.
    pub nodelay: bool,
}

/// A connected TCP stream.
pub struct TelemetryStream {
    inner: TcpStream,
    peer: Endpoint,
}

impl TelemetryStream {
    pub(crate) fn from_tcp(inner: TcpStream, peer: Endpoint) -> Self {
        Self { inner, peer }
    }

    /// The endpoint this stream is connected to.
    pub fn peer(&self) -> &Endpoint {
        &self.peer
    }

    /// Shut down both directions. Pending reads observe end-of-stream.
    pub fn shutdown(&self) -> Result<()> {
        match self.inner.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            // Already disconnected by the peer.
            Err(err) if err.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

impl Read for TelemetryStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for TelemetryStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl Connection for TelemetryStream {
    fn interrupt_handle(&self) -> Option<InterruptHandle> {
        let clone = match self.inner.try_clone() {
            Ok(clone) => TelemetryStream::from_tcp(clone, self.peer.clone()),
            Err(err) => {
                debug!(peer = %self.peer, error = %err, "cannot clone stream for interrupt handle");
                return None;
            }
        };
        Some(InterruptHandle::new(move || {
            if let Err(err) = clone.shutdown() {
                debug!(peer = %clone.peer, error = %err, "interrupt shutdown failed");
            }
        }))
    }
}

impl std::fmt::Debug for TelemetryStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryStream")
            .field("peer", &self.peer)
            .finish()
    }
}

/// Opens blocking TCP connections.
#[derive(Debug, Clone, Default)]
pub struct TcpConnector {
    config: TcpConfig,
}

impl TcpConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TcpConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TcpConfig {
        &self.config
    }

    fn open(&self, endpoint: &Endpoint) -> Result<TcpStream> {
        let connect_err = |source| TransportError::Connect {
            endpoint: endpoint.clone(),
            source,
        };

        let Some(timeout) = self.config.connect_timeout else {
            return TcpStream::connect((endpoint.host(), endpoint.port())).map_err(connect_err);
        };

        // connect_timeout takes a single address, so try each in turn and keep
        // the last error.
        let mut last_err = None;
        for addr in endpoint.resolve()? {
            trace!(%addr, ?timeout, "trying address");
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => return Ok(stream),
                Err(err) => last_err = Some(err),
            }
        }
        Err(connect_err(last_err.unwrap_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses to try")
        })))
    }
}

impl Connector for TcpConnector {
    type Conn = TelemetryStream;

    fn connect(&mut self, endpoint: &Endpoint) -> Result<TelemetryStream> {
        let stream = self.open(endpoint)?;
        stream.set_read_timeout(self.config.read_timeout)?;
        stream.set_write_timeout(self.config.write_timeout)?;
        if self.config.nodelay {
            stream.set_nodelay(true)?;
        }
        debug!(%endpoint, "connected");
        Ok(TelemetryStream::from_tcp(stream, endpoint.clone()))
    }
}
