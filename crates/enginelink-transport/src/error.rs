use std::io::ErrorKind;

use crate::endpoint::Endpoint;

/// Errors that can occur in transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The endpoint host could not be resolved to a socket address.
    #[error("failed to resolve {endpoint}: {source}")]
    Resolve {
        endpoint: Endpoint,
        source: std::io::Error,
    },

    /// Failed to connect to the specified endpoint.
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: Endpoint,
        source: std::io::Error,
    },

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Whether the server is expected to become reachable again on its own.
    ///
    /// Refused, reset and aborted connections are the normal signature of a
    /// server that is restarting or not yet listening.
    pub fn is_recoverable(&self) -> bool {
        match self {
            TransportError::Connect { source, .. } | TransportError::Io(source) => matches!(
                source.kind(),
                ErrorKind::ConnectionRefused
                    | ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
            ),
            TransportError::Resolve { .. } => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
