use std::fmt;
use std::io::{Read, Write};

use crate::endpoint::Endpoint;
use crate::error::Result;

/// A connected byte stream.
///
/// A connection is owned by exactly one session at a time and is closed when
/// dropped.
pub trait Connection: Read + Write {
    /// A handle that unblocks pending I/O on this connection from another
    /// thread, if the stream supports it.
    ///
    /// Once triggered, blocked and future reads return end-of-stream or an
    /// error.
    fn interrupt_handle(&self) -> Option<InterruptHandle> {
        None
    }
}

/// Opens connections to an endpoint.
pub trait Connector {
    type Conn: Connection;

    /// Open a new connection (blocking).
    fn connect(&mut self, endpoint: &Endpoint) -> Result<Self::Conn>;
}

impl<C: Connector + ?Sized> Connector for &mut C {
    type Conn = C::Conn;

    fn connect(&mut self, endpoint: &Endpoint) -> Result<Self::Conn> {
        (**self).connect(endpoint)
    }
}

/// Cross-thread trigger that aborts I/O on a connection.
pub struct InterruptHandle {
    trigger: Box<dyn Fn() + Send + Sync>,
}

impl InterruptHandle {
    pub fn new(trigger: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            trigger: Box::new(trigger),
        }
    }

    /// Abort I/O on the connection. Safe to call more than once.
    pub fn interrupt(&self) {
        (self.trigger)();
    }
}

impl fmt::Debug for InterruptHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterruptHandle").finish_non_exhaustive()
    }
}
