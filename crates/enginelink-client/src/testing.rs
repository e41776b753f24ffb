//! In-memory connections and connectors for unit tests.

use std::collections::VecDeque;
use std::io::{Cursor, ErrorKind, Read, Write};
use std::time::Duration;

use bytes::BytesMut;
use enginelink_frame::encode_frame;
use enginelink_transport::{Connection, Connector, Endpoint, TransportError};

use crate::cancel::CancelToken;
use crate::clock::VirtualClock;

/// Wrap `payload` in a length prefix.
pub(crate) fn frame(payload: &[u8]) -> Vec<u8> {
    let mut buf = BytesMut::new();
    encode_frame(payload, &mut buf).unwrap();
    buf.to_vec()
}

/// Connection that replays scripted server bytes and records client writes.
pub(crate) struct ScriptedConn {
    input: Cursor<Vec<u8>>,
    written: Vec<u8>,
    read_error: Option<ErrorKind>,
    write_error: Option<ErrorKind>,
}

impl ScriptedConn {
    pub(crate) fn new(input: Vec<u8>) -> Self {
        Self {
            input: Cursor::new(input),
            written: Vec::new(),
            read_error: None,
            write_error: None,
        }
    }

    pub(crate) fn fail_reads(mut self, kind: ErrorKind) -> Self {
        self.read_error = Some(kind);
        self
    }

    pub(crate) fn fail_writes(mut self, kind: ErrorKind) -> Self {
        self.write_error = Some(kind);
        self
    }

    pub(crate) fn written(&self) -> &[u8] {
        &self.written
    }
}

impl Read for ScriptedConn {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if let Some(kind) = self.read_error {
            return Err(std::io::Error::from(kind));
        }
        self.input.read(buf)
    }
}

impl Write for ScriptedConn {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Some(kind) = self.write_error {
            return Err(std::io::Error::from(kind));
        }
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Connection for ScriptedConn {}

/// One scripted connect attempt.
pub(crate) enum Attempt {
    Refuse,
    Reset,
    Fail(ErrorKind),
    Accept(Vec<u8>),
}

/// Connector that plays back [`Attempt`]s, stamping each with virtual time.
///
/// When the script runs out it cancels `cancel` and refuses.
pub(crate) struct ScriptedConnector {
    script: VecDeque<Attempt>,
    clock: VirtualClock,
    cancel: CancelToken,
    pub(crate) attempts_at: Vec<Duration>,
}

impl ScriptedConnector {
    pub(crate) fn new(
        script: impl IntoIterator<Item = Attempt>,
        clock: VirtualClock,
        cancel: CancelToken,
    ) -> Self {
        Self {
            script: script.into_iter().collect(),
            clock,
            cancel,
            attempts_at: Vec::new(),
        }
    }
}

impl Connector for ScriptedConnector {
    type Conn = ScriptedConn;

    fn connect(&mut self, endpoint: &Endpoint) -> Result<ScriptedConn, TransportError> {
        self.attempts_at.push(self.clock.now());
        let refuse = |kind| TransportError::Connect {
            endpoint: endpoint.clone(),
            source: std::io::Error::from(kind),
        };
        match self.script.pop_front() {
            Some(Attempt::Accept(bytes)) => Ok(ScriptedConn::new(bytes)),
            Some(Attempt::Refuse) => Err(refuse(ErrorKind::ConnectionRefused)),
            Some(Attempt::Reset) => Err(refuse(ErrorKind::ConnectionReset)),
            Some(Attempt::Fail(kind)) => Err(refuse(kind)),
            None => {
                self.cancel.cancel();
                Err(refuse(ErrorKind::ConnectionRefused))
            }
        }
    }
}
