use std::fmt;
use std::io::Read;

use bytes::Bytes;
use tracing::trace;

use crate::codec::{check_length, decode_length, FrameConfig, PREFIX_SIZE};
use crate::error::{FrameError, Result};
use crate::exact::{read_exact, ReadOutcome};

/// Which part of a frame was being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStage {
    LengthPrefix,
    Payload,
}

impl fmt::Display for FrameStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameStage::LengthPrefix => f.write_str("length prefix"),
            FrameStage::Payload => f.write_str("payload"),
        }
    }
}

/// Result of reading one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameRead {
    /// A complete payload.
    Frame(Bytes),
    /// The peer closed the stream before the frame was complete.
    Closed {
        stage: FrameStage,
        expected: usize,
        received: usize,
    },
}

impl FrameRead {
    /// True when the peer closed between frames rather than inside one.
    pub fn is_clean_close(&self) -> bool {
        matches!(
            self,
            FrameRead::Closed {
                stage: FrameStage::LengthPrefix,
                received: 0,
                ..
            }
        )
    }
}

/// Reads length-prefixed frames from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete frames or
/// an explicit [`FrameRead::Closed`].
pub struct FrameReader<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Read the next frame (blocking).
    ///
    /// Reads the 4-byte length prefix, validates it against the configured
    /// maximum, then reads exactly that many payload bytes.
    pub fn read_frame(&mut self) -> Result<FrameRead> {
        let prefix = match read_exact(&mut self.inner, PREFIX_SIZE)? {
            ReadOutcome::Complete(bytes) => bytes,
            ReadOutcome::Insufficient { expected, received } => {
                return Ok(FrameRead::Closed {
                    stage: FrameStage::LengthPrefix,
                    expected,
                    received,
                })
            }
        };

        let mut raw = [0u8; PREFIX_SIZE];
        raw.copy_from_slice(&prefix);
        let len = decode_length(raw);
        check_length(len, self.config.max_payload_size)?;
        trace!(len, "read length prefix");

        match read_exact(&mut self.inner, len)? {
            ReadOutcome::Complete(payload) => Ok(FrameRead::Frame(payload)),
            ReadOutcome::Insufficient { expected, received } => Ok(FrameRead::Closed {
                stage: FrameStage::Payload,
                expected,
                received,
            }),
        }
    }

    /// Read the next frame, treating a close as an error.
    pub fn expect_frame(&mut self) -> Result<Bytes> {
        match self.read_frame()? {
            FrameRead::Frame(payload) => Ok(payload),
            FrameRead::Closed { .. } => Err(FrameError::ConnectionClosed),
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, ErrorKind};

    use bytes::{BufMut, BytesMut};

    use super::*;
    use crate::codec::encode_frame;

    fn wire(payloads: &[&[u8]]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        for payload in payloads {
            encode_frame(payload, &mut buf).unwrap();
        }
        buf.to_vec()
    }

    #[test]
    fn read_single_frame() {
        let mut reader = FrameReader::new(Cursor::new(wire(&[b"hello"])));
        let frame = reader.read_frame().unwrap();
        assert_eq!(frame, FrameRead::Frame(Bytes::from_static(b"hello")));
    }

    #[test]
    fn read_consecutive_frames() {
        let mut reader = FrameReader::new(Cursor::new(wire(&[b"one", b"", b"three"])));

        assert_eq!(reader.expect_frame().unwrap().as_ref(), b"one");
        assert!(reader.expect_frame().unwrap().is_empty());
        assert_eq!(reader.expect_frame().unwrap().as_ref(), b"three");
        assert!(reader.read_frame().unwrap().is_clean_close());
    }

    #[test]
    fn partial_read_handling() {
        struct ByteByByte(Cursor<Vec<u8>>);

        impl Read for ByteByByte {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                let limit = buf.len().min(1);
                self.0.read(&mut buf[..limit])
            }
        }

        let mut reader = FrameReader::new(ByteByByte(Cursor::new(wire(&[b"slow"]))));
        assert_eq!(reader.expect_frame().unwrap().as_ref(), b"slow");
    }

    #[test]
    fn closed_inside_length_prefix() {
        let mut reader = FrameReader::new(Cursor::new(vec![0x00, 0x00]));
        let read = reader.read_frame().unwrap();
        assert_eq!(
            read,
            FrameRead::Closed {
                stage: FrameStage::LengthPrefix,
                expected: 4,
                received: 2
            }
        );
        assert!(!read.is_clean_close());
    }

    #[test]
    fn closed_inside_payload() {
        let mut partial = BytesMut::new();
        partial.put_u32(16);
        partial.put_slice(b"only-part");

        let mut reader = FrameReader::new(Cursor::new(partial.to_vec()));
        let read = reader.read_frame().unwrap();
        assert_eq!(
            read,
            FrameRead::Closed {
                stage: FrameStage::Payload,
                expected: 16,
                received: 9
            }
        );
        assert!(matches!(
            reader.expect_frame(),
            Err(FrameError::ConnectionClosed)
        ));
    }

    #[test]
    fn oversized_length_is_rejected_before_reading_payload() {
        let mut wire = BytesMut::new();
        wire.put_u32(1024);

        let cfg = FrameConfig {
            max_payload_size: 16,
        };
        let mut reader = FrameReader::with_config(Cursor::new(wire.to_vec()), cfg);
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(
            err,
            FrameError::PayloadTooLarge {
                size: 1024,
                max: 16
            }
        ));
    }

    #[test]
    fn io_errors_propagate() {
        struct TimedOut;

        impl Read for TimedOut {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::from(ErrorKind::WouldBlock))
            }
        }

        let mut reader = FrameReader::new(TimedOut);
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::WouldBlock));
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        assert_eq!(reader.config().max_payload_size, crate::DEFAULT_MAX_PAYLOAD);
        let _ = reader.get_ref();
        let _ = reader.get_mut();
        let _inner = reader.into_inner();
    }

    #[test]
    fn roundtrip_over_tcp_stream() {
        use std::time::Duration;

        use enginelink_transport::{Connector, Endpoint, TcpConfig, TcpConnector};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = Endpoint::from(listener.local_addr().unwrap());

        let server = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut writer = crate::writer::FrameWriter::new(stream);
            writer.send(b"telemetry").unwrap();
            // Keep the socket open; the second read must hit the deadline.
            std::thread::sleep(Duration::from_millis(500));
        });

        let mut connector = TcpConnector::with_config(TcpConfig {
            read_timeout: Some(Duration::from_millis(100)),
            ..TcpConfig::default()
        });
        let stream = connector.connect(&endpoint).unwrap();
        let mut reader = FrameReader::new(stream);
        assert_eq!(reader.expect_frame().unwrap().as_ref(), b"telemetry");

        let err = reader.read_frame().unwrap_err();
        assert!(matches!(
            err,
            FrameError::Io(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
        ));

        server.join().unwrap();
    }
}
