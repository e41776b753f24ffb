use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};

/// Result of an exact-length read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Exactly the requested number of bytes.
    Complete(Bytes),
    /// The stream ended first. The partial bytes are discarded.
    Insufficient { expected: usize, received: usize },
}

impl ReadOutcome {
    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            ReadOutcome::Complete(bytes) => Some(bytes),
            ReadOutcome::Insufficient { .. } => None,
        }
    }
}

/// Read exactly `n` bytes from `reader`, however the underlying reads are
/// chunked.
///
/// A zero-length read before `n` bytes are collected yields
/// [`ReadOutcome::Insufficient`]; a short buffer is never returned.
/// `Interrupted` reads are retried, any other I/O error is returned as-is.
pub fn read_exact<R: Read + ?Sized>(reader: &mut R, n: usize) -> std::io::Result<ReadOutcome> {
    let mut buf = BytesMut::zeroed(n);
    let mut filled = 0usize;

    while filled < n {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return Ok(ReadOutcome::Insufficient {
                    expected: n,
                    received: filled,
                })
            }
            Ok(read) => filled += read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }

    Ok(ReadOutcome::Complete(buf.freeze()))
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io::Cursor;

    use super::*;

    /// Serves one scripted chunk per `read` call, then end-of-stream.
    struct ChunkedReader {
        chunks: VecDeque<Vec<u8>>,
        calls: usize,
    }

    impl ChunkedReader {
        fn new(chunks: &[&[u8]]) -> Self {
            Self {
                chunks: chunks.iter().map(|c| c.to_vec()).collect(),
                calls: 0,
            }
        }
    }

    impl Read for ChunkedReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.calls += 1;
            let Some(mut chunk) = self.chunks.pop_front() else {
                return Ok(0);
            };
            let n = chunk.len().min(buf.len());
            buf[..n].copy_from_slice(&chunk[..n]);
            if n < chunk.len() {
                self.chunks.push_front(chunk.split_off(n));
            }
            Ok(n)
        }
    }

    #[test]
    fn concatenates_chunked_reads() {
        let mut reader = ChunkedReader::new(&[b"abc", b"de"]);
        let outcome = read_exact(&mut reader, 5).unwrap();
        assert_eq!(outcome, ReadOutcome::Complete(Bytes::from_static(b"abcde")));
        assert_eq!(reader.calls, 2);
    }

    #[test]
    fn single_byte_chunks() {
        let mut reader = ChunkedReader::new(&[b"w", b"i", b"r", b"e"]);
        let bytes = read_exact(&mut reader, 4).unwrap().into_bytes().unwrap();
        assert_eq!(bytes.as_ref(), b"wire");
    }

    #[test]
    fn leaves_trailing_bytes_unread() {
        let mut cursor = Cursor::new(b"0123456789".to_vec());
        let first = read_exact(&mut cursor, 4).unwrap().into_bytes().unwrap();
        let rest = read_exact(&mut cursor, 6).unwrap().into_bytes().unwrap();
        assert_eq!(first.as_ref(), b"0123");
        assert_eq!(rest.as_ref(), b"456789");
    }

    #[test]
    fn immediate_eof_is_insufficient() {
        let mut reader = ChunkedReader::new(&[]);
        let outcome = read_exact(&mut reader, 4).unwrap();
        assert_eq!(
            outcome,
            ReadOutcome::Insufficient {
                expected: 4,
                received: 0
            }
        );
    }

    #[test]
    fn eof_mid_read_never_returns_partial_buffer() {
        let mut reader = ChunkedReader::new(&[b"ab", b"c"]);
        let outcome = read_exact(&mut reader, 8).unwrap();
        assert_eq!(
            outcome,
            ReadOutcome::Insufficient {
                expected: 8,
                received: 3
            }
        );
        assert!(outcome.into_bytes().is_none());
    }

    #[test]
    fn zero_length_completes_without_reading() {
        let mut reader = ChunkedReader::new(&[b"unused"]);
        let outcome = read_exact(&mut reader, 0).unwrap();
        assert_eq!(outcome, ReadOutcome::Complete(Bytes::new()));
        assert_eq!(reader.calls, 0);
    }

    #[test]
    fn interrupted_read_retries() {
        struct InterruptedOnce {
            interrupted: bool,
            inner: Cursor<Vec<u8>>,
        }

        impl Read for InterruptedOnce {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                if !self.interrupted {
                    self.interrupted = true;
                    return Err(std::io::Error::from(ErrorKind::Interrupted));
                }
                self.inner.read(buf)
            }
        }

        let mut reader = InterruptedOnce {
            interrupted: false,
            inner: Cursor::new(b"ok".to_vec()),
        };
        let bytes = read_exact(&mut reader, 2).unwrap().into_bytes().unwrap();
        assert_eq!(bytes.as_ref(), b"ok");
    }

    #[test]
    fn other_errors_propagate() {
        struct Broken;

        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::from(ErrorKind::ConnectionReset))
            }
        }

        let err = read_exact(&mut Broken, 4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConnectionReset);
    }
}
