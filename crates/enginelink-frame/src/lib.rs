//! Length-prefixed framing for the telemetry wire protocol.
//!
//! Every reply from the server is framed as:
//! - A 4-byte big-endian payload length
//! - Exactly that many payload bytes
//!
//! The client sends a short request token (`get\n`) before each reply. Partial
//! reads are handled here; callers see a complete payload or an explicit
//! close.

pub mod codec;
pub mod error;
pub mod exact;
pub mod reader;
pub mod writer;

pub use codec::{
    check_length, decode_length, encode_frame, FrameConfig, DEFAULT_MAX_PAYLOAD,
    DEFAULT_REQUEST_TOKEN, PREFIX_SIZE,
};
pub use error::{FrameError, Result};
pub use exact::{read_exact, ReadOutcome};
pub use reader::{FrameRead, FrameReader, FrameStage};
pub use writer::{write_request, FrameWriter};
