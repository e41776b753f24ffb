use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};

/// Length prefix: a single big-endian `u32`.
pub const PREFIX_SIZE: usize = 4;

/// Default maximum payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// Token the client writes before every expected reply.
pub const DEFAULT_REQUEST_TOKEN: &[u8] = b"get\n";

/// Encode a payload into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────┬─────────────────┐
/// │ Length       │ Payload          │
/// │ (4B BE u32)  │ (Length bytes)   │
/// └──────────────┴─────────────────┘
/// ```
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > u32::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: u32::MAX as usize,
        });
    }
    dst.reserve(PREFIX_SIZE + payload.len());
    dst.put_u32(payload.len() as u32);
    dst.put_slice(payload);
    Ok(())
}

/// Interpret a length prefix as a payload size.
pub fn decode_length(prefix: [u8; PREFIX_SIZE]) -> usize {
    u32::from_be_bytes(prefix) as usize
}

/// Reject declared lengths that exceed `max_payload`.
///
/// Checked before any payload buffer is allocated.
pub fn check_length(len: usize, max_payload: usize) -> Result<()> {
    if len > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: len,
            max: max_payload,
        });
    }
    Ok(())
}

/// Frame limits shared by reader and writer.
///
/// Socket deadlines belong to the connection (`TcpConfig`), not here.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 16 MiB.
    pub max_payload_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}
