use enginelink_frame::FrameStage;

/// Errors produced while turning a payload into a record.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The payload is not a valid protobuf `EngineData` message.
    #[cfg(feature = "protobuf")]
    #[error("protobuf decode error: {0}")]
    Protobuf(#[from] prost::DecodeError),

    /// The payload parsed but its contents are unusable.
    #[error("malformed telemetry payload: {0}")]
    Malformed(String),
}

/// Errors that can occur in one-shot client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] enginelink_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] enginelink_frame::FrameError),

    /// Payload decoding failed.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The server closed the connection before a full reply arrived.
    #[error("server closed connection during {stage} ({received} of {expected} bytes)")]
    Disconnected {
        stage: FrameStage,
        expected: usize,
        received: usize,
    },
}

pub type Result<T> = std::result::Result<T, ClientError>;
