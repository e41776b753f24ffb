//! Protobuf `EngineData` payloads.
//!
//! ```text
//! message EngineData {
//!   int32 rpm = 1;
//!   float temperature = 2;
//!   int32 oil_pressure = 3;
//! }
//! ```

use prost::Message;
use tracing::trace;

use crate::decoder::Decoder;
use crate::error::DecodeError;
use crate::record::TelemetryRecord;

/// Wire message sent by the engine telemetry server.
#[derive(Clone, PartialEq, Message)]
pub struct EngineData {
    #[prost(int32, tag = "1")]
    pub rpm: i32,
    #[prost(float, tag = "2")]
    pub temperature: f32,
    #[prost(int32, tag = "3")]
    pub oil_pressure: i32,
}

impl From<&TelemetryRecord> for EngineData {
    fn from(record: &TelemetryRecord) -> Self {
        Self {
            rpm: record.rpm(),
            temperature: record.temperature(),
            oil_pressure: record.oil_pressure(),
        }
    }
}

/// Serialize a record the way the server does.
pub fn encode_record(record: &TelemetryRecord) -> Vec<u8> {
    EngineData::from(record).encode_to_vec()
}

/// Default decoder: protobuf `EngineData`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtobufDecoder;

impl ProtobufDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for ProtobufDecoder {
    fn decode(&mut self, payload: &[u8]) -> Result<TelemetryRecord, DecodeError> {
        let msg = EngineData::decode(payload)?;
        if !msg.temperature.is_finite() {
            return Err(DecodeError::Malformed(format!(
                "temperature is not finite ({})",
                msg.temperature
            )));
        }
        trace!(rpm = msg.rpm, temperature = msg.temperature, "decoded EngineData");
        Ok(TelemetryRecord::new(
            msg.rpm,
            msg.temperature,
            msg.oil_pressure,
        ))
    }
}
