use crate::error::DecodeError;
use crate::record::TelemetryRecord;

/// Turns one frame payload into a [`TelemetryRecord`].
///
/// The framing layer guarantees `payload` is exactly the bytes the server
/// declared. An `Err` means the stream can no longer be trusted.
pub trait Decoder {
    fn decode(&mut self, payload: &[u8]) -> Result<TelemetryRecord, DecodeError>;
}

impl<D: Decoder + ?Sized> Decoder for &mut D {
    fn decode(&mut self, payload: &[u8]) -> Result<TelemetryRecord, DecodeError> {
        (**self).decode(payload)
    }
}

impl<D: Decoder + ?Sized> Decoder for Box<D> {
    fn decode(&mut self, payload: &[u8]) -> Result<TelemetryRecord, DecodeError> {
        (**self).decode(payload)
    }
}

/// Decoder backed by a closure. See [`from_fn`].
pub struct FnDecoder<F> {
    f: F,
}

/// Build a decoder from a closure.
pub fn from_fn<F>(f: F) -> FnDecoder<F>
where
    F: FnMut(&[u8]) -> Result<TelemetryRecord, DecodeError>,
{
    FnDecoder { f }
}

impl<F> Decoder for FnDecoder<F>
where
    F: FnMut(&[u8]) -> Result<TelemetryRecord, DecodeError>,
{
    fn decode(&mut self, payload: &[u8]) -> Result<TelemetryRecord, DecodeError> {
        (self.f)(payload)
    }
}
