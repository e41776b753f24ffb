use std::fmt;

use serde::Serialize;

/// One decoded engine telemetry sample.
///
/// Records are produced fresh for every frame and never modified afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetryRecord {
    rpm: i32,
    temperature: f32,
    oil_pressure: i32,
}

impl TelemetryRecord {
    pub fn new(rpm: i32, temperature: f32, oil_pressure: i32) -> Self {
        Self {
            rpm,
            temperature,
            oil_pressure,
        }
    }

    /// Engine speed in revolutions per minute.
    pub fn rpm(&self) -> i32 {
        self.rpm
    }

    /// Engine temperature in degrees Celsius.
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Oil pressure in psi.
    pub fn oil_pressure(&self) -> i32 {
        self.oil_pressure
    }
}

impl fmt::Display for TelemetryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RPM={}, TEMP={}", self.rpm, self.temperature)
    }
}
