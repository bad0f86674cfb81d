//! Accelerometer signal conditioning: magnitude extraction, gravity/DC
//! removal, low-pass filtering and windowed feature statistics.

mod features;
mod filtering;
mod preprocessing;

pub use features::*;
pub use filtering::*;
pub use preprocessing::*;

#[derive(Debug, Clone, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Accelerometer {
    pub timestamp: std::time::Duration,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Magnitude sample derived from one [`Accelerometer`] reading.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataPoint {
    pub magnitude: f64,
    pub timestamp: std::time::Duration,
}

impl From<Accelerometer> for DataPoint {
    fn from(Accelerometer { timestamp, x, y, z }: Accelerometer) -> Self {
        Self {
            magnitude: (x.powi(2) + y.powi(2) + z.powi(2)).sqrt(),
            timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidInputError {
    #[error("signal holds no samples")]
    EmptySignal,
    #[error("cutoff {cutoff_hz} Hz is at or above the Nyquist limit for {sample_rate_hz} Hz sampling")]
    NyquistViolation { cutoff_hz: f64, sample_rate_hz: f64 },
    #[error("window size must be non-zero")]
    ZeroWindow,
}
