//! Low-pass filtering of the magnitude signal.
//!
//! A second-order Butterworth section derived with the bilinear transform,
//! run forward and then backward over the signal so the result keeps zero
//! phase. Timestamps pass through untouched.

use std::f64::consts::{PI, SQRT_2};

use crate::{DataPoint, InvalidInputError};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterConfig {
    /// Sampling rate of the recording in Hz
    pub sample_rate_hz: f64,
    /// Cutoff frequency in Hz. Must stay below half the sampling rate
    pub cutoff_hz: f64,
}

impl FilterConfig {
    pub const fn new() -> Self {
        Self {
            sample_rate_hz: 50.0,
            cutoff_hz: 5.0,
        }
    }

    pub const fn set_sample_rate_hz(mut self, sample_rate_hz: f64) -> Self {
        self.sample_rate_hz = sample_rate_hz;
        self
    }

    pub const fn set_cutoff_hz(mut self, cutoff_hz: f64) -> Self {
        self.cutoff_hz = cutoff_hz;
        self
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub fn low_pass(
    input: impl IntoIterator<Item = DataPoint>,
    config: &FilterConfig,
) -> Result<Vec<DataPoint>, InvalidInputError> {
    if config.cutoff_hz >= config.sample_rate_hz / 2.0 {
        return Err(InvalidInputError::NyquistViolation {
            cutoff_hz: config.cutoff_hz,
            sample_rate_hz: config.sample_rate_hz,
        });
    }

    let input = input.into_iter().collect::<Vec<_>>();

    if input.is_empty() {
        return Err(InvalidInputError::EmptySignal);
    }

    let coefficients = Coefficients::low_pass(config);

    let forward = biquad(input.iter().map(|this| this.magnitude), &coefficients);

    let mut backward = biquad(forward.into_iter().rev(), &coefficients);
    backward.reverse();

    Ok(input
        .into_iter()
        .zip(backward)
        .map(|(mut this, magnitude)| {
            this.magnitude = magnitude;
            this
        })
        .collect())
}

#[derive(Debug, Clone, Copy)]
struct Coefficients {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl Coefficients {
    fn low_pass(config: &FilterConfig) -> Self {
        let wc = (PI * config.cutoff_hz / config.sample_rate_hz).tan();
        let wc2 = wc * wc;
        let norm = 1.0 + SQRT_2 * wc + wc2;

        Self {
            b0: wc2 / norm,
            b1: 2.0 * wc2 / norm,
            b2: wc2 / norm,
            a1: 2.0 * (wc2 - 1.0) / norm,
            a2: (1.0 - SQRT_2 * wc + wc2) / norm,
        }
    }
}

// Direct form I second-order section
fn biquad(input: impl IntoIterator<Item = f64>, coefficients: &Coefficients) -> Vec<f64> {
    let Coefficients { b0, b1, b2, a1, a2 } = *coefficients;

    let (mut x1, mut x2) = (0.0, 0.0);
    let (mut y1, mut y2) = (0.0, 0.0);

    input
        .into_iter()
        .map(|x0| {
            let y0 = b0 * x0 + b1 * x1 + b2 * x2 - a1 * y1 - a2 * y2;

            (x2, x1) = (x1, x0);
            (y2, y1) = (y1, y0);

            y0
        })
        .collect()
}
