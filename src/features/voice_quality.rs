//! Voice-quality proxies: jitter, shimmer, HNR and formants.
//!
//! Only jitter and shimmer are measured. HNR and the formant table are fixed
//! values; they are not estimated from the signal.

use serde::{Deserialize, Serialize};

use super::stats::{diff, relative_spread};

/// Jitter reported when fewer than two voiced frames exist.
pub const DEFAULT_JITTER: f64 = 0.01;
/// Shimmer reported when the amplitude track has no usable variation.
pub const DEFAULT_SHIMMER: f64 = 0.0;
/// Harmonics-to-noise ratio in dB. Not computed from the signal.
pub const HNR_DB: f64 = 15.0;

/// A vocal-tract resonance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Formant {
    /// Centre frequency in Hz.
    pub frequency: f64,
    /// Bandwidth in Hz.
    pub bandwidth: f64,
}

/// First three formants. Not computed from the signal.
pub const FORMANTS: [Formant; 3] = [
    Formant {
        frequency: 700.0,
        bandwidth: 50.0,
    },
    Formant {
        frequency: 1200.0,
        bandwidth: 70.0,
    },
    Formant {
        frequency: 2500.0,
        bandwidth: 100.0,
    },
];

/// Standard deviation of successive f0 differences over the mean f0.
pub fn jitter(voiced_f0: &[f64]) -> f64 {
    if voiced_f0.len() < 2 {
        return DEFAULT_JITTER;
    }
    relative_spread(&diff(voiced_f0), voiced_f0).unwrap_or(DEFAULT_JITTER)
}

/// Standard deviation of successive RMS differences over the mean RMS.
pub fn shimmer(rms: &[f64]) -> f64 {
    relative_spread(&diff(rms), rms).unwrap_or(DEFAULT_SHIMMER)
}
