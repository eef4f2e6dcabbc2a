//! Spectral shape descriptors: centroid and roll-off.

use crate::audio::{Framing, SpectrumAnalyzer};
use crate::features::stats::mean;

/// Per-frame spectral centroid and roll-off, both in Hz.
#[derive(Debug, Clone, Default)]
pub struct SpectralTrack {
    pub centroid: Vec<f64>,
    pub rolloff: Vec<f64>,
}

impl SpectralTrack {
    /// Compute both descriptors over Hann-windowed frames.
    ///
    /// `rolloff_percent` is the fraction of spectral magnitude that lies at
    /// or below the roll-off frequency. Silent frames report 0 Hz for both.
    pub fn compute(
        samples: &[f32],
        sample_rate: u32,
        framing: &Framing,
        rolloff_percent: f64,
    ) -> Self {
        let mut analyzer = SpectrumAnalyzer::new(framing.frame_length);
        let freqs = analyzer.bin_frequencies(sample_rate);

        let mut track = SpectralTrack::default();
        for frame in framing.frames(samples) {
            let spectrum = analyzer.magnitudes(&frame);
            track.centroid.push(spectral_centroid(&spectrum, &freqs));
            track
                .rolloff
                .push(spectral_rolloff(&spectrum, &freqs, rolloff_percent));
        }
        track
    }

    pub fn mean_centroid(&self) -> f64 {
        mean(&self.centroid).unwrap_or(0.0)
    }

    pub fn mean_rolloff(&self) -> f64 {
        mean(&self.rolloff).unwrap_or(0.0)
    }
}

/// Magnitude-weighted mean frequency.
pub fn spectral_centroid(spectrum: &[f32], freqs: &[f32]) -> f64 {
    let total: f64 = spectrum.iter().map(|&m| m as f64).sum();
    if total <= f64::EPSILON {
        return 0.0;
    }
    let weighted: f64 = spectrum
        .iter()
        .zip(freqs)
        .map(|(&m, &f)| m as f64 * f as f64)
        .sum();
    weighted / total
}

/// Lowest frequency below which `percent` of the magnitude lies.
pub fn spectral_rolloff(spectrum: &[f32], freqs: &[f32], percent: f64) -> f64 {
    let total: f64 = spectrum.iter().map(|&m| m as f64).sum();
    if total <= f64::EPSILON {
        return 0.0;
    }
    let target = percent * total;
    let mut cumulative = 0.0;
    for (&m, &f) in spectrum.iter().zip(freqs) {
        cumulative += m as f64;
        if cumulative >= target {
            return f as f64;
        }
    }
    freqs.last().copied().unwrap_or(0.0) as f64
}
