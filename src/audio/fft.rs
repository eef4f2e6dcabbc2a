//! Short-time magnitude spectra using RustFFT.
//!
//! Shared by the spectral-shape and onset-strength passes.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Windowed magnitude spectrum analyzer.
///
/// Applies a periodic Hann window and returns magnitudes for bins
/// `0..=fft_size / 2` (DC through Nyquist).
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
}

impl SpectrumAnalyzer {
    /// Create a new analyzer for frames of `fft_size` samples.
    ///
    /// # Panics
    ///
    /// Panics if `fft_size` is not a power of two.
    pub fn new(fft_size: usize) -> Self {
        assert!(fft_size.is_power_of_two(), "FFT size must be a power of 2");

        let window: Vec<f32> = (0..fft_size)
            .map(|i| {
                let t = i as f32 / fft_size as f32;
                0.5 * (1.0 - (2.0 * std::f32::consts::PI * t).cos())
            })
            .collect();

        let fft = FftPlanner::new().plan_fft_forward(fft_size);

        Self {
            fft,
            fft_size,
            window,
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of output bins (`fft_size / 2 + 1`).
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Magnitude spectrum of one frame.
    ///
    /// Frames shorter than the FFT size are zero-padded; longer frames are
    /// truncated.
    pub fn magnitudes(&mut self, frame: &[f32]) -> Vec<f32> {
        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = frame.get(i).copied().unwrap_or(0.0);
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.buffer);

        self.buffer[..self.num_bins()]
            .iter()
            .map(|c| c.norm())
            .collect()
    }

    /// Centre frequency in Hz of a bin.
    pub fn bin_to_freq(&self, bin: usize, sample_rate: u32) -> f32 {
        bin as f32 * sample_rate as f32 / self.fft_size as f32
    }

    /// Centre frequencies of every output bin.
    pub fn bin_frequencies(&self, sample_rate: u32) -> Vec<f32> {
        (0..self.num_bins())
            .map(|bin| self.bin_to_freq(bin, sample_rate))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::synth::generate_sine;

    #[test]
    fn test_spectrum_analyzer_creation() {
        let analyzer = SpectrumAnalyzer::new(1024);
        assert_eq!(analyzer.fft_size(), 1024);
        assert_eq!(analyzer.num_bins(), 513);
    }

    #[test]
    fn test_sine_wave_peak() {
        let sample_rate = 44100;
        let samples = generate_sine(440.0, sample_rate, 0.1, 1.0);

        let mut analyzer = SpectrumAnalyzer::new(2048);
        let spectrum = analyzer.magnitudes(&samples);

        let peak_bin = spectrum
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();

        let peak_freq = analyzer.bin_to_freq(peak_bin, sample_rate);
        assert!(
            (peak_freq - 440.0).abs() < 25.0,
            "Expected peak near 440 Hz, got {} Hz",
            peak_freq
        );
    }

    #[test]
    fn test_short_frame_is_zero_padded() {
        let mut analyzer = SpectrumAnalyzer::new(512);
        let spectrum = analyzer.magnitudes(&[1.0; 10]);
        assert_eq!(spectrum.len(), 257);
        assert!(spectrum.iter().all(|m| m.is_finite()));
    }

    #[test]
    fn test_bin_freq_conversion() {
        let analyzer = SpectrumAnalyzer::new(2048);
        let sample_rate = 44100;

        assert!((analyzer.bin_to_freq(1, sample_rate) - 21.533).abs() < 1e-2);

        let freqs = analyzer.bin_frequencies(sample_rate);
        assert_eq!(freqs.len(), 1025);
        assert!((freqs[1024] - 22050.0).abs() < 1e-3);
    }

    #[test]
    fn test_silence_has_zero_magnitude() {
        let mut analyzer = SpectrumAnalyzer::new(256);
        let spectrum = analyzer.magnitudes(&[0.0; 256]);
        assert!(spectrum.iter().all(|&m| m == 0.0));
    }
}
