//! Short-time RMS energy.

use crate::audio::Framing;

/// Calculate RMS (Root Mean Square) amplitude of a block of samples.
pub fn calculate_rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_sq: f64 = samples.iter().map(|&s| s as f64 * s as f64).sum();
    (sum_sq / samples.len() as f64).sqrt()
}

/// Per-frame RMS amplitude of a signal.
#[derive(Debug, Clone, Default)]
pub struct EnergyTrack {
    /// RMS amplitude per frame.
    pub rms: Vec<f64>,
    /// Seconds between consecutive frames.
    pub frame_period: f64,
}

impl EnergyTrack {
    /// RMS over centred frames, zero-padded at both ends.
    pub fn compute(samples: &[f32], sample_rate: u32, framing: &Framing) -> Self {
        let rms = framing
            .frames(samples)
            .map(|frame| calculate_rms(&frame))
            .collect();

        Self {
            rms,
            frame_period: framing.frame_time(1, sample_rate),
        }
    }

    /// Energy per frame (`rms²`).
    pub fn energy(&self) -> Vec<f64> {
        self.rms.iter().map(|r| r * r).collect()
    }

    pub fn len(&self) -> usize {
        self.rms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::synth::generate_sine;
    use std::f32::consts::PI;

    #[test]
    fn test_calculate_rms() {
        // RMS of a sine wave should be 1/sqrt(2) ≈ 0.707
        let samples: Vec<f32> = (0..1000)
            .map(|i| (2.0 * PI * i as f32 / 100.0).sin())
            .collect();
        let rms = calculate_rms(&samples);
        assert!((rms - 0.707).abs() < 0.01);
        assert_eq!(calculate_rms(&[]), 0.0);
    }

    #[test]
    fn test_rms_of_huge_samples_is_finite() {
        let level = f32::MAX.sqrt();
        let rms = calculate_rms(&vec![level; 4096]);
        assert!(rms.is_finite());
        assert!((rms - level as f64).abs() / (level as f64) < 1e-9);

        let track = EnergyTrack::compute(&vec![level; 3000], 8000, &Framing::new(2048, 512, true));
        assert!(track.energy().iter().all(|e| e.is_finite()));
    }

    #[test]
    fn test_energy_is_rms_squared() {
        let samples = generate_sine(200.0, 16000, 1.0, 0.5);
        let track = EnergyTrack::compute(&samples, 16000, &Framing::new(2048, 512, true));

        assert_eq!(track.len(), 1 + 16000 / 512);
        for (r, e) in track.rms.iter().zip(track.energy()) {
            assert!((r * r - e).abs() < 1e-12);
        }
        // Interior frames carry the full sine level
        assert!((track.rms[10] - 0.3536).abs() < 0.01);
    }

    #[test]
    fn test_empty_signal_has_one_silent_frame() {
        let track = EnergyTrack::compute(&[], 16000, &Framing::new(2048, 512, true));
        assert_eq!(track.rms, vec![0.0]);
        assert!((track.frame_period - 0.032).abs() < 1e-9);
    }
}
