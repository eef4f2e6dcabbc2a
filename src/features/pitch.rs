//! Probabilistic YIN pitch tracking.
//!
//! Each frame gets a cumulative-mean-normalized difference function (YIN).
//! Instead of a single absolute threshold, 100 thresholds are swept and
//! weighted by a Beta(2, 18) prior; every threshold hands its weight to the
//! first trough that dips below it. The total weight a frame collects is its
//! voicing probability, and the heaviest trough gives its period. A two-state
//! Viterbi pass over those probabilities makes the final voiced/unvoiced call.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::audio::Framing;

const NUM_THRESHOLDS: usize = 100;
const BETA_B: i32 = 18;
/// Mean-square level under which a frame is treated as silence.
const SILENCE_POWER: f64 = 1e-10;

/// Pitch tracker settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchConfig {
    /// Lowest admissible f0 in Hz.
    pub fmin: f64,
    /// Highest admissible f0 in Hz.
    pub fmax: f64,
    /// Frames with a lower voicing probability are never voiced.
    pub voicing_threshold: f64,
    /// Probability of switching between voiced and unvoiced per frame.
    pub switch_prob: f64,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            fmin: 50.0,
            fmax: 400.0,
            voicing_threshold: 0.1,
            switch_prob: 0.01,
        }
    }
}

/// Pitch estimate for one analysis frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchFrame {
    /// Start time of the frame in seconds.
    pub time: f64,
    /// Fundamental frequency in Hz, `None` when unvoiced.
    pub f0: Option<f64>,
    /// Probability that the frame is voiced.
    pub voiced_prob: f64,
}

/// Frame-aligned pitch track.
#[derive(Debug, Clone, Default)]
pub struct PitchTrack {
    pub frames: Vec<PitchFrame>,
}

impl PitchTrack {
    /// f0 of the voiced frames, in frame order.
    pub fn voiced_f0(&self) -> Vec<f64> {
        self.frames.iter().filter_map(|f| f.f0).collect()
    }

    pub fn num_voiced(&self) -> usize {
        self.frames.iter().filter(|f| f.f0.is_some()).count()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Frame length used for a sample rate: ~93 ms, rounded up to a power of two.
pub fn frame_length_for(sample_rate: u32) -> usize {
    let scaled = (2048.0 * sample_rate as f64 / 22050.0).ceil() as usize;
    scaled.max(64).next_power_of_two()
}

/// Cumulative distribution of Beta(2, b): `1 - (1 - x)^b (1 + b x)`.
fn beta_cdf(x: f64) -> f64 {
    let x = x.clamp(0.0, 1.0);
    1.0 - (1.0 - x).powi(BETA_B) * (1.0 + BETA_B as f64 * x)
}

/// Prior weight of each threshold `k / NUM_THRESHOLDS`.
fn threshold_weights() -> Vec<(f64, f64)> {
    (1..=NUM_THRESHOLDS)
        .map(|k| {
            let hi = k as f64 / NUM_THRESHOLDS as f64;
            let lo = (k - 1) as f64 / NUM_THRESHOLDS as f64;
            (hi, beta_cdf(hi) - beta_cdf(lo))
        })
        .collect()
}

/// Probabilistic YIN tracker for one sample rate.
pub struct PitchTracker {
    config: PitchConfig,
    sample_rate: u32,
    framing: Framing,
    /// Integration window of the difference function.
    window: usize,
    min_lag: usize,
    max_lag: usize,
    fft_len: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    weights: Vec<(f64, f64)>,
}

impl PitchTracker {
    pub fn new(sample_rate: u32, config: PitchConfig) -> Self {
        let frame_length = frame_length_for(sample_rate);
        let window = frame_length / 2;
        let sr = sample_rate as f64;

        let min_lag = ((sr / config.fmax).floor() as usize).max(2);
        let max_lag = ((sr / config.fmin).ceil() as usize)
            .min(window - 1)
            .max(min_lag + 1);

        let mut planner = FftPlanner::<f64>::new();
        let fft_len = frame_length * 2;

        Self {
            config,
            sample_rate,
            framing: Framing::new(frame_length, frame_length / 4, false),
            window,
            min_lag,
            max_lag,
            fft_len,
            forward: planner.plan_fft_forward(fft_len),
            inverse: planner.plan_fft_inverse(fft_len),
            weights: threshold_weights(),
        }
    }

    pub fn frame_length(&self) -> usize {
        self.framing.frame_length
    }

    pub fn hop_length(&self) -> usize {
        self.framing.hop_length
    }

    /// Lag search range in samples, inclusive.
    #[cfg(test)]
    fn lag_range(&self) -> (usize, usize) {
        (self.min_lag, self.max_lag)
    }

    /// Track pitch over a mono signal.
    pub fn track(&self, samples: &[f32]) -> PitchTrack {
        let estimates: Vec<(f64, Option<f64>)> = self
            .framing
            .frames(samples)
            .map(|frame| match self.normalized_difference(&frame) {
                Some(cmndf) => self.estimate(&cmndf),
                None => (0.0, None),
            })
            .collect();

        let probs: Vec<f64> = estimates.iter().map(|(p, _)| *p).collect();
        let voiced = viterbi_voicing(&probs, self.config.switch_prob);

        let frames = estimates
            .iter()
            .zip(voiced)
            .enumerate()
            .map(|(i, (&(prob, f0), is_voiced))| {
                let keep = is_voiced && prob >= self.config.voicing_threshold;
                PitchFrame {
                    time: self.framing.frame_time(i, self.sample_rate),
                    f0: if keep { f0 } else { None },
                    voiced_prob: prob,
                }
            })
            .collect();

        PitchTrack { frames }
    }

    /// YIN cumulative-mean-normalized difference for lags `0..=max_lag + 1`.
    ///
    /// Returns `None` for silent frames.
    pub fn normalized_difference(&self, frame: &[f32]) -> Option<Vec<f64>> {
        let w = self.window;
        let n = self.fft_len;
        if frame.len() < 2 * w {
            return None;
        }
        let x: Vec<f64> = frame.iter().map(|&s| s as f64).collect();

        let mut prefix = Vec::with_capacity(x.len() + 1);
        prefix.push(0.0);
        for &s in &x {
            let last = *prefix.last().unwrap_or(&0.0);
            prefix.push(last + s * s);
        }
        let energy = |start: usize| prefix[start + w] - prefix[start];

        if prefix[x.len()] / (x.len() as f64) < SILENCE_POWER {
            return None;
        }

        // r[tau] = sum_{j < w} x[j] * x[j + tau], via one forward/inverse pair.
        let mut full: Vec<Complex<f64>> = (0..n)
            .map(|i| Complex::new(x.get(i).copied().unwrap_or(0.0), 0.0))
            .collect();
        let mut head: Vec<Complex<f64>> = (0..n)
            .map(|i| Complex::new(if i < w { x[i] } else { 0.0 }, 0.0))
            .collect();
        self.forward.process(&mut full);
        self.forward.process(&mut head);
        let mut cross: Vec<Complex<f64>> = full
            .iter()
            .zip(&head)
            .map(|(a, b)| a * b.conj())
            .collect();
        self.inverse.process(&mut cross);

        let last_lag = (self.max_lag + 1).min(w);
        let mut cmndf = Vec::with_capacity(last_lag + 1);
        cmndf.push(1.0);
        let mut running = 0.0;
        for tau in 1..=last_lag {
            let r = cross[tau].re / n as f64;
            let d = (energy(0) + energy(tau) - 2.0 * r).max(0.0);
            running += d;
            cmndf.push(if running > f64::EPSILON {
                d * tau as f64 / running
            } else {
                1.0
            });
        }

        Some(cmndf)
    }

    /// Voicing probability and f0 for one frame's normalized difference.
    fn estimate(&self, cmndf: &[f64]) -> (f64, Option<f64>) {
        let troughs = find_troughs(cmndf, self.min_lag, self.max_lag.min(cmndf.len() - 1));
        if troughs.is_empty() {
            return (0.0, None);
        }

        let mut mass = vec![0.0; troughs.len()];
        for &(threshold, weight) in &self.weights {
            if let Some(idx) = troughs.iter().position(|&t| cmndf[t] < threshold) {
                mass[idx] += weight;
            }
        }

        let voiced_prob: f64 = mass.iter().sum::<f64>().clamp(0.0, 1.0);
        let best = mass
            .iter()
            .enumerate()
            .fold(None::<(usize, f64)>, |acc, (i, &m)| match acc {
                Some((_, best_m)) if best_m >= m => acc,
                _ if m > 0.0 => Some((i, m)),
                _ => acc,
            });

        let Some((best_idx, _)) = best else {
            return (voiced_prob, None);
        };

        let lag = refine_lag(cmndf, troughs[best_idx]);
        let f0 = (self.sample_rate as f64 / lag).clamp(self.config.fmin, self.config.fmax);
        (voiced_prob, Some(f0))
    }
}

/// Local minima of `cmndf` within `[lo, hi]`.
fn find_troughs(cmndf: &[f64], lo: usize, hi: usize) -> Vec<usize> {
    (lo..=hi)
        .filter(|&tau| {
            let left = tau == 0 || cmndf[tau] < cmndf[tau - 1];
            let right = tau + 1 >= cmndf.len() || cmndf[tau] <= cmndf[tau + 1];
            left && right
        })
        .collect()
}

/// Parabolic interpolation around an integer trough.
fn refine_lag(cmndf: &[f64], tau: usize) -> f64 {
    if tau == 0 || tau + 1 >= cmndf.len() {
        return tau as f64;
    }
    let (a, b, c) = (cmndf[tau - 1], cmndf[tau], cmndf[tau + 1]);
    let denom = a - 2.0 * b + c;
    if denom <= 0.0 {
        return tau as f64;
    }
    let shift = 0.5 * (a - c) / denom;
    if shift.abs() > 1.0 {
        tau as f64
    } else {
        tau as f64 + shift
    }
}

/// Two-state (unvoiced/voiced) Viterbi decode of per-frame voicing probabilities.
pub fn viterbi_voicing(probs: &[f64], switch_prob: f64) -> Vec<bool> {
    if probs.is_empty() {
        return Vec::new();
    }

    let stay = (1.0 - switch_prob).max(1e-12).ln();
    let switch = switch_prob.max(1e-12).ln();
    let emit = |p: f64, voiced: bool| {
        let p = p.clamp(1e-6, 1.0 - 1e-6);
        if voiced {
            p.ln()
        } else {
            (1.0 - p).ln()
        }
    };

    let half = 0.5f64.ln();
    let mut score = [half + emit(probs[0], false), half + emit(probs[0], true)];
    let mut back: Vec<[usize; 2]> = Vec::with_capacity(probs.len());
    back.push([0, 1]);

    for &p in &probs[1..] {
        let mut next = [0.0; 2];
        let mut from = [0usize; 2];
        for (state, slot) in next.iter_mut().enumerate() {
            let via_same = score[state] + stay;
            let via_other = score[1 - state] + switch;
            let (best, prev) = if via_same >= via_other {
                (via_same, state)
            } else {
                (via_other, 1 - state)
            };
            *slot = best + emit(p, state == 1);
            from[state] = prev;
        }
        score = next;
        back.push(from);
    }

    let mut state = if score[1] > score[0] { 1 } else { 0 };
    let mut path = vec![false; probs.len()];
    for i in (0..probs.len()).rev() {
        path[i] = state == 1;
        state = back[i][state];
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::synth::{generate_sine, generate_white_noise};

    #[test]
    fn test_frame_length_for_common_rates() {
        assert_eq!(frame_length_for(22050), 2048);
        assert_eq!(frame_length_for(44100), 4096);
        assert_eq!(frame_length_for(16000), 2048);
        assert_eq!(frame_length_for(8000), 1024);
    }

    #[test]
    fn test_beta_prior_sums_to_one() {
        let total: f64 = threshold_weights().iter().map(|(_, w)| w).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(beta_cdf(0.0), 0.0);
    }

    #[test]
    fn test_lag_range_follows_bounds() {
        let tracker = PitchTracker::new(22050, PitchConfig::default());
        assert_eq!(tracker.lag_range(), (55, 441));
    }

    #[test]
    fn test_frame_with_late_onset_is_not_silent() {
        let sample_rate = 22050;
        let tracker = PitchTracker::new(sample_rate, PitchConfig::default());
        let frame_length = tracker.frame_length();

        let mut frame = vec![0.0f32; frame_length / 2];
        let tone = generate_sine(220.0, sample_rate, 1.0, 0.8);
        frame.extend_from_slice(&tone[..frame_length / 2]);

        assert!(tracker.normalized_difference(&frame).is_some());
        assert!(tracker.normalized_difference(&vec![0.0; frame_length]).is_none());
    }

    #[test]
    fn test_sine_pitch() {
        let sample_rate = 22050;
        let samples = generate_sine(220.0, sample_rate, 1.0, 0.8);
        let track = PitchTracker::new(sample_rate, PitchConfig::default()).track(&samples);

        assert!(!track.is_empty());
        assert_eq!(track.num_voiced(), track.len());
        for f0 in track.voiced_f0() {
            assert!((f0 - 220.0).abs() < 2.0, "Expected ~220 Hz, got {}", f0);
        }
    }

    #[test]
    fn test_low_pitch_near_floor() {
        let sample_rate = 16000;
        let samples = generate_sine(60.0, sample_rate, 1.0, 0.8);
        let track = PitchTracker::new(sample_rate, PitchConfig::default()).track(&samples);

        let f0 = track.voiced_f0();
        assert!(!f0.is_empty());
        let mean = f0.iter().sum::<f64>() / f0.len() as f64;
        assert!((mean - 60.0).abs() < 2.0, "Expected ~60 Hz, got {}", mean);
    }

    #[test]
    fn test_silence_is_unvoiced() {
        let samples = vec![0.0; 22050];
        let track = PitchTracker::new(22050, PitchConfig::default()).track(&samples);

        assert!(!track.is_empty());
        assert_eq!(track.num_voiced(), 0);
        assert!(track.frames.iter().all(|f| f.voiced_prob == 0.0));
    }

    #[test]
    fn test_noise_is_mostly_unvoiced() {
        let samples = generate_white_noise(22050, 1.0, 0.5, 7);
        let track = PitchTracker::new(22050, PitchConfig::default()).track(&samples);
        assert!(track.num_voiced() * 4 < track.len());
    }

    #[test]
    fn test_short_input_has_no_frames() {
        let track = PitchTracker::new(22050, PitchConfig::default()).track(&[0.1; 100]);
        assert!(track.is_empty());
        assert!(track.voiced_f0().is_empty());
    }

    #[test]
    fn test_viterbi_smooths_isolated_flip() {
        let probs = [0.9, 0.9, 0.3, 0.9, 0.9];
        assert_eq!(viterbi_voicing(&probs, 0.01), vec![true; 5]);
    }

    #[test]
    fn test_viterbi_follows_sustained_change() {
        let probs = [0.95; 10]
            .iter()
            .chain([0.02; 10].iter())
            .copied()
            .collect::<Vec<_>>();
        let path = viterbi_voicing(&probs, 0.01);
        assert!(path[..10].iter().all(|&v| v));
        assert!(path[10..].iter().all(|&v| !v));
    }

    #[test]
    fn test_refine_lag_centres_symmetric_trough() {
        let cmndf = [1.0, 0.5, 0.1, 0.5, 1.0];
        assert!((refine_lag(&cmndf, 2) - 2.0).abs() < 1e-12);
    }
}
