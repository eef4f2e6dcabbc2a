//! Onset strength, tempo estimation and beat tracking.
//!
//! 1. Spectral flux over log-magnitude frames gives an onset envelope.
//! 2. Its autocorrelation, weighted by a log-normal tempo prior, gives the
//!    global tempo.
//! 3. Dynamic programming picks the beat sequence that best balances onset
//!    strength against deviation from that tempo.

use crate::audio::{Framing, SpectrumAnalyzer};
use crate::features::stats::{coefficient_of_variation, diff, std_dev};

/// Centre of the tempo prior.
const START_BPM: f64 = 120.0;
/// Width of the tempo prior in octaves.
const TEMPO_STD_OCTAVES: f64 = 1.0;
const MIN_BPM: f64 = 30.0;
const MAX_BPM: f64 = 320.0;
/// Penalty weight for beat spacing that deviates from the tempo period.
const TIGHTNESS: f64 = 100.0;
/// Magnitude floor before taking logarithms.
const MAGNITUDE_FLOOR: f32 = 1e-5;

/// Estimated tempo and beat positions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeatTrack {
    /// Global tempo in beats per minute; 0 when no onsets were found.
    pub tempo: f64,
    /// Beat times in seconds, ascending.
    pub beats: Vec<f64>,
}

impl BeatTrack {
    /// Coefficient of variation of the inter-beat intervals.
    pub fn interval_variation(&self) -> Option<f64> {
        coefficient_of_variation(&diff(&self.beats))
    }
}

/// Onset strength per frame: mean positive rise in log magnitude.
pub fn onset_strength(samples: &[f32], framing: &Framing) -> Vec<f64> {
    let mut analyzer = SpectrumAnalyzer::new(framing.frame_length);
    let mut previous: Option<Vec<f32>> = None;
    let mut envelope = Vec::with_capacity(framing.num_frames(samples.len()));

    for frame in framing.frames(samples) {
        let log_mag: Vec<f32> = analyzer
            .magnitudes(&frame)
            .iter()
            .map(|&m| 20.0 * m.clamp(MAGNITUDE_FLOOR, f32::MAX).log10())
            .collect();

        let flux = match &previous {
            Some(prev) => {
                let rise: f32 = log_mag
                    .iter()
                    .zip(prev)
                    .map(|(cur, old)| (cur - old).max(0.0))
                    .sum();
                rise as f64 / log_mag.len() as f64
            }
            None => 0.0,
        };

        envelope.push(flux);
        previous = Some(log_mag);
    }

    envelope
}

/// Estimate tempo (BPM) from an onset envelope sampled at `frame_rate` Hz.
///
/// Returns 0 when the envelope is flat or too short to hold one beat period.
pub fn estimate_tempo(onset: &[f64], frame_rate: f64) -> f64 {
    if onset.iter().all(|&v| v <= f64::EPSILON) || frame_rate <= 0.0 {
        return 0.0;
    }

    let min_lag = ((60.0 * frame_rate / MAX_BPM).floor() as usize).max(1);
    let max_lag =
        ((60.0 * frame_rate / MIN_BPM).ceil() as usize).min(onset.len().saturating_sub(1));
    if max_lag <= min_lag {
        return 0.0;
    }

    let autocorr = |lag: usize| -> f64 {
        onset[lag..]
            .iter()
            .zip(onset)
            .map(|(a, b)| a * b)
            .sum::<f64>()
            / (onset.len() - lag) as f64
    };

    let weighted: Vec<(usize, f64)> = (min_lag..=max_lag)
        .map(|lag| {
            let bpm = 60.0 * frame_rate / lag as f64;
            let octaves = (bpm / START_BPM).log2() / TEMPO_STD_OCTAVES;
            (lag, autocorr(lag) * (-0.5 * octaves * octaves).exp())
        })
        .collect();

    let Some(best_idx) =
        (0..weighted.len()).max_by(|&a, &b| weighted[a].1.total_cmp(&weighted[b].1))
    else {
        return 0.0;
    };

    if weighted[best_idx].1 <= 0.0 {
        return 0.0;
    }

    // Sub-frame refinement around the peak.
    let mut lag = weighted[best_idx].0 as f64;
    if best_idx > 0 && best_idx + 1 < weighted.len() {
        let (a, b, c) = (
            weighted[best_idx - 1].1,
            weighted[best_idx].1,
            weighted[best_idx + 1].1,
        );
        let denom = a - 2.0 * b + c;
        if denom < 0.0 {
            lag += (0.5 * (a - c) / denom).clamp(-0.5, 0.5);
        }
    }

    60.0 * frame_rate / lag
}

/// Dynamic-programming beat tracker over an onset envelope.
///
/// Returns beat positions as frame indices.
pub fn track_beats(onset: &[f64], tempo: f64, frame_rate: f64) -> Vec<usize> {
    if tempo <= 0.0 || onset.iter().all(|&v| v <= f64::EPSILON) {
        return Vec::new();
    }

    let period = 60.0 * frame_rate / tempo;
    if period < 1.0 {
        return Vec::new();
    }

    let local = local_score(onset, period);
    let n = local.len();

    let mut cumulative = vec![0.0; n];
    let mut backlink: Vec<Option<usize>> = vec![None; n];

    let window_start = (2.0 * period).round() as usize;
    let window_end = (period / 2.0).round().max(1.0) as usize;
    let start_threshold = 0.01 * local.iter().cloned().fold(0.0, f64::max);
    let mut first_beat = true;

    for i in 0..n {
        // Nothing links back until the first real onset.
        if first_beat && local[i] < start_threshold {
            cumulative[i] = local[i];
            continue;
        }
        first_beat = false;

        // Predecessors before the start of the signal score zero.
        let lo = i as isize - window_start as isize;
        let hi = i as isize - window_end as isize;

        let mut best: Option<(Option<usize>, f64)> = None;
        for prev in lo..=hi {
            let gap = (i as isize - prev) as f64;
            let penalty = -TIGHTNESS * (gap / period).ln().powi(2);
            let (link, base) = if prev >= 0 {
                (Some(prev as usize), cumulative[prev as usize])
            } else {
                (None, 0.0)
            };
            if best.map_or(true, |(_, s)| base + penalty > s) {
                best = Some((link, base + penalty));
            }
        }

        cumulative[i] = local[i] + best.map_or(0.0, |(_, s)| s);
        backlink[i] = best.and_then(|(link, _)| link);
    }

    let Some(last) = last_beat(&cumulative) else {
        return Vec::new();
    };

    let mut beats = vec![last];
    let mut cursor = last;
    while let Some(prev) = backlink[cursor] {
        beats.push(prev);
        cursor = prev;
    }
    beats.reverse();

    trim_weak_beats(&beats, &local)
}

/// Onset envelope normalised by its standard deviation and smoothed with a
/// Gaussian one beat period wide.
fn local_score(onset: &[f64], period: f64) -> Vec<f64> {
    let sd = std_dev(onset)
        .filter(|s| *s > f64::EPSILON)
        .unwrap_or(1.0);
    let normalized: Vec<f64> = onset.iter().map(|v| v / sd).collect();

    let half = period.round() as isize;
    let kernel: Vec<f64> = (-half..=half)
        .map(|k| (-0.5 * (k as f64 * 32.0 / period).powi(2)).exp())
        .collect();

    (0..normalized.len() as isize)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .filter_map(|(j, w)| {
                    let idx = i + j as isize - half;
                    (idx >= 0 && (idx as usize) < normalized.len())
                        .then(|| normalized[idx as usize] * w)
                })
                .sum()
        })
        .collect()
}

/// Last local maximum of the cumulative score that is at least half the
/// median of all local maxima.
fn last_beat(cumulative: &[f64]) -> Option<usize> {
    let n = cumulative.len();
    let is_peak = |i: usize| {
        let left = i == 0 || cumulative[i] > cumulative[i - 1];
        let right = i + 1 == n || cumulative[i] >= cumulative[i + 1];
        left && right
    };

    let mut peaks: Vec<f64> = (0..n).filter(|&i| is_peak(i)).map(|i| cumulative[i]).collect();
    if peaks.is_empty() {
        return None;
    }
    peaks.sort_by(|a, b| a.total_cmp(b));
    let threshold = 0.5 * peaks[peaks.len() / 2];

    (0..n).rev().find(|&i| is_peak(i) && cumulative[i] >= threshold)
}

/// Drop leading and trailing beats whose local score is under half the RMS
/// of the local score at all beats.
fn trim_weak_beats(beats: &[usize], local: &[f64]) -> Vec<usize> {
    let strengths: Vec<f64> = beats.iter().map(|&b| local[b]).collect();
    let rms = (strengths.iter().map(|s| s * s).sum::<f64>() / strengths.len().max(1) as f64).sqrt();
    let threshold = 0.5 * rms;

    let first = strengths.iter().position(|&s| s >= threshold);
    let last = strengths.iter().rposition(|&s| s >= threshold);
    match (first, last) {
        (Some(first), Some(last)) => beats[first..=last].to_vec(),
        _ => Vec::new(),
    }
}

/// Full pass: onset envelope, tempo, and beat times in seconds.
pub fn detect_beats(samples: &[f32], sample_rate: u32, framing: &Framing) -> BeatTrack {
    if sample_rate == 0 {
        return BeatTrack::default();
    }

    let onset = onset_strength(samples, framing);
    let frame_rate = sample_rate as f64 / framing.hop_length as f64;
    let tempo = estimate_tempo(&onset, frame_rate);
    let beats = track_beats(&onset, tempo, frame_rate)
        .into_iter()
        .map(|frame| framing.frame_time(frame, sample_rate))
        .collect();

    BeatTrack { tempo, beats }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::synth::generate_click_track;

    const SAMPLE_RATE: u32 = 44100;

    fn framing() -> Framing {
        Framing::new(2048, 512, true)
    }

    #[test]
    fn test_silence_has_no_onsets() {
        let onset = onset_strength(&vec![0.0; SAMPLE_RATE as usize], &framing());
        assert!(onset.iter().all(|&v| v == 0.0));
        assert_eq!(estimate_tempo(&onset, 86.13), 0.0);
        assert!(track_beats(&onset, 120.0, 86.13).is_empty());
    }

    #[test]
    fn test_onsets_peak_at_clicks() {
        let samples = generate_click_track(60.0, SAMPLE_RATE, 3.0, 1000.0);
        let onset = onset_strength(&samples, &framing());

        let max = onset.iter().cloned().fold(0.0, f64::max);
        assert!(max > 0.0);
        // A quiet stretch between the first and second clicks
        let frame_rate = SAMPLE_RATE as f64 / 512.0;
        let mid = (0.5 * frame_rate) as usize;
        assert!(onset[mid] < max * 0.1);
    }

    #[test]
    fn test_tempo_from_synthetic_envelope() {
        // Impulses every 40 frames at 80 frames/s: 120 BPM
        let mut onset = vec![0.0; 800];
        for i in (0..800).step_by(40) {
            onset[i] = 1.0;
        }
        let tempo = estimate_tempo(&onset, 80.0);
        assert!((tempo - 120.0).abs() < 3.0, "Expected ~120 BPM, got {}", tempo);
    }

    #[test]
    fn test_beats_follow_impulses() {
        let mut onset = vec![0.0; 800];
        for i in (20..800).step_by(40) {
            onset[i] = 1.0;
        }
        let beats = track_beats(&onset, 120.0, 80.0);

        assert!(beats.len() >= 15, "got {} beats", beats.len());
        for pair in beats.windows(2) {
            assert_eq!(pair[1] - pair[0], 40);
        }
    }

    #[test]
    fn test_click_track_tempo_and_regularity() {
        let samples = generate_click_track(120.0, SAMPLE_RATE, 8.0, 1000.0);
        let track = detect_beats(&samples, SAMPLE_RATE, &framing());

        assert!((track.tempo - 120.0).abs() < 6.0, "Expected ~120 BPM, got {}", track.tempo);
        assert!(track.beats.len() >= 8);
        let cv = track.interval_variation().unwrap();
        assert!(cv < 0.1, "beat intervals should be regular, cv = {}", cv);
    }

    #[test]
    fn test_too_short_envelope() {
        assert_eq!(estimate_tempo(&[1.0, 0.5], 86.0), 0.0);
        let track = detect_beats(&[0.3; 100], SAMPLE_RATE, &framing());
        assert_eq!(track.tempo, 0.0);
        assert!(track.beats.is_empty());
    }
}
