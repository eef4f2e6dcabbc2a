//! End-to-end extraction: decode, run every feature pass, summarise.

use std::path::Path;

use crate::audio::{load_waveform, AudioError, Framing, Waveform};
use crate::features::stats::{mean, peak_to_peak, variance};
use crate::features::{
    detect_beats, detect_pauses, jitter, shimmer, EnergyTrack, PitchConfig, PitchTracker,
    SpectralTrack, FORMANTS, HNR_DB,
};
use crate::report::{
    EnergySummary, PitchSummary, ProsodyReport, TimingSummary, VoiceQualitySummary,
};

/// Pitch statistics reported when no frame is voiced.
pub const FALLBACK_MEAN_F0: f64 = 150.0;
pub const FALLBACK_F0_VARIANCE: f64 = 100.0;
pub const FALLBACK_F0_RANGE: f64 = 50.0;

/// Extraction settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ProsodyConfig {
    /// Lowest admissible f0 in Hz.
    pub fmin: f64,
    /// Highest admissible f0 in Hz.
    pub fmax: f64,
    /// Pitch frames with a lower voicing probability are never voiced.
    pub voicing_threshold: f64,
    /// Per-frame probability of a voiced/unvoiced switch.
    pub switch_prob: f64,
    /// Frame length for energy, spectral and onset analysis.
    pub frame_length: usize,
    /// Hop between energy, spectral and onset frames.
    pub hop_length: usize,
    /// Fraction of spectral magnitude under the roll-off frequency.
    pub rolloff_percent: f64,
    /// Maximum length of the pitch and energy contours in the report.
    pub contour_limit: usize,
    /// Frames quieter than this (dB relative to the loudest) are silent.
    pub pause_threshold_db: f64,
    /// Shortest silent run reported as a pause, in seconds.
    pub min_pause_seconds: f64,
}

impl Default for ProsodyConfig {
    fn default() -> Self {
        Self {
            fmin: 50.0,
            fmax: 400.0,
            voicing_threshold: 0.1,
            switch_prob: 0.01,
            frame_length: 2048,
            hop_length: 512,
            rolloff_percent: 0.85,
            contour_limit: 100,
            pause_threshold_db: -40.0,
            min_pause_seconds: 0.2,
        }
    }
}

impl ProsodyConfig {
    pub fn validate(&self) -> Result<(), ExtractionError> {
        let invalid = |msg: String| Err(ExtractionError::InvalidConfig(msg));

        if !(self.fmin > 0.0 && self.fmax > self.fmin) {
            return invalid(format!(
                "pitch bounds must satisfy 0 < fmin < fmax (got {} and {})",
                self.fmin, self.fmax
            ));
        }
        if !(0.0..1.0).contains(&self.voicing_threshold) {
            return invalid(format!(
                "voicing_threshold must be in [0, 1), got {}",
                self.voicing_threshold
            ));
        }
        if !(0.0..1.0).contains(&self.switch_prob) {
            return invalid(format!(
                "switch_prob must be in [0, 1), got {}",
                self.switch_prob
            ));
        }
        if !self.frame_length.is_power_of_two() {
            return invalid(format!(
                "frame_length must be a power of two, got {}",
                self.frame_length
            ));
        }
        if self.hop_length == 0 {
            return invalid("hop_length must be positive".to_string());
        }
        if !(self.rolloff_percent > 0.0 && self.rolloff_percent < 1.0) {
            return invalid(format!(
                "rolloff_percent must be in (0, 1), got {}",
                self.rolloff_percent
            ));
        }
        Ok(())
    }

    pub fn pitch_config(&self) -> PitchConfig {
        PitchConfig {
            fmin: self.fmin,
            fmax: self.fmax,
            voicing_threshold: self.voicing_threshold,
            switch_prob: self.switch_prob,
        }
    }

    /// Centred framing shared by the energy, spectral and onset passes.
    pub fn framing(&self) -> Framing {
        Framing::new(self.frame_length, self.hop_length, true)
    }
}

/// Errors that can occur during extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Sample rate {0} Hz is too low for a {1} Hz pitch ceiling")]
    UnsupportedSampleRate(u32, f64),
}

/// Decode `audio_path` and extract its prosodic features.
pub fn extract_prosodic_features<P: AsRef<Path>>(
    audio_path: P,
    config: &ProsodyConfig,
) -> Result<ProsodyReport, ExtractionError> {
    config.validate()?;
    let waveform = load_waveform(audio_path.as_ref())?;
    analyze_waveform(&waveform, config)
}

/// Extract prosodic features from an in-memory mono waveform.
pub fn analyze_waveform(
    waveform: &Waveform,
    config: &ProsodyConfig,
) -> Result<ProsodyReport, ExtractionError> {
    config.validate()?;

    let sample_rate = waveform.sample_rate;
    if (sample_rate as f64) < 2.0 * config.fmax {
        return Err(ExtractionError::UnsupportedSampleRate(
            sample_rate,
            config.fmax,
        ));
    }

    let samples = &waveform.samples;
    let framing = config.framing();

    let tracker = PitchTracker::new(sample_rate, config.pitch_config());
    let pitch_track = tracker.track(samples);
    let voiced_f0 = pitch_track.voiced_f0();
    log::debug!(
        "Pitch: {} of {} frames voiced (frame {} / hop {})",
        voiced_f0.len(),
        pitch_track.len(),
        tracker.frame_length(),
        tracker.hop_length()
    );

    let energy_track = EnergyTrack::compute(samples, sample_rate, &framing);
    let energy = energy_track.energy();
    log::debug!("Energy: {} frames", energy.len());

    let spectral = SpectralTrack::compute(samples, sample_rate, &framing, config.rolloff_percent);
    log::debug!(
        "Spectral: mean centroid {:.1} Hz, mean roll-off {:.1} Hz",
        spectral.mean_centroid(),
        spectral.mean_rolloff()
    );

    let beat_track = detect_beats(samples, sample_rate, &framing);
    log::debug!(
        "Rhythm: tempo {:.1} BPM, {} beats",
        beat_track.tempo,
        beat_track.beats.len()
    );

    let pauses = detect_pauses(
        &energy_track.rms,
        energy_track.frame_period,
        config.pause_threshold_db,
        config.min_pause_seconds,
    );
    log::debug!("Pauses: {}", pauses.len());

    let pitch = summarize_pitch(&voiced_f0, config.contour_limit);

    Ok(ProsodyReport {
        pitch,
        energy: EnergySummary {
            mean_energy: mean(&energy).unwrap_or(0.0),
            energy_variance: variance(&energy).unwrap_or(0.0),
            dynamic_range: peak_to_peak(&energy).unwrap_or(0.0),
            energy_contour: truncate(&energy, config.contour_limit),
        },
        timing: TimingSummary {
            speaking_rate: beat_track.tempo * 2.0,
            pause_patterns: pauses,
            rhythm_score: beat_track.interval_variation().unwrap_or(0.0),
        },
        voice_quality: VoiceQualitySummary {
            jitter: jitter(&voiced_f0),
            shimmer: shimmer(&energy_track.rms),
            hnr: HNR_DB,
            formants: FORMANTS.to_vec(),
        },
    })
}

fn summarize_pitch(voiced_f0: &[f64], contour_limit: usize) -> PitchSummary {
    match (mean(voiced_f0), variance(voiced_f0), peak_to_peak(voiced_f0)) {
        (Some(mean_f0), Some(f0_variance), Some(f0_range)) => PitchSummary {
            mean_f0,
            f0_variance,
            f0_range,
            pitch_contour: truncate(voiced_f0, contour_limit),
        },
        _ => {
            log::warn!("No voiced frames detected; using fallback pitch statistics");
            PitchSummary {
                mean_f0: FALLBACK_MEAN_F0,
                f0_variance: FALLBACK_F0_VARIANCE,
                f0_range: FALLBACK_F0_RANGE,
                pitch_contour: Vec::new(),
            }
        }
    }
}

fn truncate(values: &[f64], limit: usize) -> Vec<f64> {
    values[..values.len().min(limit)].to_vec()
}
