//! The JSON record emitted for one audio file.

use serde::{Deserialize, Serialize};

use crate::features::{Formant, Pause};

/// Prosodic summary of one audio file, in four fixed sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProsodyReport {
    pub pitch: PitchSummary,
    pub energy: EnergySummary,
    pub timing: TimingSummary,
    pub voice_quality: VoiceQualitySummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PitchSummary {
    /// Mean f0 of voiced frames in Hz.
    pub mean_f0: f64,
    /// Population variance of voiced f0.
    pub f0_variance: f64,
    /// Peak-to-peak of voiced f0 in Hz.
    pub f0_range: f64,
    /// Leading voiced f0 values, truncated.
    pub pitch_contour: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnergySummary {
    pub mean_energy: f64,
    pub energy_variance: f64,
    /// Peak-to-peak of per-frame energy.
    pub dynamic_range: f64,
    /// Leading per-frame energy values, truncated.
    pub energy_contour: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimingSummary {
    /// Tempo × 2. A rough proxy, not a measured syllable or word rate.
    pub speaking_rate: f64,
    pub pause_patterns: Vec<Pause>,
    /// Coefficient of variation of inter-beat intervals.
    pub rhythm_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VoiceQualitySummary {
    pub jitter: f64,
    pub shimmer: f64,
    pub hnr: f64,
    pub formants: Vec<Formant>,
}

impl ProsodyReport {
    /// Pretty-printed JSON with two-space indentation.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Every scalar and contour value in the report.
    pub fn numeric_values(&self) -> Vec<f64> {
        let mut values = vec![
            self.pitch.mean_f0,
            self.pitch.f0_variance,
            self.pitch.f0_range,
            self.energy.mean_energy,
            self.energy.energy_variance,
            self.energy.dynamic_range,
            self.timing.speaking_rate,
            self.timing.rhythm_score,
            self.voice_quality.jitter,
            self.voice_quality.shimmer,
            self.voice_quality.hnr,
        ];
        values.extend(&self.pitch.pitch_contour);
        values.extend(&self.energy.energy_contour);
        for pause in &self.timing.pause_patterns {
            values.extend([pause.start, pause.duration]);
        }
        for formant in &self.voice_quality.formants {
            values.extend([formant.frequency, formant.bandwidth]);
        }
        values
    }

    /// True when no field is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.numeric_values().iter().all(|v| v.is_finite())
    }
}
