//! Voice Prosody
//!
//! Prosodic and voice-quality feature extraction from a single audio file.
//!
//! # Features
//!
//! - Audio decoding (WAV, MP3, FLAC, AAC) via Symphonia, mixed to mono
//! - Probabilistic YIN pitch tracking bounded to the speaking range
//! - Short-time RMS energy, spectral centroid and roll-off via RustFFT
//! - Tempo and beat tracking over a spectral-flux onset envelope
//! - Pause detection, jitter and shimmer
//! - A fixed four-section JSON report (pitch, energy, timing, voice quality)
//!
//! # Example
//!
//! ```no_run
//! use voice_prosody::{extract_prosodic_features, ProsodyConfig};
//!
//! let report = extract_prosodic_features("speech.wav", &ProsodyConfig::default()).unwrap();
//! println!("{}", report.to_json_pretty().unwrap());
//! ```

pub mod audio;
pub mod extractor;
pub mod features;
pub mod report;

// Re-export commonly used types
pub use audio::{load_waveform, AudioError, SpectrumAnalyzer, Waveform};
pub use extractor::{analyze_waveform, extract_prosodic_features, ExtractionError, ProsodyConfig};
pub use features::{BeatTrack, EnergyTrack, PitchTrack, PitchTracker, SpectralTrack};
pub use report::{
    EnergySummary, PitchSummary, ProsodyReport, TimingSummary, VoiceQualitySummary,
};
