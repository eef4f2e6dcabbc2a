//! Feature extraction passes.
//!
//! Each pass reads the mono waveform independently:
//! - Probabilistic YIN pitch tracking
//! - Short-time RMS energy
//! - Spectral centroid and roll-off
//! - Onset strength, tempo and beat tracking
//! - Pause detection over the energy envelope
//! - Jitter and shimmer voice-quality proxies

pub mod energy;
pub mod pauses;
pub mod pitch;
pub mod rhythm;
pub mod spectral;
pub mod stats;
pub mod voice_quality;

pub use energy::{calculate_rms, EnergyTrack};
pub use pauses::{detect_pauses, Pause};
pub use pitch::{PitchConfig, PitchFrame, PitchTrack, PitchTracker};
pub use rhythm::{detect_beats, estimate_tempo, onset_strength, track_beats, BeatTrack};
pub use spectral::SpectralTrack;
pub use voice_quality::{jitter, shimmer, Formant, FORMANTS, HNR_DB};
