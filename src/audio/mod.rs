//! Audio decoding and short-time signal plumbing.
//!
//! This module provides:
//! - Audio file decoding via Symphonia (WAV, MP3, FLAC, AAC) into a mono waveform
//! - Windowed magnitude spectra via RustFFT
//! - Frame slicing with optional centre padding
//! - Synthetic signals and a WAV writer for tests and benchmarks

pub mod fft;
pub mod frames;
pub mod loader;
pub mod synth;

pub use fft::SpectrumAnalyzer;
pub use frames::Framing;
pub use loader::{downmix, load_waveform, AudioError, Waveform};
pub use synth::{
    generate_click_track, generate_gated_tone, generate_sine, generate_white_noise, write_wav,
};
