//! Synthetic audio generation for tests and benchmarks.
//!
//! Generates sine tones, white noise, click tracks and gated tones, and can
//! write them to 16-bit PCM WAV files so the decoder path can be exercised.

use std::f32::consts::PI;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Generate a sine wave.
///
/// # Arguments
/// * `frequency` - Frequency in Hz
/// * `sample_rate` - Sample rate in Hz
/// * `duration` - Duration in seconds
/// * `amplitude` - Amplitude (0.0 to 1.0)
pub fn generate_sine(frequency: f32, sample_rate: u32, duration: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (duration * sample_rate as f32) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            amplitude * (2.0 * PI * frequency * t).sin()
        })
        .collect()
}

/// Generate white noise.
///
/// Uses a simple linear congruential generator for reproducibility.
pub fn generate_white_noise(
    sample_rate: u32,
    duration: f32,
    amplitude: f32,
    seed: u64,
) -> Vec<f32> {
    let num_samples = (duration * sample_rate as f32) as usize;

    let mut state = seed;
    let a: u64 = 6364136223846793005;
    let c: u64 = 1442695040888963407;

    (0..num_samples)
        .map(|_| {
            state = state.wrapping_mul(a).wrapping_add(c);
            let normalized = (state as f32 / u64::MAX as f32) * 2.0 - 1.0;
            amplitude * normalized
        })
        .collect()
}

/// Generate a click track (metronome) of short decaying sine bursts.
pub fn generate_click_track(
    bpm: f32,
    sample_rate: u32,
    duration: f32,
    click_freq: f32,
) -> Vec<f32> {
    let num_samples = (duration * sample_rate as f32) as usize;
    let samples_per_beat = (60.0 / bpm * sample_rate as f32) as usize;
    let click_samples = (sample_rate as f32 * 0.01) as usize; // 10ms click

    let mut samples = vec![0.0; num_samples];
    if samples_per_beat == 0 {
        return samples;
    }

    let mut pos = 0;
    while pos < num_samples {
        for i in 0..click_samples.min(num_samples - pos) {
            let t = i as f32 / sample_rate as f32;
            let envelope = (1.0 - i as f32 / click_samples as f32).powi(2);
            samples[pos + i] = envelope * (2.0 * PI * click_freq * t).sin();
        }
        pos += samples_per_beat;
    }

    samples
}

/// Tone, silence, tone: `tone_secs` of sine on either side of a `gap_secs` gap.
pub fn generate_gated_tone(
    frequency: f32,
    sample_rate: u32,
    tone_secs: f32,
    gap_secs: f32,
) -> Vec<f32> {
    let tone = generate_sine(frequency, sample_rate, tone_secs, 0.8);
    let gap = vec![0.0; (gap_secs * sample_rate as f32) as usize];

    let mut samples = Vec::with_capacity(tone.len() * 2 + gap.len());
    samples.extend_from_slice(&tone);
    samples.extend_from_slice(&gap);
    samples.extend_from_slice(&tone);
    samples
}

/// Write interleaved samples to a 16-bit PCM WAV file.
pub fn write_wav(
    path: &Path,
    samples: &[f32],
    sample_rate: u32,
    channels: u16,
) -> std::io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);

    let block_align = channels as u32 * 2;
    let byte_rate = sample_rate * block_align;
    let data_size = samples.len() as u32 * 2;

    file.write_all(b"RIFF")?;
    file.write_all(&(36 + data_size).to_le_bytes())?;
    file.write_all(b"WAVE")?;

    file.write_all(b"fmt ")?;
    file.write_all(&16u32.to_le_bytes())?;
    file.write_all(&1u16.to_le_bytes())?; // PCM
    file.write_all(&channels.to_le_bytes())?;
    file.write_all(&sample_rate.to_le_bytes())?;
    file.write_all(&byte_rate.to_le_bytes())?;
    file.write_all(&(block_align as u16).to_le_bytes())?;
    file.write_all(&16u16.to_le_bytes())?;

    file.write_all(b"data")?;
    file.write_all(&data_size.to_le_bytes())?;

    for &sample in samples {
        let int_sample = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
        file.write_all(&int_sample.to_le_bytes())?;
    }

    file.flush()
}
