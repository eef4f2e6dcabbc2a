//! Pause detection from the RMS envelope.

use serde::{Deserialize, Serialize};

/// A silent stretch between two stretches of sound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Pause {
    /// Start of the pause in seconds.
    pub start: f64,
    /// Length of the pause in seconds.
    pub duration: f64,
}

/// Find interior pauses in a per-frame RMS envelope.
///
/// A frame is silent when its RMS is more than `threshold_db` below the
/// loudest frame. Runs of silent frames lasting at least `min_duration`
/// seconds and bounded by sound on both sides are reported; leading and
/// trailing silence is not.
pub fn detect_pauses(
    rms: &[f64],
    frame_period: f64,
    threshold_db: f64,
    min_duration: f64,
) -> Vec<Pause> {
    let peak = rms.iter().cloned().fold(0.0, f64::max);
    if peak <= 0.0 || frame_period <= 0.0 {
        return Vec::new();
    }

    let floor = peak * 10f64.powf(threshold_db / 20.0);
    let silent: Vec<bool> = rms.iter().map(|&r| r < floor).collect();

    let mut pauses = Vec::new();
    let mut run_start: Option<usize> = None;
    let mut seen_sound = false;

    for (i, &is_silent) in silent.iter().enumerate() {
        match (is_silent, run_start) {
            (true, None) if seen_sound => run_start = Some(i),
            (false, Some(start)) => {
                let duration = (i - start) as f64 * frame_period;
                if duration >= min_duration {
                    pauses.push(Pause {
                        start: start as f64 * frame_period,
                        duration,
                    });
                }
                run_start = None;
            }
            _ => {}
        }
        if !is_silent {
            seen_sound = true;
        }
    }

    pauses
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_gap_is_a_pause() {
        let mut rms = vec![0.5; 10];
        rms.extend(vec![0.0; 10]);
        rms.extend(vec![0.5; 10]);

        let pauses = detect_pauses(&rms, 0.05, -40.0, 0.2);
        assert_eq!(pauses.len(), 1);
        assert!((pauses[0].start - 0.5).abs() < 1e-9);
        assert!((pauses[0].duration - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_edges_are_not_pauses() {
        let mut rms = vec![0.0; 10];
        rms.extend(vec![0.5; 10]);
        rms.extend(vec![0.0; 10]);

        assert!(detect_pauses(&rms, 0.05, -40.0, 0.2).is_empty());
    }

    #[test]
    fn test_short_gap_ignored() {
        let rms = [0.5, 0.5, 0.0, 0.0, 0.5, 0.5];
        assert!(detect_pauses(&rms, 0.05, -40.0, 0.2).is_empty());
    }

    #[test]
    fn test_threshold_is_relative_to_peak() {
        // -30 dB dip counts at a -20 dB threshold but not at -40 dB
        let rms = [1.0, 1.0, 0.03, 0.03, 0.03, 0.03, 1.0];
        assert_eq!(detect_pauses(&rms, 0.1, -20.0, 0.2).len(), 1);
        assert!(detect_pauses(&rms, 0.1, -40.0, 0.2).is_empty());
    }

    #[test]
    fn test_silence_has_no_pauses() {
        assert!(detect_pauses(&[0.0; 50], 0.05, -40.0, 0.2).is_empty());
        assert!(detect_pauses(&[], 0.05, -40.0, 0.2).is_empty());
    }
}
