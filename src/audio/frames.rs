//! Frame slicing for short-time analysis.

/// How a signal is cut into overlapping frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Framing {
    pub frame_length: usize,
    pub hop_length: usize,
    /// Pad `frame_length / 2` zeros on both sides so frame `i` is centred
    /// on sample `i * hop_length`.
    pub center: bool,
}

impl Framing {
    pub fn new(frame_length: usize, hop_length: usize, center: bool) -> Self {
        Self {
            frame_length,
            hop_length: hop_length.max(1),
            center,
        }
    }

    /// Number of frames produced for a signal of `len` samples.
    ///
    /// Centred framing always yields `1 + len / hop` frames. Uncentred
    /// framing only yields frames that fit entirely inside the signal.
    pub fn num_frames(&self, len: usize) -> usize {
        if self.center {
            1 + len / self.hop_length
        } else if len < self.frame_length {
            0
        } else {
            1 + (len - self.frame_length) / self.hop_length
        }
    }

    /// Cut `samples` into frames, zero-filling anything outside the signal.
    pub fn frames<'a>(&'a self, samples: &'a [f32]) -> impl Iterator<Item = Vec<f32>> + 'a {
        let offset = if self.center { self.frame_length / 2 } else { 0 };

        (0..self.num_frames(samples.len())).map(move |i| {
            let start = (i * self.hop_length) as isize - offset as isize;
            (0..self.frame_length)
                .map(|j| {
                    let idx = start + j as isize;
                    if idx < 0 {
                        0.0
                    } else {
                        samples.get(idx as usize).copied().unwrap_or(0.0)
                    }
                })
                .collect()
        })
    }

    /// Time in seconds of frame `index` (its centre when centred, its start otherwise).
    pub fn frame_time(&self, index: usize, sample_rate: u32) -> f64 {
        if sample_rate == 0 {
            return 0.0;
        }
        (index * self.hop_length) as f64 / sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_frame_count() {
        let framing = Framing::new(2048, 512, true);
        assert_eq!(framing.num_frames(0), 1);
        assert_eq!(framing.num_frames(511), 1);
        assert_eq!(framing.num_frames(512), 2);
        assert_eq!(framing.num_frames(22050), 44);
    }

    #[test]
    fn test_uncentered_frame_count() {
        let framing = Framing::new(4, 2, false);
        assert_eq!(framing.num_frames(3), 0);
        assert_eq!(framing.num_frames(4), 1);
        assert_eq!(framing.num_frames(8), 3);
    }

    #[test]
    fn test_centered_frames_are_padded() {
        let framing = Framing::new(4, 2, true);
        let samples = [1.0, 2.0, 3.0, 4.0];
        let frames: Vec<Vec<f32>> = framing.frames(&samples).collect();

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0], vec![0.0, 0.0, 1.0, 2.0]);
        assert_eq!(frames[1], vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(frames[2], vec![3.0, 4.0, 0.0, 0.0]);
    }

    #[test]
    fn test_zero_hop_is_clamped() {
        let framing = Framing::new(4, 0, false);
        assert_eq!(framing.hop_length, 1);
    }
}
