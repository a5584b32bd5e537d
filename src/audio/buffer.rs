// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Mono sample buffers, silence trimming and concatenation.

use std::time::Duration;

/// Amplitude at or below which a sample counts as silence
pub const SILENCE_THRESHOLD: f32 = 0.01;

/// Samples kept before the first and after the last audible sample
const TRIM_PADDING: usize = 100;

/// Decoded mono PCM with its sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Create a buffer from raw samples
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// A buffer of `len` zero samples
    pub fn silence(len: usize, sample_rate: u32) -> Self {
        Self::new(vec![0.0; len], sample_rate)
    }

    /// Raw samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Consume into raw samples
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length in samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check for an empty buffer
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Playback duration
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }
}

/// Cut leading and trailing silence from a clip.
///
/// The first sample louder than `threshold` (minus [`TRIM_PADDING`], clamped
/// to 0) becomes the start and the last one (plus padding, clamped to the
/// length) the end. A clip with no audible sample is returned whole.
pub fn trim_silence(buffer: &SampleBuffer, threshold: f32) -> SampleBuffer {
    let samples = buffer.samples();
    let loud = |s: &f32| s.abs() > threshold;

    let (start, end) = match (samples.iter().position(loud), samples.iter().rposition(loud)) {
        (Some(first), Some(last)) => (
            first.saturating_sub(TRIM_PADDING),
            (last + TRIM_PADDING).min(samples.len()),
        ),
        _ => (0, samples.len()),
    };

    SampleBuffer::new(samples[start..end].to_vec(), buffer.sample_rate())
}

/// Trim every buffer and join them back to back at `sample_rate`
pub fn combine(buffers: &[&SampleBuffer], sample_rate: u32) -> SampleBuffer {
    let trimmed: Vec<SampleBuffer> = buffers
        .iter()
        .map(|b| trim_silence(b, SILENCE_THRESHOLD))
        .collect();

    let total: usize = trimmed.iter().map(SampleBuffer::len).sum();
    let mut samples = Vec::with_capacity(total);
    for buffer in &trimmed {
        samples.extend_from_slice(buffer.samples());
    }

    SampleBuffer::new(samples, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Silence, a burst of tone, then silence
    fn padded_clip(lead: usize, body: usize, tail: usize) -> SampleBuffer {
        let mut samples = vec![0.0; lead];
        samples.extend((0..body).map(|i| if i % 2 == 0 { 0.5 } else { -0.5 }));
        samples.extend(vec![0.0; tail]);
        SampleBuffer::new(samples, 8000)
    }

    #[test]
    fn test_trim_all_silent_returns_whole_buffer() {
        let silent = SampleBuffer::silence(500, 8000);
        let trimmed = trim_silence(&silent, SILENCE_THRESHOLD);
        assert_eq!(trimmed, silent);
    }

    #[test]
    fn test_trim_empty_buffer() {
        let empty = SampleBuffer::new(Vec::new(), 8000);
        assert!(trim_silence(&empty, SILENCE_THRESHOLD).is_empty());
    }

    #[test]
    fn test_trim_keeps_padding() {
        let clip = padded_clip(1000, 200, 1000);
        let trimmed = trim_silence(&clip, SILENCE_THRESHOLD);
        // start = 1000 - 100, end = 1199 + 100
        assert_eq!(trimmed.len(), 1299 - 900);
        assert_eq!(trimmed.samples()[100], 0.5);
        assert_eq!(trimmed.sample_rate(), 8000);
    }

    #[test]
    fn test_trim_clamps_at_edges() {
        let clip = padded_clip(20, 50, 30);
        let trimmed = trim_silence(&clip, SILENCE_THRESHOLD);
        assert_eq!(trimmed.len(), clip.len());
    }

    #[test]
    fn test_trim_threshold_is_exclusive() {
        let clip = SampleBuffer::new(vec![0.0, SILENCE_THRESHOLD, -SILENCE_THRESHOLD, 0.0], 8000);
        let trimmed = trim_silence(&clip, SILENCE_THRESHOLD);
        assert_eq!(trimmed.len(), 4);
    }

    #[test]
    fn test_combine_length_is_sum_of_trimmed() {
        let a = padded_clip(1000, 300, 1000);
        let b = padded_clip(50, 10, 500);
        let c = SampleBuffer::silence(250, 8000);

        let expected: usize = [&a, &b, &c]
            .iter()
            .map(|x| trim_silence(x, SILENCE_THRESHOLD).len())
            .sum();

        let combined = combine(&[&a, &b, &c], 44100);
        assert_eq!(combined.len(), expected);
        assert_eq!(combined.sample_rate(), 44100);
    }

    #[test]
    fn test_combine_preserves_order() {
        let a = SampleBuffer::new(vec![0.2; 10], 8000);
        let b = SampleBuffer::new(vec![0.4; 10], 8000);
        let combined = combine(&[&a, &b], 8000);
        assert_eq!(combined.samples()[0], 0.2);
        assert_eq!(combined.samples()[19], 0.4);
    }

    #[test]
    fn test_duration() {
        let buffer = SampleBuffer::silence(4000, 8000);
        assert_eq!(buffer.duration(), Duration::from_millis(500));
    }
}
