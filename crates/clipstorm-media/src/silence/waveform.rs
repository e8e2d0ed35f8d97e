//! Decoded PCM audio.

/// Interleaved PCM samples normalized to `[-1.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    channels: u16,
    sample_rate: u32,
}

impl Waveform {
    /// Wrap interleaved samples. A trailing partial frame is dropped.
    pub fn new(mut samples: Vec<f32>, channels: u16, sample_rate: u32) -> Self {
        let channels = channels.max(1);
        let whole = samples.len() - samples.len() % channels as usize;
        samples.truncate(whole);
        Self {
            samples,
            channels,
            sample_rate: sample_rate.max(1),
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames (one sample per channel).
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Length in whole milliseconds, rounded.
    pub fn duration_ms(&self) -> u64 {
        ((self.frame_count() as f64 * 1000.0) / self.sample_rate as f64).round() as u64
    }

    /// Length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }

    /// Frame index at a millisecond position, clamped to the track.
    pub fn ms_to_frame(&self, ms: u64) -> usize {
        let frame = (ms as u128 * self.sample_rate as u128 / 1000) as usize;
        frame.min(self.frame_count())
    }

    /// Interleaved samples of frames `[start, end)`.
    pub fn frames(&self, start: usize, end: usize) -> &[f32] {
        let ch = self.channels as usize;
        let end = end.min(self.frame_count());
        let start = start.min(end);
        &self.samples[start * ch..end * ch]
    }
}
