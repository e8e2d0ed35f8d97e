//! Configuration for silence trimming.
//!
//! These parameters control what counts as silence in a voiceover and how
//! much of it survives around the retained speech.

use serde::{Deserialize, Serialize};

/// Configuration for splitting a voice track on silence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SilenceTrimConfig {
    /// Minimum length of a silent span before it is cut (milliseconds).
    pub min_silence_ms: u64,

    /// Silence level relative to the track's overall loudness (dB).
    ///
    /// A window is silent when its RMS level is at or below
    /// `track_dBFS - threshold_offset_db`.
    pub threshold_offset_db: f64,

    /// Silence kept on each side of a cut (milliseconds).
    ///
    /// Prevents words from starting or ending abruptly.
    pub keep_silence_ms: u64,

    /// Step between candidate silence windows (milliseconds).
    pub seek_step_ms: u64,
}

impl Default for SilenceTrimConfig {
    fn default() -> Self {
        Self {
            min_silence_ms: 300,
            threshold_offset_db: 30.0,
            keep_silence_ms: 150,
            seek_step_ms: 1,
        }
    }
}

impl SilenceTrimConfig {
    /// Builder-style setter for minimum silence duration.
    pub fn with_min_silence_ms(mut self, ms: u64) -> Self {
        self.min_silence_ms = ms.max(1);
        self
    }

    /// Builder-style setter for the threshold offset.
    pub fn with_threshold_offset_db(mut self, db: f64) -> Self {
        self.threshold_offset_db = db.abs();
        self
    }

    /// Builder-style setter for kept padding.
    pub fn with_keep_silence_ms(mut self, ms: u64) -> Self {
        self.keep_silence_ms = ms;
        self
    }

    /// Builder-style setter for the window step.
    pub fn with_seek_step_ms(mut self, ms: u64) -> Self {
        self.seek_step_ms = ms.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SilenceTrimConfig::default();
        assert_eq!(config.min_silence_ms, 300);
        assert!((config.threshold_offset_db - 30.0).abs() < f64::EPSILON);
        assert_eq!(config.keep_silence_ms, 150);
        assert_eq!(config.seek_step_ms, 1);
    }

    #[test]
    fn test_builder_pattern() {
        let config = SilenceTrimConfig::default()
            .with_min_silence_ms(500)
            .with_keep_silence_ms(100);

        assert_eq!(config.min_silence_ms, 500);
        assert_eq!(config.keep_silence_ms, 100);
    }

    #[test]
    fn test_zero_windows_clamped() {
        let config = SilenceTrimConfig::default()
            .with_min_silence_ms(0)
            .with_seek_step_ms(0);
        assert_eq!(config.min_silence_ms, 1);
        assert_eq!(config.seek_step_ms, 1);
    }
}
