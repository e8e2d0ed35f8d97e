//! Silence trimming results.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A voice track with its silent spans removed.
///
/// When nothing was retained the path is the original, untrimmed input and
/// the duration is its full length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimResult {
    pub trimmed_audio_path: PathBuf,
    pub trimmed_duration_secs: f64,
}

impl TrimResult {
    pub fn new(trimmed_audio_path: impl Into<PathBuf>, trimmed_duration_secs: f64) -> Self {
        Self {
            trimmed_audio_path: trimmed_audio_path.into(),
            trimmed_duration_secs,
        }
    }
}
