//! Silence trimming for voiceover tracks.
//!
//! Loudness-based, not speech-aware: a stretch is silent when its RMS level
//! stays far enough below the track's own average for long enough.
//!
//! # Pipeline
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ Voice file   │───►│ Decode       │───►│ Segmenter    │───►│ Join + WAV   │
//! │ (wav / mp3)  │    │ (hound/ffmpeg)│   │ (Keep/Cut)   │    │ export       │
//! └──────────────┘    └──────────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use clipstorm_media::silence::{trim_silence, SilenceTrimConfig};
//!
//! let result = trim_silence(&runner, &voice, &work_dir, &SilenceTrimConfig::default()).await?;
//! println!("{} s kept", result.trimmed_duration_secs);
//! ```

mod config;
mod decode;
mod segmenter;
mod trim;
mod waveform;

pub use config::SilenceTrimConfig;
pub use decode::{decode_audio, read_wav, transcode_to_wav, write_wav};
pub use segmenter::{
    compute_segment_stats, detect_nonsilent, detect_silence, from_dbfs, split_on_silence,
    timeline, to_dbfs, LoudnessIndex, Segment, SegmentLabel, SegmentStats,
};
pub use trim::{trim_silence, trim_waveform};
pub use waveform::Waveform;
