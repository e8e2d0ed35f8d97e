//! FFmpeg CLI wrapper and audio processing for batch composition.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with cancellation and timeouts
//! - Duration probing through ffprobe
//! - Loudness-based silence trimming of voice tracks
//! - Cut, mux and concat operations used to compose an artifact

pub mod command;
pub mod compose;
pub mod error;
pub mod fs_utils;
pub mod probe;
pub mod silence;

#[cfg(all(test, unix))]
mod testing;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use compose::{
    concat_single, concat_with_body, cut_to_duration, mux_voice_over, transcode,
    write_concat_manifest,
};
pub use error::{MediaError, MediaResult};
pub use fs_utils::{copy_file, move_file};
pub use probe::{get_duration, get_duration_guarded, get_duration_with};
pub use silence::{trim_silence, SilenceTrimConfig};
