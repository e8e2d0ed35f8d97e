//! Trim silence from a voice track and export the kept audio.

use std::path::{Path, PathBuf};

use clipstorm_models::TrimResult;
use tracing::{debug, info};

use super::config::SilenceTrimConfig;
use super::decode::{decode_audio, write_wav};
use super::segmenter::{compute_segment_stats, split_on_silence, timeline, Segment};
use super::waveform::Waveform;
use crate::command::FfmpegRunner;
use crate::error::{MediaError, MediaResult};

/// Remove silent stretches from `input`.
///
/// Kept chunks are concatenated in order into `<stem>_trimmed.wav` inside
/// `work_dir`. When nothing is retained the original path comes back with
/// its full duration so the caller can still compose with it.
pub async fn trim_silence(
    runner: &FfmpegRunner,
    input: &Path,
    work_dir: &Path,
    config: &SilenceTrimConfig,
) -> MediaResult<TrimResult> {
    let wave = decode_audio(runner, input, work_dir).await?;

    let input_owned = input.to_path_buf();
    let output = trimmed_path(input, work_dir);
    let config = config.clone();

    tokio::task::spawn_blocking(move || trim_waveform(&wave, &input_owned, &output, &config))
        .await
        .map_err(|e| MediaError::internal(e.to_string()))?
}

fn trimmed_path(input: &Path, work_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "voice".to_string());
    work_dir.join(format!("{}_trimmed.wav", stem))
}

/// Split, join and export an already decoded track.
pub fn trim_waveform(
    wave: &Waveform,
    input: &Path,
    output: &Path,
    config: &SilenceTrimConfig,
) -> MediaResult<TrimResult> {
    let keeps = split_on_silence(wave, config);
    let stats = compute_segment_stats(&timeline(&keeps, wave.duration_ms()));

    let kept = join_chunks(wave, &keeps);
    let kept_frames = kept.len() / wave.channels() as usize;

    if kept_frames == 0 {
        info!(
            input = %input.display(),
            duration_secs = wave.duration_secs(),
            "No audible audio found, keeping voice track untrimmed"
        );
        return Ok(TrimResult::new(input, wave.duration_secs()));
    }

    write_wav(output, &kept, wave.channels(), wave.sample_rate())?;

    let trimmed_secs = kept_frames as f64 / wave.sample_rate() as f64;
    debug!(
        input = %input.display(),
        output = %output.display(),
        chunks = stats.keep_count,
        cut_ms = stats.total_cut_ms,
        keep_ratio = stats.keep_ratio,
        trimmed_secs,
        "Trimmed voice track"
    );

    Ok(TrimResult::new(output, trimmed_secs))
}

/// Concatenate the samples of every kept segment in order.
fn join_chunks(wave: &Waveform, keeps: &[Segment]) -> Vec<f32> {
    let mut out = Vec::new();
    for keep in keeps {
        let start = wave.ms_to_frame(keep.start_ms);
        let end = wave.ms_to_frame(keep.end_ms);
        out.extend_from_slice(wave.frames(start, end));
    }
    out
}
