//! Composition operations: cut, mux and concatenate.
//!
//! Every function here is a single black-box FFmpeg invocation (or a short
//! chain of them) over files. The `*_command` builders are separate from the
//! runners so argument layout can be checked without FFmpeg installed.
//!
//! | Operation            | Video            | Audio         |
//! |----------------------|------------------|---------------|
//! | [`cut_to_duration`]  | re-encode        | re-encode     |
//! | [`mux_voice_over`]   | copy from input 0| aac, input 1  |
//! | [`concat_with_body`] | concat filter    | concat filter |
//! | [`concat_single`]    | demuxer copy, re-encode on failure |

use std::path::{Path, PathBuf};

use clipstorm_models::EncodingConfig;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Audio layout every segment is normalized to before filter concat.
const CONCAT_SAMPLE_RATE: u32 = 48_000;
const CONCAT_CHANNELS: u32 = 2;

/// Filter joining two normalized inputs, video and audio, in order.
const CONCAT_FILTER: &str = "[0:v]setsar=1[v0];[1:v]setsar=1[v1];[v0][0:a][v1][1:a]concat=n=2:v=1:a=1[v][a]";

/// Name of the concat demuxer manifest inside a job directory.
pub const CONCAT_MANIFEST: &str = "list.txt";

/// Build the command that truncates `input` to `seconds`.
pub fn cut_command(
    input: &Path,
    output: &Path,
    seconds: f64,
    encoding: &EncodingConfig,
) -> FfmpegCommand {
    FfmpegCommand::new(input, output)
        .duration(seconds)
        .encoding(encoding)
        .faststart()
}

/// Truncate a video to exactly `seconds`, re-encoding both streams.
pub async fn cut_to_duration(
    runner: &FfmpegRunner,
    input: &Path,
    output: &Path,
    seconds: f64,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    debug!(
        input = %input.display(),
        output = %output.display(),
        seconds,
        "Cutting to duration"
    );
    runner.run(&cut_command(input, output, seconds, encoding)).await
}

/// Build the command that lays `audio` under the video of `video`.
pub fn mux_command(
    video: &Path,
    audio: &Path,
    output: &Path,
    encoding: &EncodingConfig,
) -> FfmpegCommand {
    FfmpegCommand::new(video, output)
        .add_input(audio)
        .map("0:v:0")
        .map("1:a:0")
        .video_codec("copy")
        .output_args(encoding.audio_args())
        .shortest()
        .faststart()
}

/// Replace the audio of `video` with `audio`, keeping the video stream as is.
pub async fn mux_voice_over(
    runner: &FfmpegRunner,
    video: &Path,
    audio: &Path,
    output: &Path,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    debug!(
        video = %video.display(),
        audio = %audio.display(),
        output = %output.display(),
        "Muxing voice over video"
    );
    runner.run(&mux_command(video, audio, output, encoding)).await
}

/// Build the command that re-encodes one input to the standard codec pair.
pub fn transcode_command(input: &Path, output: &Path, encoding: &EncodingConfig) -> FfmpegCommand {
    FfmpegCommand::new(input, output)
        .encoding(encoding)
        .faststart()
}

/// Re-encode a video to the standard codec pair.
pub async fn transcode(
    runner: &FfmpegRunner,
    input: &Path,
    output: &Path,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    runner.run(&transcode_command(input, output, encoding)).await
}

/// Build the command that re-encodes one input ahead of filter concat.
fn normalize_command(input: &Path, output: &Path, encoding: &EncodingConfig) -> FfmpegCommand {
    transcode_command(input, output, encoding).output_args([
        "-ar".to_string(),
        CONCAT_SAMPLE_RATE.to_string(),
        "-ac".to_string(),
        CONCAT_CHANNELS.to_string(),
    ])
}

/// Build the filter-concat command over two normalized inputs.
pub fn concat_filter_command(
    first: &Path,
    second: &Path,
    output: &Path,
    encoding: &EncodingConfig,
) -> FfmpegCommand {
    FfmpegCommand::new(first, output)
        .add_input(second)
        .filter_complex(CONCAT_FILTER)
        .map("[v]")
        .map("[a]")
        .encoding(encoding)
        .faststart()
}

/// Append `body` after `segment`.
///
/// Both inputs are re-encoded to a common codec pair and audio layout in
/// `work_dir` first, then joined on decoded streams, so hooks and bodies
/// from different sources still concatenate cleanly.
pub async fn concat_with_body(
    runner: &FfmpegRunner,
    segment: &Path,
    body: &Path,
    work_dir: &Path,
    output: &Path,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    let segment_norm = work_dir.join("segment_norm.mp4");
    let body_norm = work_dir.join("body_norm.mp4");

    runner
        .run(&normalize_command(segment, &segment_norm, encoding))
        .await?;
    runner.run(&normalize_command(body, &body_norm, encoding)).await?;

    info!(
        segment = %segment.display(),
        body = %body.display(),
        output = %output.display(),
        "Concatenating segment with body"
    );
    runner
        .run(&concat_filter_command(&segment_norm, &body_norm, output, encoding))
        .await
}

/// Quote a path for a concat demuxer manifest line.
pub fn manifest_line(path: &Path) -> String {
    let escaped = path.to_string_lossy().replace('\'', "'\\''");
    format!("file '{}'", escaped)
}

/// Write a concat demuxer manifest listing `paths` in order.
pub async fn write_concat_manifest(manifest: &Path, paths: &[&Path]) -> MediaResult<()> {
    let mut body = String::new();
    for path in paths {
        body.push_str(&manifest_line(path));
        body.push('\n');
    }
    fs::write(manifest, body).await?;
    Ok(())
}

/// Build the stream-copy concat command over a manifest.
pub fn concat_copy_command(manifest: &Path, output: &Path) -> FfmpegCommand {
    FfmpegCommand::new(manifest, output)
        .concat_demuxer()
        .codec_copy()
}

/// Finalize a body-less segment.
///
/// Tries a container-level concat with stream copy first. Any failure other
/// than cancellation falls back to a full re-encode of the segment.
pub async fn concat_single(
    runner: &FfmpegRunner,
    segment: &Path,
    work_dir: &Path,
    output: &Path,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    let segment = absolute(segment).await?;
    let manifest = work_dir.join(CONCAT_MANIFEST);
    write_concat_manifest(&manifest, &[&segment]).await?;

    match runner.run(&concat_copy_command(&manifest, output)).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_cancelled() || matches!(e, MediaError::Timeout(_)) => Err(e),
        Err(e) => {
            warn!(
                segment = %segment.display(),
                error = %e,
                "Stream-copy concat failed, re-encoding segment"
            );
            // A failed copy may leave a partial file behind
            let _ = fs::remove_file(output).await;
            transcode(runner, &segment, output, encoding).await
        }
    }
}

/// Manifest entries resolve relative to the manifest, so pin them down.
async fn absolute(path: &Path) -> MediaResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(fs::canonicalize(path).await?)
}
