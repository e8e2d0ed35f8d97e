//! FFprobe duration lookup.

use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::debug;

use crate::command::FfmpegRunner;
use crate::error::{MediaError, MediaResult};

/// Get the container-reported duration of a media file in seconds.
///
/// Output that cannot be parsed maps to `0.0` ("unknown"), so one corrupt
/// file degrades a single comparison instead of failing the caller. Only a
/// missing or unspawnable `ffprobe` is an error.
pub async fn get_duration(path: impl AsRef<Path>) -> MediaResult<f64> {
    get_duration_with("ffprobe", path).await
}

/// Same as [`get_duration`] with an explicit probe executable.
pub async fn get_duration_with(binary: &str, path: impl AsRef<Path>) -> MediaResult<f64> {
    get_duration_guarded(&FfmpegRunner::new(), binary, path).await
}

/// Probe under the cancellation signal and timeout of `runner`.
pub async fn get_duration_guarded(
    runner: &FfmpegRunner,
    binary: &str,
    path: impl AsRef<Path>,
) -> MediaResult<f64> {
    let path = path.as_ref();

    which::which(binary).map_err(|_| MediaError::FfprobeNotFound)?;

    let mut child = Command::new(binary)
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=nokey=1:noprint_wrappers=1",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()?;

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| MediaError::internal("ffprobe stdout was not captured"))?;
    let reader = tokio::spawn(async move {
        let mut buf = Vec::new();
        let _ = stdout.read_to_end(&mut buf).await;
        buf
    });

    let status = match runner.wait_for_completion(&mut child).await {
        Ok(status) => status,
        Err(e) => {
            reader.abort();
            return Err(e);
        }
    };
    let stdout = reader.await.unwrap_or_default();

    let duration = parse_duration_output(&stdout);
    debug!(
        path = %path.display(),
        duration,
        success = status.success(),
        "Probed duration"
    );

    Ok(duration)
}

/// Parse ffprobe's bare `format=duration` output.
fn parse_duration_output(stdout: &[u8]) -> f64 {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .unwrap_or(0.0)
}
