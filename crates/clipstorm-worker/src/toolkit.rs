//! Media operations used by the job runner.
//!
//! The runner only talks to [`MediaToolkit`], so orchestration can be
//! exercised without FFmpeg installed.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use clipstorm_media::{
    compose, get_duration_guarded, silence, FfmpegRunner, MediaResult, SilenceTrimConfig,
};
use clipstorm_models::{EncodingConfig, TrimResult};

use crate::config::WorkerConfig;

/// The external operations one job needs.
#[async_trait]
pub trait MediaToolkit: Send + Sync {
    /// Trim silence from `voice`, writing into `work_dir`.
    async fn trim_silence(&self, voice: &Path, work_dir: &Path) -> MediaResult<TrimResult>;

    /// Container duration in seconds; `0.0` when unknown.
    async fn probe_duration(&self, path: &Path) -> MediaResult<f64>;

    /// Re-encode `input` truncated to `seconds`.
    async fn cut_to_duration(&self, input: &Path, output: &Path, seconds: f64) -> MediaResult<()>;

    /// Video from `video`, audio from `audio`.
    async fn mux_voice_over(&self, video: &Path, audio: &Path, output: &Path) -> MediaResult<()>;

    /// `segment` followed by `body`.
    async fn concat_with_body(
        &self,
        segment: &Path,
        body: &Path,
        work_dir: &Path,
        output: &Path,
    ) -> MediaResult<()>;

    /// Finalize a body-less segment.
    async fn concat_single(&self, segment: &Path, work_dir: &Path, output: &Path) -> MediaResult<()>;
}

/// [`MediaToolkit`] backed by the `ffmpeg` and `ffprobe` executables.
#[derive(Debug, Clone)]
pub struct FfmpegToolkit {
    runner: FfmpegRunner,
    ffprobe: String,
    encoding: EncodingConfig,
    silence: SilenceTrimConfig,
}

impl Default for FfmpegToolkit {
    fn default() -> Self {
        Self {
            runner: FfmpegRunner::new(),
            ffprobe: "ffprobe".to_string(),
            encoding: EncodingConfig::default(),
            silence: SilenceTrimConfig::default(),
        }
    }
}

impl FfmpegToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from worker configuration.
    pub fn from_config(config: &WorkerConfig) -> Self {
        let mut runner = FfmpegRunner::new();
        if let Some(timeout) = config.ffmpeg_timeout {
            runner = runner.with_timeout(timeout.as_secs().max(1));
        }
        Self {
            runner,
            ffprobe: "ffprobe".to_string(),
            encoding: config.encoding.clone(),
            silence: config.silence.clone(),
        }
    }

    /// Kill running FFmpeg children once `cancel_rx` turns true.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.runner = self.runner.with_cancel(cancel_rx);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.runner = self.runner.with_timeout(timeout.as_secs().max(1));
        self
    }

    pub fn with_encoding(mut self, encoding: EncodingConfig) -> Self {
        self.encoding = encoding;
        self
    }
}

#[async_trait]
impl MediaToolkit for FfmpegToolkit {
    async fn trim_silence(&self, voice: &Path, work_dir: &Path) -> MediaResult<TrimResult> {
        silence::trim_silence(&self.runner, voice, work_dir, &self.silence).await
    }

    async fn probe_duration(&self, path: &Path) -> MediaResult<f64> {
        get_duration_guarded(&self.runner, &self.ffprobe, path).await
    }

    async fn cut_to_duration(&self, input: &Path, output: &Path, seconds: f64) -> MediaResult<()> {
        compose::cut_to_duration(&self.runner, input, output, seconds, &self.encoding).await
    }

    async fn mux_voice_over(&self, video: &Path, audio: &Path, output: &Path) -> MediaResult<()> {
        compose::mux_voice_over(&self.runner, video, audio, output, &self.encoding).await
    }

    async fn concat_with_body(
        &self,
        segment: &Path,
        body: &Path,
        work_dir: &Path,
        output: &Path,
    ) -> MediaResult<()> {
        compose::concat_with_body(&self.runner, segment, body, work_dir, output, &self.encoding)
            .await
    }

    async fn concat_single(&self, segment: &Path, work_dir: &Path, output: &Path) -> MediaResult<()> {
        compose::concat_single(&self.runner, segment, work_dir, output, &self.encoding).await
    }
}
