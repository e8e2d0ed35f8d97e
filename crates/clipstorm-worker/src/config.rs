//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

use clipstorm_media::SilenceTrimConfig;
use clipstorm_models::EncodingConfig;

/// Default parent directory for batch output directories.
pub const DEFAULT_OUTPUT_ROOT: &str = "rendered_videos";

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Parent of every `<prefix>_<timestamp>` output directory
    pub output_root: PathBuf,
    /// Parent of the scratch workspace (system temp dir when unset)
    pub work_dir: Option<PathBuf>,
    /// Maximum jobs composed at the same time
    pub max_parallel_jobs: usize,
    /// Kill any single FFmpeg run after this long
    pub ffmpeg_timeout: Option<Duration>,
    /// Reject uploads whose extension does not match their kind
    pub enforce_extensions: bool,
    /// Encoder settings for every re-encode step
    pub encoding: EncodingConfig,
    /// Silence detection parameters
    pub silence: SilenceTrimConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            work_dir: None,
            max_parallel_jobs: num_cpus::get().max(1),
            ffmpeg_timeout: None,
            enforce_extensions: true,
            encoding: EncodingConfig::default(),
            silence: SilenceTrimConfig::default(),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            output_root: std::env::var("CLIPSTORM_OUTPUT_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_root),
            work_dir: std::env::var("CLIPSTORM_WORK_DIR").ok().map(PathBuf::from),
            max_parallel_jobs: std::env::var("CLIPSTORM_MAX_PARALLEL_JOBS")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_parallel_jobs),
            ffmpeg_timeout: std::env::var("CLIPSTORM_FFMPEG_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            enforce_extensions: std::env::var("CLIPSTORM_ENFORCE_EXTENSIONS")
                .ok()
                .and_then(|s| parse_bool(&s))
                .unwrap_or(defaults.enforce_extensions),
            encoding: defaults.encoding,
            silence: defaults.silence,
        }
    }

    /// Set the output root.
    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = root.into();
        self
    }

    /// Set the scratch workspace parent.
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    /// Set the job concurrency limit (at least 1).
    pub fn with_max_parallel_jobs(mut self, n: usize) -> Self {
        self.max_parallel_jobs = n.max(1);
        self
    }

    /// Turn upload extension checks on or off.
    pub fn with_enforce_extensions(mut self, enforce: bool) -> Self {
        self.enforce_extensions = enforce;
        self
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
