//! In-memory media toolkit for runner and orchestrator tests.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use clipstorm_media::{MediaError, MediaResult};
use clipstorm_models::{Asset, AssetKind, Job, TrimResult};

use crate::toolkit::MediaToolkit;

const DEFAULT_HOOK_SECS: f64 = 10.0;
const DEFAULT_VOICE_SECS: f64 = 2.0;

/// Writes placeholder files instead of running FFmpeg. Durations are looked
/// up by file name.
#[derive(Default)]
pub struct FakeToolkit {
    hook_secs: HashMap<String, f64>,
    voice_secs: HashMap<String, f64>,
    failing_voices: HashSet<String>,
    panicking_voices: HashSet<String>,
    drop_output: bool,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl FakeToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hook_duration(mut self, name: &str, secs: f64) -> Self {
        self.hook_secs.insert(name.to_string(), secs);
        self
    }

    pub fn with_voice_duration(mut self, name: &str, secs: f64) -> Self {
        self.voice_secs.insert(name.to_string(), secs);
        self
    }

    /// Trimming this voice fails.
    pub fn failing_voice(mut self, name: &str) -> Self {
        self.failing_voices.insert(name.to_string());
        self
    }

    /// Trimming this voice panics inside the job task.
    pub fn panicking_voice(mut self, name: &str) -> Self {
        self.panicking_voices.insert(name.to_string());
        self
    }

    /// Finalizing reports success without writing the file.
    pub fn dropping_output(mut self) -> Self {
        self.drop_output = true;
        self
    }

    /// Every operation sleeps this long first.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn record(&self, call: &str) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.lock().unwrap().push(call.to_string());
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

async fn touch(path: &Path, contents: &str) -> MediaResult<()> {
    tokio::fs::write(path, contents).await?;
    Ok(())
}

#[async_trait]
impl MediaToolkit for FakeToolkit {
    async fn trim_silence(&self, voice: &Path, work_dir: &Path) -> MediaResult<TrimResult> {
        self.record("trim").await;
        let name = file_name(voice);
        if self.panicking_voices.contains(&name) {
            panic!("trimming {} blew up", name);
        }
        if self.failing_voices.contains(&name) {
            return Err(MediaError::decode_failed(format!("cannot decode {}", name)));
        }
        let out = work_dir.join(format!("{}_trimmed.wav", name));
        touch(&out, "trimmed").await?;
        let secs = self.voice_secs.get(&name).copied().unwrap_or(DEFAULT_VOICE_SECS);
        Ok(TrimResult::new(out, secs))
    }

    async fn probe_duration(&self, path: &Path) -> MediaResult<f64> {
        self.record("probe").await;
        Ok(self
            .hook_secs
            .get(&file_name(path))
            .copied()
            .unwrap_or(DEFAULT_HOOK_SECS))
    }

    async fn cut_to_duration(&self, _input: &Path, output: &Path, seconds: f64) -> MediaResult<()> {
        self.record("cut").await;
        touch(output, &format!("cut {:.2}", seconds)).await
    }

    async fn mux_voice_over(&self, _video: &Path, _audio: &Path, output: &Path) -> MediaResult<()> {
        self.record("mux").await;
        touch(output, "mux").await
    }

    async fn concat_with_body(
        &self,
        _segment: &Path,
        body: &Path,
        _work_dir: &Path,
        output: &Path,
    ) -> MediaResult<()> {
        self.record("concat_with_body").await;
        if self.drop_output {
            return Ok(());
        }
        touch(output, &format!("mux + {}", file_name(body))).await
    }

    async fn concat_single(&self, _segment: &Path, _work_dir: &Path, output: &Path) -> MediaResult<()> {
        self.record("concat_single").await;
        if self.drop_output {
            return Ok(());
        }
        touch(output, "mux").await
    }
}

/// A job whose assets are empty files under `root/staged`.
pub fn staged_job(root: &Path, index: usize, hook: &str, voice: &str, body: Option<&str>) -> Job {
    let staged = root.join("staged").join(index.to_string());
    std::fs::create_dir_all(&staged).unwrap();
    let asset = |name: &str, kind: AssetKind| {
        let path = staged.join(name);
        std::fs::write(&path, b"").unwrap();
        Asset::with_file(name, kind, path)
    };
    Job::new(
        index,
        asset(hook, AssetKind::Hook),
        asset(voice, AssetKind::Voice),
        body.map(|b| asset(b, AssetKind::Body)),
    )
}

/// In-memory upload of the given kind.
pub fn upload(name: &str, kind: AssetKind) -> Asset {
    Asset::from_bytes(name, kind, name.as_bytes().to_vec())
}
