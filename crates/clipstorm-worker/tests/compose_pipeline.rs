//! End-to-end composition with real FFmpeg.
//!
//! Fixtures are generated with lavfi sources. Every test returns early when
//! ffmpeg or ffprobe is not installed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use hound::{SampleFormat, WavSpec, WavWriter};
use tokio::process::Command;

use clipstorm_media::{check_ffmpeg, check_ffprobe, get_duration, FfmpegCommand, FfmpegRunner};
use clipstorm_models::{Asset, AssetKind, BatchRequest, EncodingConfig};
use clipstorm_worker::{BatchOrchestrator, FfmpegToolkit, WorkerConfig};

const VOICE_RATE: u32 = 16_000;

fn toolchain_available() -> bool {
    check_ffmpeg().is_ok() && check_ffprobe().is_ok()
}

async fn make_clip(path: &Path, seconds: f64, tone_hz: u32) {
    let cmd = FfmpegCommand::new("testsrc=size=320x240:rate=25", path)
        .input_args(["-f", "lavfi"])
        .add_input(format!("sine=frequency={}:sample_rate=48000", tone_hz))
        .input_args(["-f", "lavfi"])
        .duration(seconds)
        .encoding(&EncodingConfig::default().with_preset("ultrafast"));
    FfmpegRunner::new().run(&cmd).await.unwrap();
}

/// Tone, silence, tone: 1 s each, as 16-bit mono WAV.
fn make_voice(path: &Path) {
    let spec = WavSpec {
        channels: 1,
        sample_rate: VOICE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for i in 0..(3 * VOICE_RATE) {
        let second = i / VOICE_RATE;
        let t = i as f32 / VOICE_RATE as f32;
        let sample = if second == 1 {
            0.0
        } else {
            0.5 * (2.0 * std::f32::consts::PI * 440.0 * t).sin()
        };
        writer.write_sample((sample * i16::MAX as f32) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

async fn stream_types(path: &Path) -> Vec<String> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "stream=codec_type",
            "-of",
            "csv=p=0",
        ])
        .arg(path)
        .output()
        .await
        .unwrap();
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

struct Fixtures {
    _dir: tempfile::TempDir,
    root: PathBuf,
    hook: PathBuf,
    short_hook: PathBuf,
    body: PathBuf,
    voice: PathBuf,
}

async fn fixtures() -> Fixtures {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path().to_path_buf();
    let hook = root.join("hook.mp4");
    let short_hook = root.join("short.mp4");
    let body = root.join("body.mp4");
    let voice = root.join("voice.wav");

    make_clip(&hook, 4.0, 220).await;
    make_clip(&short_hook, 1.0, 330).await;
    make_clip(&body, 2.0, 660).await;
    make_voice(&voice);

    Fixtures {
        _dir: dir,
        root,
        hook,
        short_hook,
        body,
        voice,
    }
}

fn orchestrator(root: &Path) -> BatchOrchestrator {
    let mut config = WorkerConfig::default()
        .with_output_root(root.join("rendered"))
        .with_work_dir(root.join("scratch"))
        .with_max_parallel_jobs(2);
    config.encoding = EncodingConfig::default().with_preset("ultrafast");
    BatchOrchestrator::new(config.clone(), Arc::new(FfmpegToolkit::from_config(&config)))
}

fn timestamp(s: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(12, 0, s)
        .unwrap()
}

#[tokio::test]
async fn test_body_less_artifact_matches_trimmed_voice() {
    if !toolchain_available() {
        eprintln!("ffmpeg/ffprobe not installed, skipping");
        return;
    }
    let fx = fixtures().await;

    let request = BatchRequest::new(
        "promo",
        vec![Asset::from_path(&fx.hook, AssetKind::Hook)],
        vec![Asset::from_path(&fx.voice, AssetKind::Voice)],
    );
    let result = orchestrator(&fx.root)
        .run_at(&request, timestamp(0))
        .await
        .unwrap();

    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    assert_eq!(result.artifacts.len(), 1);
    let artifact = &result.artifacts[0];
    assert_eq!(artifact.name, "promo_hook_voice.mp4");

    let duration = get_duration(&artifact.path).await.unwrap();
    assert!((duration - 2.3).abs() < 0.35, "duration {}", duration);
    assert_eq!(stream_types(&artifact.path).await, vec!["video", "audio"]);
}

#[tokio::test]
async fn test_body_is_appended() {
    if !toolchain_available() {
        eprintln!("ffmpeg/ffprobe not installed, skipping");
        return;
    }
    let fx = fixtures().await;

    let request = BatchRequest::new(
        "promo",
        vec![Asset::from_path(&fx.hook, AssetKind::Hook)],
        vec![Asset::from_path(&fx.voice, AssetKind::Voice)],
    )
    .with_bodies(vec![Asset::from_path(&fx.body, AssetKind::Body)]);
    let result = orchestrator(&fx.root)
        .run_at(&request, timestamp(1))
        .await
        .unwrap();

    assert_eq!(result.artifacts.len(), 1, "{:?}", result.warnings);
    let artifact = &result.artifacts[0];
    assert_eq!(artifact.name, "promo_hook_voice_body.mp4");

    let duration = get_duration(&artifact.path).await.unwrap();
    assert!((duration - 4.3).abs() < 0.5, "duration {}", duration);
    assert_eq!(stream_types(&artifact.path).await, vec!["video", "audio"]);
}

#[tokio::test]
async fn test_short_hook_is_skipped() {
    if !toolchain_available() {
        eprintln!("ffmpeg/ffprobe not installed, skipping");
        return;
    }
    let fx = fixtures().await;

    let request = BatchRequest::new(
        "promo",
        vec![
            Asset::from_path(&fx.short_hook, AssetKind::Hook),
            Asset::from_path(&fx.hook, AssetKind::Hook),
        ],
        vec![Asset::from_path(&fx.voice, AssetKind::Voice)],
    );
    let result = orchestrator(&fx.root)
        .run_at(&request, timestamp(2))
        .await
        .unwrap();

    assert_eq!(result.artifacts.len(), 1);
    assert_eq!(result.artifacts[0].name, "promo_hook_voice.mp4");
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("short.mp4"));
}
