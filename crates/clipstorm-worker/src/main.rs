//! Batch composition CLI.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use clipstorm_media::{check_ffmpeg, check_ffprobe};
use clipstorm_models::{Asset, AssetKind, BatchRequest};
use clipstorm_worker::{BatchOrchestrator, FfmpegToolkit, LogProgress, WorkerConfig};

#[derive(Parser, Debug)]
#[command(name = "clipstorm")]
#[command(about = "Compose every hook x voiceover (x body) combination into finished videos")]
struct Params {
    /// Prefix for the batch directory and every output file.
    #[arg(short = 'p', long = "prefix")]
    prefix: String,

    /// Hook clip (mp4/mov). Repeat for more.
    #[arg(long = "hook", required = true)]
    hooks: Vec<PathBuf>,

    /// Voiceover track (wav/mp3). Repeat for more.
    #[arg(long = "voice", required = true)]
    voices: Vec<PathBuf>,

    /// Body clip appended after each hook (mp4/mov). Repeat for more.
    #[arg(long = "body")]
    bodies: Vec<PathBuf>,

    /// Parent directory for batch output directories.
    #[arg(long = "output-root", env = "CLIPSTORM_OUTPUT_ROOT")]
    output_root: Option<PathBuf>,

    /// Maximum jobs composed at once.
    #[arg(short = 'j', long = "jobs", env = "CLIPSTORM_MAX_PARALLEL_JOBS")]
    jobs: Option<usize>,

    /// Print the batch result as JSON on stdout.
    #[arg(long = "json")]
    json: bool,
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let mut env_filter = EnvFilter::from_default_env();
    if let Ok(directive) = "clipstorm=info".parse() {
        env_filter = env_filter.add_directive(directive);
    }

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    if let Err(e) = run().await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let params = Params::parse();

    let mut config = WorkerConfig::from_env();
    if let Some(root) = params.output_root {
        config = config.with_output_root(root);
    }
    if let Some(jobs) = params.jobs {
        config = config.with_max_parallel_jobs(jobs);
    }
    info!("Worker config: {:?}", config);

    check_ffmpeg().context("ffmpeg is required")?;
    check_ffprobe().context("ffprobe is required")?;

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received interrupt, finishing without starting new jobs");
            let _ = cancel_tx.send(true);
        }
    });

    let request = BatchRequest::new(
        params.prefix,
        assets(params.hooks, AssetKind::Hook),
        assets(params.voices, AssetKind::Voice),
    )
    .with_bodies(assets(params.bodies, AssetKind::Body));

    let toolkit = FfmpegToolkit::from_config(&config).with_cancel(cancel_rx.clone());
    let orchestrator = BatchOrchestrator::new(config, Arc::new(toolkit))
        .with_progress(Arc::new(LogProgress))
        .with_cancel(cancel_rx);

    let result = orchestrator.run(&request).await.context("batch failed")?;

    for warning in &result.warnings {
        warn!("{}", warning);
    }
    info!("{}", result.summary());

    if params.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    Ok(())
}

fn assets(paths: Vec<PathBuf>, kind: AssetKind) -> Vec<Asset> {
    paths
        .into_iter()
        .map(|path| Asset::from_path(path, kind))
        .collect()
}
