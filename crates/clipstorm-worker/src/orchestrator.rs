//! Batch orchestration.
//!
//! Validates a request, stages uploads into a scratch workspace, runs every
//! job with bounded concurrency and collects artifacts and warnings in job
//! order. The workspace is removed when the batch returns; output
//! directories are never touched again once written.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tempfile::TempDir;
use tokio::fs;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use clipstorm_media::command::wait_for_cancel;
use clipstorm_media::copy_file;
use clipstorm_models::naming::BATCH_TIMESTAMP_FORMAT;
use clipstorm_models::{
    batch_dir_name, Asset, AssetKind, AssetPayload, BatchProgress, BatchRequest, BatchResult,
    NamePlanner,
};

use crate::config::WorkerConfig;
use crate::enumerator::enumerate_jobs;
use crate::error::{WorkerError, WorkerResult};
use crate::metrics;
use crate::runner::{CompositionJobRunner, JobOutcome};
use crate::toolkit::MediaToolkit;

/// Receives a progress event after every finished job.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, progress: &BatchProgress);
}

/// Discards progress.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_progress(&self, _progress: &BatchProgress) {}
}

/// Logs progress as structured lines.
#[derive(Debug, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn on_progress(&self, progress: &BatchProgress) {
        info!(
            completed = progress.completed,
            total = progress.total,
            label = %progress.label,
            "Processed {} / {}: {}",
            progress.completed,
            progress.total,
            progress.label
        );
    }
}

/// Runs batches.
pub struct BatchOrchestrator {
    config: WorkerConfig,
    toolkit: Arc<dyn MediaToolkit>,
    progress: Arc<dyn ProgressSink>,
    cancel_rx: Option<watch::Receiver<bool>>,
}

impl BatchOrchestrator {
    pub fn new(config: WorkerConfig, toolkit: Arc<dyn MediaToolkit>) -> Self {
        Self {
            config,
            toolkit,
            progress: Arc::new(NoopProgress),
            cancel_rx: None,
        }
    }

    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    /// Stop starting new jobs once `cancel_rx` turns true.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Run a batch stamped with the current local time.
    pub async fn run(&self, request: &BatchRequest) -> WorkerResult<BatchResult> {
        self.run_at(request, Local::now().naive_local()).await
    }

    /// Run a batch stamped with `timestamp`.
    pub async fn run_at(
        &self,
        request: &BatchRequest,
        timestamp: NaiveDateTime,
    ) -> WorkerResult<BatchResult> {
        request.check(self.config.enforce_extensions)?;

        let prefix = request.prefix.trim().to_string();
        let total = request.total_jobs();
        let batch_id = Uuid::new_v4();
        info!(
            batch_id = %batch_id,
            prefix = %prefix,
            total_jobs = total,
            max_parallel_jobs = self.config.max_parallel_jobs,
            "Starting batch"
        );

        let workspace = self.create_workspace()?;
        let hooks = stage_assets(&request.hooks, workspace.path()).await?;
        let voices = stage_assets(&request.voices, workspace.path()).await?;
        let bodies = stage_assets(&request.bodies, workspace.path()).await?;

        let output_dir = self.create_output_dir(&prefix, timestamp).await?;

        let semaphore = Arc::new(Semaphore::new(self.config.max_parallel_jobs.max(1)));
        let completed = Arc::new(AtomicUsize::new(0));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let runner = CompositionJobRunner::new(Arc::clone(&self.toolkit));
        let mut planner = NamePlanner::new();
        let mut tasks = JoinSet::new();
        let mut spawned = Vec::with_capacity(total);
        let mut not_started = 0usize;

        for job in enumerate_jobs(&hooks, &voices, &bodies) {
            let permit = tokio::select! {
                biased;
                _ = wait_for_cancel(self.cancel_rx.clone()) => None,
                permit = Arc::clone(&semaphore).acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                not_started = total - job.index;
                break;
            };

            let planned = planner.plan(&prefix, &job);
            if let Some(reason) = &planned.fallback_reason {
                warn!(
                    job_id = %job.id(),
                    reason = %reason,
                    name = %planned.file_name,
                    "Output name rejected, using positional name"
                );
            }

            let job_dir = workspace.path().join("jobs").join(job.index.to_string());
            let output_dir = output_dir.clone();
            let runner = runner.clone();
            let progress = Arc::clone(&self.progress);
            let completed = Arc::clone(&completed);
            let in_flight = Arc::clone(&in_flight);

            spawned.push((job.index, job.label()));
            tasks.spawn(async move {
                let _permit = permit;
                metrics::set_jobs_in_flight(in_flight.fetch_add(1, Ordering::SeqCst) + 1);

                let outcome = runner
                    .run(&job, &job_dir, &output_dir, &planned.file_name)
                    .await;

                metrics::set_jobs_in_flight(in_flight.fetch_sub(1, Ordering::SeqCst) - 1);
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                let label = job.label();
                progress.on_progress(&BatchProgress {
                    completed: done,
                    total,
                    label: label.clone(),
                });
                (job.index, label, outcome)
            });
        }

        let mut results = Vec::with_capacity(total);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, label, outcome)) => results.push((index, label, Some(outcome))),
                Err(e) => warn!(error = %e, "Job task did not complete"),
            }
        }
        // A panicked or aborted task still owes the batch a warning.
        for (index, label) in spawned {
            if !results.iter().any(|(i, _, _)| *i == index) {
                metrics::record_job("failed", 0.0);
                results.push((index, label, None));
            }
        }
        results.sort_by_key(|(index, _, _)| *index);

        let mut artifacts = Vec::new();
        let mut warnings = Vec::new();
        for (_, label, outcome) in results {
            match outcome {
                Some(JobOutcome::Done(artifact)) => artifacts.push(artifact),
                Some(JobOutcome::Skipped { warning }) => warnings.push(warning),
                Some(JobOutcome::Failed(e)) => warnings.push(format!("Failed {}: {}", label, e)),
                None => warnings.push(format!("Failed {}: job task did not complete", label)),
            }
        }
        if not_started > 0 {
            warnings.push(format!(
                "Batch cancelled: {} of {} jobs not started",
                not_started, total
            ));
        }

        let result = BatchResult {
            batch_id,
            prefix,
            timestamp: timestamp.format(BATCH_TIMESTAMP_FORMAT).to_string(),
            output_dir,
            total_jobs: total,
            artifacts,
            warnings,
        };
        metrics::record_batch(result.has_artifacts());
        info!(batch_id = %batch_id, "{}", result.summary());

        drop(workspace);
        Ok(result)
    }

    fn create_workspace(&self) -> WorkerResult<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("clipstorm-");
        let dir = match &self.config.work_dir {
            Some(parent) => {
                std::fs::create_dir_all(parent)
                    .map_err(|e| WorkerError::workspace(format!("{}: {}", parent.display(), e)))?;
                builder.tempdir_in(parent)
            }
            None => builder.tempdir(),
        };
        dir.map_err(|e| WorkerError::workspace(e.to_string()))
    }

    /// Create `<output_root>/<prefix>_<timestamp>`, refusing to reuse one.
    async fn create_output_dir(
        &self,
        prefix: &str,
        timestamp: NaiveDateTime,
    ) -> WorkerResult<PathBuf> {
        let root = &self.config.output_root;
        fs::create_dir_all(root).await?;

        let dir = root.join(batch_dir_name(prefix, timestamp));
        match fs::create_dir(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(WorkerError::OutputDirExists(dir));
            }
            Err(e) => return Err(e.into()),
        }
        Ok(fs::canonicalize(&dir).await?)
    }
}

/// Materialize uploads under `<workspace>/inputs/<kind>/<index>/<name>`.
async fn stage_assets(assets: &[Asset], workspace: &Path) -> WorkerResult<Vec<Asset>> {
    let mut staged = Vec::with_capacity(assets.len());
    for (index, asset) in assets.iter().enumerate() {
        staged.push(stage_asset(asset, index, workspace).await?);
    }
    Ok(staged)
}

async fn stage_asset(asset: &Asset, index: usize, workspace: &Path) -> WorkerResult<Asset> {
    let dir = workspace
        .join("inputs")
        .join(asset.kind().as_str())
        .join(index.to_string());
    fs::create_dir_all(&dir).await?;
    let path = dir.join(staged_file_name(asset.name(), asset.kind()));

    match asset.payload() {
        AssetPayload::Bytes(bytes) => fs::write(&path, bytes.as_ref()).await.map_err(|e| {
            WorkerError::workspace(format!("staging {}: {}", asset.name(), e))
        })?,
        AssetPayload::File(src) => {
            copy_file(src, &path).await.map_err(|e| {
                WorkerError::workspace(format!("staging {}: {}", asset.name(), e))
            })?;
        }
    }

    Ok(Asset::with_file(asset.name(), asset.kind(), path))
}

/// File name safe to create on disk; the asset keeps its original name.
fn staged_file_name(name: &str, kind: AssetKind) -> String {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| kind.as_str().to_string())
}
