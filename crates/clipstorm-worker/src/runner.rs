//! Per-job composition pipeline.
//!
//! ```text
//! Trimming -> Gating -> Cutting -> Muxing -> Concatenating -> Naming -> Done
//!               |                                                  |
//!               +-> Skipped (hook shorter than voice)   Failed <---+ (any step)
//! ```
//!
//! Intermediates use fixed names, so each job must get its own directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::fs;
use tracing::Instrument;

use clipstorm_media::{move_file, MediaError};
use clipstorm_models::{Artifact, Job, JobState};

use crate::error::{JobError, JobErrorKind};
use crate::logging::JobLogger;
use crate::metrics;
use crate::toolkit::MediaToolkit;

const HOOK_CUT: &str = "hook_cut.mp4";
const MUXED: &str = "mux.mp4";
const FINAL: &str = "final.mp4";

/// How one job ended.
#[derive(Debug, Clone)]
pub enum JobOutcome {
    Done(Artifact),
    Skipped { warning: String },
    Failed(JobError),
}

impl JobOutcome {
    pub fn state(&self) -> JobState {
        match self {
            JobOutcome::Done(_) => JobState::Done,
            JobOutcome::Skipped { .. } => JobState::Skipped,
            JobOutcome::Failed(_) => JobState::Failed,
        }
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        match self {
            JobOutcome::Done(artifact) => Some(artifact),
            _ => None,
        }
    }
}

/// Runs the composition pipeline for one job at a time.
#[derive(Clone)]
pub struct CompositionJobRunner {
    toolkit: Arc<dyn MediaToolkit>,
}

impl CompositionJobRunner {
    pub fn new(toolkit: Arc<dyn MediaToolkit>) -> Self {
        Self { toolkit }
    }

    /// Compose `job` inside `job_dir` and move the result to
    /// `output_dir/output_name`.
    ///
    /// Never returns an error: every failure becomes a [`JobOutcome`].
    pub async fn run(
        &self,
        job: &Job,
        job_dir: &Path,
        output_dir: &Path,
        output_name: &str,
    ) -> JobOutcome {
        let logger = JobLogger::new(&job.id(), "compose");
        let span = logger.create_span();
        let started = Instant::now();

        let outcome = self
            .compose(job, job_dir, output_dir, output_name, &logger)
            .instrument(span)
            .await;

        match &outcome {
            JobOutcome::Done(artifact) => {
                logger.log_completion(&format!("{} -> {}", job.label(), artifact.path.display()))
            }
            JobOutcome::Skipped { warning } => logger.log_warning(warning),
            JobOutcome::Failed(e) => logger.log_error(&format!("{}: {}", job.label(), e)),
        }
        metrics::record_job(outcome.state().as_str(), started.elapsed().as_secs_f64());

        outcome
    }

    async fn compose(
        &self,
        job: &Job,
        job_dir: &Path,
        output_dir: &Path,
        output_name: &str,
        logger: &JobLogger,
    ) -> JobOutcome {
        logger.log_start(&job.label());

        if let Err(e) = fs::create_dir_all(job_dir).await {
            return JobOutcome::Failed(JobError::new(JobErrorKind::Staging, e.to_string()));
        }

        let (hook, voice) = match (job.hook.local_path(), job.voice.local_path()) {
            (Some(hook), Some(voice)) => (hook, voice),
            _ => {
                return JobOutcome::Failed(JobError::new(
                    JobErrorKind::Staging,
                    "assets were not staged to disk",
                ))
            }
        };

        logger.log_state(JobState::Trimming);
        let trimmed = match self.toolkit.trim_silence(voice, job_dir).await {
            Ok(t) => t,
            Err(e) => return failed(JobState::Trimming, &e),
        };
        logger.log_progress(&format!(
            "voice trimmed to {:.2}s",
            trimmed.trimmed_duration_secs
        ));

        logger.log_state(JobState::Gating);
        let hook_secs = match self.toolkit.probe_duration(hook).await {
            Ok(d) => d,
            Err(e) => return failed(JobState::Gating, &e),
        };
        let voice_secs = trimmed.trimmed_duration_secs;
        if hook_secs <= 0.0 {
            return JobOutcome::Failed(JobError::new(
                JobErrorKind::Probe,
                format!(
                    "duration of {} is unknown ({:.2}s), trimmed voice is {:.2}s",
                    job.hook.name(),
                    hook_secs,
                    voice_secs
                ),
            ));
        }
        if hook_secs < voice_secs {
            return JobOutcome::Skipped {
                warning: format!(
                    "Skipped {}: hook is {:.2}s but trimmed voice is {:.2}s",
                    job.label(),
                    hook_secs,
                    voice_secs
                ),
            };
        }

        logger.log_state(JobState::Cutting);
        let hook_cut = job_dir.join(HOOK_CUT);
        if let Err(e) = self
            .toolkit
            .cut_to_duration(hook, &hook_cut, voice_secs)
            .await
        {
            return failed(JobState::Cutting, &e);
        }

        logger.log_state(JobState::Muxing);
        let muxed = job_dir.join(MUXED);
        if let Err(e) = self
            .toolkit
            .mux_voice_over(&hook_cut, &trimmed.trimmed_audio_path, &muxed)
            .await
        {
            return failed(JobState::Muxing, &e);
        }

        logger.log_state(JobState::Concatenating);
        let final_path = job_dir.join(FINAL);
        let concat = match job.body.as_ref() {
            Some(body) => match body.local_path() {
                Some(body) => {
                    self.toolkit
                        .concat_with_body(&muxed, body, job_dir, &final_path)
                        .await
                }
                None => {
                    return JobOutcome::Failed(JobError::new(
                        JobErrorKind::Staging,
                        "body was not staged to disk",
                    ))
                }
            },
            None => {
                self.toolkit
                    .concat_single(&muxed, job_dir, &final_path)
                    .await
            }
        };
        if let Err(e) = concat {
            return failed(JobState::Concatenating, &e);
        }

        logger.log_state(JobState::Naming);
        let destination: PathBuf = output_dir.join(output_name);
        if let Err(e) = move_file(&final_path, &destination).await {
            return JobOutcome::Failed(JobError::new(
                JobErrorKind::ArtifactMissing,
                format!("could not move {}: {}", final_path.display(), e),
            ));
        }
        if !destination.is_file() {
            return JobOutcome::Failed(JobError::artifact_missing(&destination));
        }

        JobOutcome::Done(Artifact {
            path: destination,
            name: output_name.to_string(),
            job: job.to_ref(),
        })
    }
}

fn failed(state: JobState, err: &MediaError) -> JobOutcome {
    JobOutcome::Failed(JobError::from_media(state, err))
}
