//! Worker error types.

use std::fmt;
use std::path::PathBuf;

use clipstorm_media::MediaError;
use clipstorm_models::{JobState, ValidationError};
use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

/// Batch-level errors. Only these stop a run.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Invalid batch: {0}")]
    Validation(#[from] ValidationError),

    #[error("Output directory already exists: {}", .0.display())]
    OutputDirExists(PathBuf),

    #[error("Workspace setup failed: {0}")]
    Workspace(String),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn workspace(msg: impl Into<String>) -> Self {
        Self::Workspace(msg.into())
    }

    /// Whether the error was raised before any job could run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            WorkerError::Validation(_)
                | WorkerError::OutputDirExists(_)
                | WorkerError::Workspace(_)
        )
    }
}

/// What went wrong inside one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobErrorKind {
    /// Copying an asset into the workspace failed.
    Staging,
    /// Voice decode or silence trimming failed.
    Trim,
    /// The hook duration could not be determined.
    Probe,
    /// Cutting the hook failed.
    Cut,
    /// Laying the voice under the hook failed.
    Mux,
    /// Joining with the body, or finalizing without one, failed.
    Concat,
    /// The final file did not reach the output directory.
    ArtifactMissing,
    /// The batch was cancelled while the job ran.
    Cancelled,
}

impl JobErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobErrorKind::Staging => "staging",
            JobErrorKind::Trim => "trim",
            JobErrorKind::Probe => "probe",
            JobErrorKind::Cut => "cut",
            JobErrorKind::Mux => "mux",
            JobErrorKind::Concat => "concat",
            JobErrorKind::ArtifactMissing => "artifact_missing",
            JobErrorKind::Cancelled => "cancelled",
        }
    }

    /// Kind for a media failure raised while the job was in `state`.
    pub fn for_state(state: JobState) -> Self {
        match state {
            JobState::Trimming => JobErrorKind::Trim,
            JobState::Gating => JobErrorKind::Probe,
            JobState::Cutting => JobErrorKind::Cut,
            JobState::Muxing => JobErrorKind::Mux,
            JobState::Concatenating => JobErrorKind::Concat,
            JobState::Naming | JobState::Done | JobState::Failed | JobState::Skipped => {
                JobErrorKind::ArtifactMissing
            }
        }
    }
}

impl fmt::Display for JobErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A failed job. Recorded as a warning; the batch continues.
#[derive(Debug, Clone, Error)]
#[error("{kind} failed: {message}")]
pub struct JobError {
    pub kind: JobErrorKind,
    pub message: String,
}

impl JobError {
    pub fn new(kind: JobErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Wrap a media failure raised while the job was in `state`.
    pub fn from_media(state: JobState, err: &MediaError) -> Self {
        let kind = if err.is_cancelled() {
            JobErrorKind::Cancelled
        } else {
            JobErrorKind::for_state(state)
        };
        Self::new(kind, err.to_string())
    }

    pub fn artifact_missing(path: &std::path::Path) -> Self {
        Self::new(
            JobErrorKind::ArtifactMissing,
            format!("{} was not written", path.display()),
        )
    }
}
