//! Composition jobs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Asset;

/// Identifier for a job within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Derive the id of the job at `index` in enumeration order.
    pub fn from_index(index: usize) -> Self {
        Self(format!("job-{:04}", index))
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Step a job is in while it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Trimming,
    Gating,
    Cutting,
    Muxing,
    Concatenating,
    Naming,
    Done,
    Failed,
    Skipped,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Trimming => "trimming",
            JobState::Gating => "gating",
            JobState::Cutting => "cutting",
            JobState::Muxing => "muxing",
            JobState::Concatenating => "concatenating",
            JobState::Naming => "naming",
            JobState::Done => "done",
            JobState::Failed => "failed",
            JobState::Skipped => "skipped",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Done | JobState::Failed | JobState::Skipped)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One (hook, voice, optional body) combination.
///
/// A job is a pure value: it references assets but owns no files.
#[derive(Debug, Clone)]
pub struct Job {
    /// Zero-based position in enumeration order
    pub index: usize,
    pub hook: Asset,
    pub voice: Asset,
    pub body: Option<Asset>,
}

impl Job {
    pub fn new(index: usize, hook: Asset, voice: Asset, body: Option<Asset>) -> Self {
        Self {
            index,
            hook,
            voice,
            body,
        }
    }

    pub fn id(&self) -> JobId {
        JobId::from_index(self.index)
    }

    /// Human-readable pair label, e.g. `intro.mp4 + take1.wav`.
    pub fn label(&self) -> String {
        match &self.body {
            Some(body) => format!("{} + {} + {}", self.hook.name(), self.voice.name(), body.name()),
            None => format!("{} + {}", self.hook.name(), self.voice.name()),
        }
    }

    /// Serializable reference to this job's inputs.
    pub fn to_ref(&self) -> JobRef {
        JobRef {
            index: self.index,
            hook: self.hook.name().to_string(),
            voice: self.voice.name().to_string(),
            body: self.body.as_ref().map(|b| b.name().to_string()),
        }
    }
}

/// Names of the assets a job combined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRef {
    pub index: usize,
    pub hook: String,
    pub voice: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}
