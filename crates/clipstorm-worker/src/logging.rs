//! Structured job logging.
//!
//! Every line carries `job_id` and `operation` fields so a batch run can be
//! filtered down to one hook/voice/body combination.

use tracing::Span;

use clipstorm_models::{JobId, JobState};

/// Emit one event at `$level` with the logger's fields.
macro_rules! job_event {
    ($level:ident, $logger:expr, $what:expr, $message:expr) => {
        tracing::$level!(
            job_id = %$logger.job_id,
            operation = $logger.operation,
            "{}: {}",
            $what,
            $message
        )
    };
}

/// Job logger with consistent structured fields.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: JobId,
    operation: &'static str,
}

impl JobLogger {
    /// Create a logger for `job_id` performing `operation`.
    pub fn new(job_id: &JobId, operation: &'static str) -> Self {
        Self {
            job_id: job_id.clone(),
            operation,
        }
    }

    pub fn log_start(&self, label: &str) {
        job_event!(info, self, "Job started", label);
    }

    /// Log entry into a pipeline state.
    pub fn log_state(&self, state: JobState) {
        job_event!(debug, self, "Job state", state);
    }

    pub fn log_progress(&self, message: &str) {
        job_event!(info, self, "Job progress", message);
    }

    pub fn log_warning(&self, message: &str) {
        job_event!(warn, self, "Job warning", message);
    }

    pub fn log_error(&self, message: &str) {
        job_event!(error, self, "Job error", message);
    }

    pub fn log_completion(&self, message: &str) {
        job_event!(info, self, "Job completed", message);
    }

    /// Span to instrument the whole job with.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "job",
            job_id = %self.job_id,
            operation = self.operation
        )
    }
}
