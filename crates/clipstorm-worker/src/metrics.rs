//! Job metrics.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! embedding process installs a recorder.

use metrics::{counter, gauge, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const JOBS_TOTAL: &str = "clipstorm_jobs_total";
    pub const JOB_DURATION_SECONDS: &str = "clipstorm_job_duration_seconds";
    pub const BATCHES_TOTAL: &str = "clipstorm_batches_total";
    pub const JOBS_IN_FLIGHT: &str = "clipstorm_jobs_in_flight";
}

/// Record a finished job and how long it took.
pub fn record_job(outcome: &str, duration_secs: f64) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::JOBS_TOTAL, &labels).increment(1);
    histogram!(names::JOB_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a finished batch.
pub fn record_batch(produced_artifacts: bool) {
    let labels = [(
        "result",
        if produced_artifacts { "artifacts" } else { "empty" }.to_string(),
    )];
    counter!(names::BATCHES_TOTAL, &labels).increment(1);
}

/// Update the number of jobs currently composing.
pub fn set_jobs_in_flight(count: usize) {
    gauge!(names::JOBS_IN_FLIGHT).set(count as f64);
}
