//! Batch composition worker.
//!
//! This crate provides:
//! - Job enumeration over hook, voice and body uploads
//! - The per-job composition pipeline (trim, gate, cut, mux, concat)
//! - Batch orchestration with bounded concurrency and cancellation
//! - Structured job logging and metrics

pub mod config;
pub mod enumerator;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod orchestrator;
pub mod runner;
pub mod toolkit;

#[cfg(test)]
pub(crate) mod testing;

pub use config::WorkerConfig;
pub use enumerator::{enumerate_jobs, JobEnumerator};
pub use error::{JobError, JobErrorKind, WorkerError, WorkerResult};
pub use logging::JobLogger;
pub use orchestrator::{BatchOrchestrator, LogProgress, NoopProgress, ProgressSink};
pub use runner::{CompositionJobRunner, JobOutcome};
pub use toolkit::{FfmpegToolkit, MediaToolkit};
