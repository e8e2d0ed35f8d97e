//! Shared data models for the Clipstorm batch composition pipeline.
//!
//! This crate provides:
//! - Uploaded assets and the jobs enumerated from them
//! - Batch requests, progress events and results
//! - Encoding configuration shared by every re-encode step
//! - Output naming for artifacts and batch directories

pub mod asset;
pub mod batch;
pub mod encoding;
pub mod job;
pub mod naming;
pub mod trim;

// Re-export common types
pub use asset::{Asset, AssetKind, AssetPayload};
pub use batch::{Artifact, BatchProgress, BatchRequest, BatchResult, ValidationError};
pub use encoding::EncodingConfig;
pub use job::{Job, JobId, JobRef, JobState};
pub use naming::{
    batch_dir_name, compose_output_name, positional_name, NamePlanner, NamingError, PlannedName,
};
pub use trim::TrimResult;
