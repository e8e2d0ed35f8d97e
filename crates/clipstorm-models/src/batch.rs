//! Batch requests and results.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::{Asset, AssetKind, JobRef};

/// Reasons a batch request is rejected before any work starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Enter a filename prefix")]
    MissingPrefix,

    #[error("Prefix {0:?} cannot be used in a file or directory name")]
    InvalidPrefix(String),

    #[error("Upload at least one hook and one voice")]
    MissingAssets,

    #[error("{name} was uploaded as a {expected} but is a {actual}")]
    KindMismatch {
        name: String,
        expected: AssetKind,
        actual: AssetKind,
    },

    #[error("{name} is not an accepted {kind} file (expected one of: {accepted})")]
    UnsupportedExtension {
        name: String,
        kind: AssetKind,
        accepted: String,
    },
}

/// Everything needed to start a batch.
#[derive(Debug, Clone, Validate)]
pub struct BatchRequest {
    /// Filename prefix for every artifact and the batch directory
    #[validate(length(min = 1))]
    pub prefix: String,

    pub hooks: Vec<Asset>,

    pub voices: Vec<Asset>,

    /// Optional body clips; empty means one body-less job per pair
    pub bodies: Vec<Asset>,
}

impl BatchRequest {
    pub fn new(prefix: impl Into<String>, hooks: Vec<Asset>, voices: Vec<Asset>) -> Self {
        Self {
            prefix: prefix.into(),
            hooks,
            voices,
            bodies: Vec::new(),
        }
    }

    pub fn with_bodies(mut self, bodies: Vec<Asset>) -> Self {
        self.bodies = bodies;
        self
    }

    /// Number of jobs this request expands to.
    pub fn total_jobs(&self) -> usize {
        self.hooks.len() * self.voices.len() * self.bodies.len().max(1)
    }

    /// Check preconditions.
    ///
    /// The prefix becomes a path component of the batch directory, so it
    /// must not contain separators or control characters and must not be
    /// `.` or `..`. With `enforce_extensions` set, every asset must carry an extension
    /// accepted for its kind.
    pub fn check(&self, enforce_extensions: bool) -> Result<(), ValidationError> {
        if self.validate().is_err() || self.prefix.trim().is_empty() {
            return Err(ValidationError::MissingPrefix);
        }
        let prefix = self.prefix.trim();
        if !is_path_safe(prefix) {
            return Err(ValidationError::InvalidPrefix(prefix.to_string()));
        }
        if self.hooks.is_empty() || self.voices.is_empty() {
            return Err(ValidationError::MissingAssets);
        }

        let lists = [
            (AssetKind::Hook, &self.hooks),
            (AssetKind::Voice, &self.voices),
            (AssetKind::Body, &self.bodies),
        ];
        for (expected, assets) in lists {
            for asset in assets.iter() {
                if asset.kind() != expected {
                    return Err(ValidationError::KindMismatch {
                        name: asset.name().to_string(),
                        expected,
                        actual: asset.kind(),
                    });
                }
                if enforce_extensions && !expected.accepts(asset.name()) {
                    return Err(ValidationError::UnsupportedExtension {
                        name: asset.name().to_string(),
                        kind: expected,
                        accepted: expected.accepted_extensions().join(", "),
                    });
                }
            }
        }
        Ok(())
    }
}

fn is_path_safe(component: &str) -> bool {
    component != "."
        && component != ".."
        && !component
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_control())
}

/// A finished output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    /// Absolute path in the batch output directory
    pub path: PathBuf,
    /// Output file name
    pub name: String,
    /// Job that produced it
    pub job: JobRef,
}

/// Progress event emitted after each job, whatever its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    /// Pair label of the job that just finished
    pub label: String,
}

impl BatchProgress {
    /// Completed fraction in `[0.0, 1.0]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.completed as f64 / self.total as f64).min(1.0)
    }
}

/// What a batch produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub batch_id: Uuid,
    pub prefix: String,
    /// Batch timestamp as used in the directory name
    pub timestamp: String,
    pub output_dir: PathBuf,
    pub total_jobs: usize,
    /// Artifacts in job enumeration order
    pub artifacts: Vec<Artifact>,
    /// One entry per skipped or failed job, in job order
    pub warnings: Vec<String>,
}

impl BatchResult {
    pub fn has_artifacts(&self) -> bool {
        !self.artifacts.is_empty()
    }

    /// One-line outcome for the operator.
    pub fn summary(&self) -> String {
        let head = if self.has_artifacts() {
            format!(
                "Done! {} of {} artifacts in {}",
                self.artifacts.len(),
                self.total_jobs,
                self.output_dir.display()
            )
        } else {
            format!("No artifacts produced ({} jobs)", self.total_jobs)
        };
        match self.warnings.len() {
            0 => head,
            1 => format!("{}; 1 warning", head),
            n => format!("{}; {} warnings", head, n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hook(name: &str) -> Asset {
        Asset::from_path(name, AssetKind::Hook)
    }

    fn voice(name: &str) -> Asset {
        Asset::from_path(name, AssetKind::Voice)
    }

    #[test]
    fn test_missing_prefix() {
        let req = BatchRequest::new("", vec![hook("a.mp4")], vec![voice("x.wav")]);
        assert_eq!(req.check(true), Err(ValidationError::MissingPrefix));

        let req = BatchRequest::new("   ", vec![hook("a.mp4")], vec![voice("x.wav")]);
        assert_eq!(req.check(true), Err(ValidationError::MissingPrefix));
    }

    #[test]
    fn test_missing_assets() {
        let req = BatchRequest::new("p", vec![], vec![voice("x.wav")]);
        assert_eq!(req.check(true), Err(ValidationError::MissingAssets));

        let req = BatchRequest::new("p", vec![hook("a.mp4")], vec![]);
        assert_eq!(req.check(true), Err(ValidationError::MissingAssets));
    }

    #[test]
    fn test_prefix_must_be_a_single_path_component() {
        for prefix in ["../escaped", "a/b", "a\\b", "..", ".", "tab\there"] {
            let req = BatchRequest::new(prefix, vec![hook("a.mp4")], vec![voice("x.wav")]);
            assert!(
                matches!(req.check(false), Err(ValidationError::InvalidPrefix(_))),
                "{:?}",
                prefix
            );
        }

        let req = BatchRequest::new("promo.v2", vec![hook("a.mp4")], vec![voice("x.wav")]);
        assert!(req.check(true).is_ok());
    }

    #[test]
    fn test_kind_mismatch() {
        let req = BatchRequest::new("p", vec![voice("x.wav")], vec![voice("y.wav")]);
        assert!(matches!(req.check(false), Err(ValidationError::KindMismatch { .. })));
    }

    #[test]
    fn test_extension_enforcement_is_optional() {
        let req = BatchRequest::new("p", vec![hook("a.webm")], vec![voice("x.wav")]);
        assert!(matches!(
            req.check(true),
            Err(ValidationError::UnsupportedExtension { .. })
        ));
        assert!(req.check(false).is_ok());
    }

    #[test]
    fn test_total_jobs() {
        let req = BatchRequest::new("p", vec![hook("a.mp4"), hook("b.mp4")], vec![voice("x.wav")]);
        assert_eq!(req.total_jobs(), 2);

        let req = req.with_bodies(vec![
            Asset::from_path("c.mp4", AssetKind::Body),
            Asset::from_path("d.mp4", AssetKind::Body),
            Asset::from_path("e.mp4", AssetKind::Body),
        ]);
        assert_eq!(req.total_jobs(), 6);
    }

    #[test]
    fn test_summary() {
        let mut result = BatchResult {
            batch_id: Uuid::new_v4(),
            prefix: "p".to_string(),
            timestamp: "20240101_000000".to_string(),
            output_dir: PathBuf::from("rendered_videos/p_20240101_000000"),
            total_jobs: 2,
            artifacts: vec![],
            warnings: vec!["a.mp4 + x.wav: failed".to_string()],
        };
        assert_eq!(result.summary(), "No artifacts produced (2 jobs); 1 warning");

        result.artifacts.push(Artifact {
            path: PathBuf::from("rendered_videos/p_20240101_000000/p_b_x.mp4"),
            name: "p_b_x.mp4".to_string(),
            job: JobRef {
                index: 1,
                hook: "b.mp4".to_string(),
                voice: "x.wav".to_string(),
                body: None,
            },
        });
        assert!(result.summary().starts_with("Done! 1 of 2 artifacts"));
    }

    #[test]
    fn test_progress_fraction() {
        let progress = BatchProgress {
            completed: 1,
            total: 4,
            label: "a + x".to_string(),
        };
        assert!((progress.fraction() - 0.25).abs() < f64::EPSILON);
    }
}
