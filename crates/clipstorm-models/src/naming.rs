//! Output naming.
//!
//! Output filenames are built from structured parts (prefix plus the asset
//! names of a job) instead of editing an already-joined string. Each asset
//! name contributes its stem: `"clip.mp4"` contributes `"clip"`. Underscores
//! inside asset names are kept as-is.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::encoding::OUTPUT_EXTENSION;
use crate::Job;

/// Separator between joined name parts.
pub const NAME_SEPARATOR: char = '_';

/// Timestamp format of batch directories, sortable as plain text.
pub const BATCH_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Longest filename most filesystems accept, in bytes.
const MAX_FILENAME_BYTES: usize = 255;

/// Reasons an output name cannot be composed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    #[error("name part is empty after removing its extension: {0:?}")]
    EmptyPart(String),

    #[error("name part contains a path separator or control character: {0:?}")]
    InvalidCharacter(String),

    #[error("composed name is {0} bytes, longer than the filesystem allows")]
    TooLong(usize),
}

/// Strip the final extension token from an asset name.
///
/// Names without an extension, and dot-files such as `.env`, are returned
/// unchanged.
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(pos) => &name[..pos],
    }
}

fn check_part(part: &str) -> Result<(), NamingError> {
    if part.is_empty() {
        return Err(NamingError::EmptyPart(part.to_string()));
    }
    if part
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_control())
    {
        return Err(NamingError::InvalidCharacter(part.to_string()));
    }
    Ok(())
}

/// Join a prefix and asset names into one output filename.
///
/// `compose_output_name("p", &["h.mp4", "v.wav"])` yields `p_h_v.mp4`.
pub fn compose_output_name(prefix: &str, asset_names: &[&str]) -> Result<String, NamingError> {
    check_part(prefix)?;

    let mut stem = prefix.to_string();
    for name in asset_names {
        let part = strip_extension(name.trim());
        if part.is_empty() {
            return Err(NamingError::EmptyPart((*name).to_string()));
        }
        check_part(part)?;
        stem.push(NAME_SEPARATOR);
        stem.push_str(part);
    }

    let file_name = format!("{}.{}", stem, OUTPUT_EXTENSION);
    if file_name.len() > MAX_FILENAME_BYTES {
        return Err(NamingError::TooLong(file_name.len()));
    }
    Ok(file_name)
}

/// Positional name used when a job's name cannot be composed.
pub fn positional_name(index: usize) -> String {
    format!("output_{}.{}", index, OUTPUT_EXTENSION)
}

/// Compose the output name of a job.
pub fn job_output_name(prefix: &str, job: &Job) -> Result<String, NamingError> {
    let mut parts = vec![job.hook.name(), job.voice.name()];
    if let Some(body) = &job.body {
        parts.push(body.name());
    }
    compose_output_name(prefix, &parts)
}

/// Name of a batch's output directory.
pub fn batch_dir_name(prefix: &str, timestamp: NaiveDateTime) -> String {
    format!("{}_{}", prefix, timestamp.format(BATCH_TIMESTAMP_FORMAT))
}

/// Assigns unique output names in job order.
///
/// A name already handed out gets a numeric suffix (`p_h_v_2.mp4`), so two
/// hooks named `intro.mp4` and `intro.mov` never overwrite each other.
#[derive(Debug, Default)]
pub struct NamePlanner {
    taken: HashSet<String>,
}

impl NamePlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a unique name for `job`, falling back to a positional name.
    pub fn plan(&mut self, prefix: &str, job: &Job) -> PlannedName {
        let (candidate, fallback_reason) = match job_output_name(prefix, job) {
            Ok(name) => (name, None),
            Err(e) => (positional_name(job.index), Some(e)),
        };
        let file_name = self.reserve(candidate);
        PlannedName {
            file_name,
            fallback_reason,
        }
    }

    fn reserve(&mut self, candidate: String) -> String {
        if self.taken.insert(candidate.clone()) {
            return candidate;
        }
        let stem = strip_extension(&candidate).to_string();
        let mut n = 2usize;
        loop {
            let next = format!("{}{}{}.{}", stem, NAME_SEPARATOR, n, OUTPUT_EXTENSION);
            if self.taken.insert(next.clone()) {
                return next;
            }
            n += 1;
        }
    }
}

/// Output name reserved for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedName {
    pub file_name: String,
    /// Why the composed name was rejected, when a positional name is used.
    pub fallback_reason: Option<NamingError>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Asset, AssetKind};
    use chrono::NaiveDate;

    fn job(index: usize, hook: &str, voice: &str, body: Option<&str>) -> Job {
        Job::new(
            index,
            Asset::from_path(hook, AssetKind::Hook),
            Asset::from_path(voice, AssetKind::Voice),
            body.map(|b| Asset::from_path(b, AssetKind::Body)),
        )
    }

    #[test]
    fn test_extensions_never_embedded() {
        assert_eq!(compose_output_name("p", &["h.mp4", "v.wav"]).unwrap(), "p_h_v.mp4");
        assert_eq!(
            compose_output_name("promo", &["hook.mov", "vo.mp3", "body.mp4"]).unwrap(),
            "promo_hook_vo_body.mp4"
        );
    }

    #[test]
    fn test_strip_extension_only_strips_last_token() {
        assert_eq!(strip_extension("clip.mp4"), "clip");
        assert_eq!(strip_extension("take.v2.wav"), "take.v2");
        assert_eq!(strip_extension("noext"), "noext");
        assert_eq!(strip_extension(".hidden"), ".hidden");
    }

    #[test]
    fn test_underscores_in_names_survive() {
        assert_eq!(
            compose_output_name("p", &["my_hook.mp4", "voice_a.wav"]).unwrap(),
            "p_my_hook_voice_a.mp4"
        );
    }

    #[test]
    fn test_invalid_parts_rejected() {
        assert_eq!(
            compose_output_name("p", &["a.mp4", "  "]),
            Err(NamingError::EmptyPart("  ".to_string()))
        );
        assert!(matches!(
            compose_output_name("p", &["../h.mp4"]),
            Err(NamingError::InvalidCharacter(_))
        ));
        assert!(matches!(compose_output_name("", &["h.mp4"]), Err(NamingError::EmptyPart(_))));
    }

    #[test]
    fn test_too_long_rejected() {
        let long = format!("{}.mp4", "x".repeat(300));
        assert!(matches!(
            compose_output_name("p", &[&long]),
            Err(NamingError::TooLong(_))
        ));
    }

    #[test]
    fn test_batch_dir_name_is_sortable() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 1)
            .unwrap();
        assert_eq!(batch_dir_name("promo", ts), "promo_20240309_070501");
    }

    #[test]
    fn test_planner_falls_back_to_positional_name() {
        let mut planner = NamePlanner::new();
        let bad = Job::new(
            3,
            Asset::from_bytes("bad/name.mp4", AssetKind::Hook, b"".to_vec()),
            Asset::from_path("v.wav", AssetKind::Voice),
            None,
        );
        let planned = planner.plan("p", &bad);
        assert_eq!(planned.file_name, "output_3.mp4");
        assert!(planned.fallback_reason.is_some());
    }

    #[test]
    fn test_planner_deduplicates_in_order() {
        let mut planner = NamePlanner::new();
        let first = planner.plan("p", &job(0, "intro.mp4", "v.wav", None));
        let second = planner.plan("p", &job(1, "intro.mov", "v.wav", None));
        let third = planner.plan("p", &job(2, "intro.MP4", "v.wav", None));
        assert_eq!(first.file_name, "p_intro_v.mp4");
        assert_eq!(second.file_name, "p_intro_v_2.mp4");
        assert_eq!(third.file_name, "p_intro_v_3.mp4");
    }
}
