//! Uploaded media assets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Role an asset plays in a composed video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Lead-in video clip, shown first
    Hook,
    /// Voiceover audio laid over the hook
    Voice,
    /// Optional video appended after the hook segment
    Body,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Hook => "hook",
            AssetKind::Voice => "voice",
            AssetKind::Body => "body",
        }
    }

    /// File extensions accepted at upload time for this kind.
    pub fn accepted_extensions(&self) -> &'static [&'static str] {
        match self {
            AssetKind::Hook | AssetKind::Body => &["mp4", "mov"],
            AssetKind::Voice => &["wav", "mp3"],
        }
    }

    /// Whether `name` carries an extension accepted for this kind.
    pub fn accepts(&self, name: &str) -> bool {
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                self.accepted_extensions()
                    .iter()
                    .any(|accepted| accepted.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where an asset's bytes live.
#[derive(Clone)]
pub enum AssetPayload {
    /// Uploaded bytes held in memory.
    Bytes(Arc<[u8]>),
    /// A file already on local disk.
    File(PathBuf),
}

impl fmt::Debug for AssetPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetPayload::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            AssetPayload::File(path) => write!(f, "File({})", path.display()),
        }
    }
}

/// An uploaded media file.
///
/// The name is used verbatim when composing output filenames. Assets are
/// never mutated; staging an asset into a workspace produces a new `Asset`
/// with the same name and kind and a file payload.
#[derive(Debug, Clone)]
pub struct Asset {
    name: String,
    kind: AssetKind,
    payload: AssetPayload,
}

impl Asset {
    /// Create an asset from in-memory bytes.
    pub fn from_bytes(name: impl Into<String>, kind: AssetKind, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            kind,
            payload: AssetPayload::Bytes(bytes.into()),
        }
    }

    /// Create an asset backed by a file on disk, named after its file name.
    pub fn from_path(path: impl Into<PathBuf>, kind: AssetKind) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            name,
            kind,
            payload: AssetPayload::File(path),
        }
    }

    /// Create a file-backed asset with an explicit name.
    pub fn with_file(name: impl Into<String>, kind: AssetKind, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            kind,
            payload: AssetPayload::File(path.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    pub fn payload(&self) -> &AssetPayload {
        &self.payload
    }

    /// Local path of a file-backed asset.
    pub fn local_path(&self) -> Option<&Path> {
        match &self.payload {
            AssetPayload::File(path) => Some(path),
            AssetPayload::Bytes(_) => None,
        }
    }
}
