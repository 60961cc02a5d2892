//! Downloaded artifacts and their lifecycle.
//!
//! Every file the engine materializes must be gone by the time the request
//! finishes, whatever happened in between. [`cleanup_files`] is the
//! idempotent sweep; [`ArtifactGuard`] ties it to scope exit so delivery
//! code cannot leak a file on an early return.

use std::fs;
use std::path::{Path, PathBuf};

/// Kind of media an artifact holds, deciding how it is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
}

/// A locally materialized media file produced by a download call.
///
/// Invariant: `size` never exceeds the configured ceiling; oversized files
/// are deleted inside the adapter before an artifact is ever constructed.
#[derive(Debug, Clone)]
pub struct DownloadArtifact {
    pub path: PathBuf,
    pub size: u64,
    pub kind: MediaKind,
}

/// Extensions of sibling files the engine may leave next to an artifact.
const SIDECAR_EXTENSIONS: [&str; 5] = ["jpg", "png", "webp", "json", "part"];

/// Deletes `path` plus any sibling thumbnail/metadata/partial files sharing
/// its base name.
///
/// Best-effort and idempotent: a missing file is not an error, and nothing
/// escapes this boundary; failures are logged and swallowed.
pub fn cleanup_files(path: &Path) {
    remove_if_exists(path);

    for ext in SIDECAR_EXTENSIONS {
        remove_if_exists(&path.with_extension(ext));
    }
}

fn remove_if_exists(path: &Path) {
    if path.exists() {
        if let Err(e) = fs::remove_file(path) {
            log::warn!("Failed to remove {}: {}", path.display(), e);
        } else {
            log::debug!("Removed {}", path.display());
        }
    }
}

/// Owns an artifact for the duration of one delivery attempt and removes
/// its files when dropped: on success, on error, and on panic unwind
/// alike.
#[derive(Debug)]
pub struct ArtifactGuard {
    artifact: DownloadArtifact,
}

impl ArtifactGuard {
    pub fn new(artifact: DownloadArtifact) -> Self {
        ArtifactGuard { artifact }
    }

    pub fn artifact(&self) -> &DownloadArtifact {
        &self.artifact
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        cleanup_files(&self.artifact.path);
    }
}
