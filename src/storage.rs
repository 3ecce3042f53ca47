//! Storage-root resolution for downloaded artifacts
//!
//! The root is resolved exactly once at startup and injected by reference into
//! everything that needs it, with no hidden process-global cache. Resolution walks
//! a short list of candidates near the executable and the working directory,
//! accepting the first whose parent looks like a project root; the fallback is
//! `<cwd>/downloads`.

use crate::Result;
use std::path::{Path, PathBuf};

/// File whose presence marks a directory as the project root
const PROJECT_MARKER: &str = "Cargo.toml";

/// The directory that holds downloaded artifacts
///
/// One flat directory; file names follow `<base>_<hash>.<ext>`. Existence of
/// an artifact is determined purely by directory listing; there is no
/// manifest or index file.
#[derive(Debug, Clone)]
pub struct StorageRoot {
    path: PathBuf,
}

impl StorageRoot {
    /// Use an explicit directory as the storage root
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Discover the storage root
    ///
    /// An explicitly configured directory always wins. Otherwise candidates
    /// named `downloads` are probed relative to the executable's directory and
    /// the working directory, accepting the first whose parent contains a
    /// `Cargo.toml` project marker; if none matches, `<cwd>/downloads` is used.
    pub fn discover(configured: Option<&Path>) -> Self {
        if let Some(dir) = configured {
            tracing::info!(dir = %dir.display(), "using configured download directory");
            return Self::at(dir);
        }

        let mut candidates = Vec::new();
        if let Ok(exe) = std::env::current_exe() {
            if let Some(exe_dir) = exe.parent() {
                // target/debug/<exe> and target/<triple>/debug/<exe>
                candidates.push(exe_dir.join("../../downloads"));
                candidates.push(exe_dir.join("../../../downloads"));
            }
        }
        if let Ok(cwd) = std::env::current_dir() {
            candidates.push(cwd.join("downloads"));
        }

        if let Some(found) = first_with_project_marker(&candidates) {
            tracing::info!(dir = %found.display(), "discovered download directory");
            return Self::at(found);
        }

        let fallback = std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join("downloads");
        tracing::warn!(
            dir = %fallback.display(),
            "no project root found, using fallback download directory"
        );
        Self::at(fallback)
    }

    /// The resolved directory path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the directory (and parents) if absent
    ///
    /// Must run once before the first artifact is written; idempotent after.
    pub fn ensure_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.path)?;
        tracing::debug!(dir = %self.path.display(), "download directory ready");
        Ok(())
    }
}

/// First candidate whose parent directory carries the project marker
///
/// Candidates that fail to normalize (dangling symlinks, permission errors)
/// are skipped, not propagated.
fn first_with_project_marker(candidates: &[PathBuf]) -> Option<PathBuf> {
    for candidate in candidates {
        let Ok(normalized) = std::path::absolute(candidate) else {
            continue;
        };
        let Some(parent) = normalized.parent() else {
            continue;
        };
        if parent.join(PROJECT_MARKER).is_file() {
            return Some(normalized);
        }
    }
    None
}
