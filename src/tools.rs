//! External tool discovery
//!
//! Locates the downloader binary without ever failing hard: every probe that
//! errors (unreadable directory, broken PATH entry) is skipped, and a fully
//! unsuccessful search returns `None` so the caller decides whether that is
//! fatal.

use std::path::{Path, PathBuf};

/// Resolve the on-disk path of a named external tool
///
/// Resolution order, first match wins:
/// 1. the explicitly configured path, if it points to an existing file;
/// 2. a `tools/` directory next to the running executable (bundled tools);
/// 3. the PATH environment variable (via the `which` crate, which appends
///    `.exe` on Windows);
/// 4. a short list of platform-conventional install directories.
///
/// Read-only: probing never creates or modifies anything.
pub fn resolve(tool_name: &str, configured_path: Option<&Path>, search_path: bool) -> Option<PathBuf> {
    if let Some(path) = configured_path {
        if path.is_file() {
            tracing::info!(tool = tool_name, path = %path.display(), "using configured tool path");
            return Some(path.to_path_buf());
        }
        tracing::warn!(
            tool = tool_name,
            path = %path.display(),
            "configured tool path does not exist, falling back to discovery"
        );
    }

    if let Some(path) = find_bundled(tool_name) {
        tracing::info!(tool = tool_name, path = %path.display(), "found tool in bundled directory");
        return Some(path);
    }

    if search_path {
        if let Ok(path) = which::which(tool_name) {
            tracing::info!(tool = tool_name, path = %path.display(), "found tool in PATH");
            return Some(path);
        }

        if let Some(path) = find_in_conventional_locations(tool_name) {
            tracing::info!(tool = tool_name, path = %path.display(), "found tool in conventional location");
            return Some(path);
        }
    }

    tracing::warn!(tool = tool_name, "tool not found in any location");
    None
}

/// Platform executable name (`tool.exe` on Windows, `tool` elsewhere)
fn executable_name(tool_name: &str) -> String {
    if cfg!(windows) {
        format!("{tool_name}.exe")
    } else {
        tool_name.to_string()
    }
}

/// Probe `<exe-dir>/tools/<name>` for a binary shipped alongside the program
fn find_bundled(tool_name: &str) -> Option<PathBuf> {
    let exe_dir = std::env::current_exe().ok()?.parent()?.to_path_buf();
    let candidate = exe_dir.join("tools").join(executable_name(tool_name));
    candidate.is_file().then_some(candidate)
}

#[cfg(unix)]
fn find_in_conventional_locations(tool_name: &str) -> Option<PathBuf> {
    let exe = executable_name(tool_name);
    let mut candidates = vec![
        PathBuf::from("/usr/local/bin").join(&exe),
        PathBuf::from("/opt/homebrew/bin").join(&exe),
    ];
    if let Ok(home) = std::env::var("HOME") {
        candidates.push(PathBuf::from(home).join(".local/bin").join(&exe));
    }

    candidates.into_iter().find(|p| p.is_file())
}

#[cfg(not(unix))]
fn find_in_conventional_locations(tool_name: &str) -> Option<PathBuf> {
    let exe = executable_name(tool_name);
    let mut candidates = Vec::new();
    if let Ok(local) = std::env::var("LOCALAPPDATA") {
        candidates.push(
            PathBuf::from(local)
                .join("Programs")
                .join(tool_name)
                .join(&exe),
        );
    }
    if let Ok(programs) = std::env::var("ProgramFiles") {
        candidates.push(PathBuf::from(programs).join(tool_name).join(&exe));
    }
    candidates.push(PathBuf::from("C:\\").join(tool_name).join(&exe));

    candidates.into_iter().find(|p| p.is_file())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tool_resolves_to_none() {
        // No error, no panic, just None when nothing matches
        let result = resolve("nonexistent-downloader-binary-xyz", None, true);
        assert!(result.is_none());
    }

    #[test]
    fn test_configured_path_wins_when_it_exists() {
        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("fake-tool");
        std::fs::write(&tool, "#!/bin/sh\n").unwrap();

        let result = resolve("nonexistent-downloader-binary-xyz", Some(&tool), true);
        assert_eq!(result, Some(tool));
    }

    #[test]
    fn test_missing_configured_path_falls_through() {
        let result = resolve(
            "nonexistent-downloader-binary-xyz",
            Some(Path::new("/no/such/dir/fake-tool")),
            true,
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_configured_directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the configured path must not satisfy the probe
        let result = resolve("nonexistent-downloader-binary-xyz", Some(dir.path()), false);
        assert!(result.is_none());
    }

    #[test]
    fn test_path_search_agrees_with_which() {
        // Whatever `which` says about a ubiquitous binary, resolve must agree
        let expected = which::which("sh").ok();
        let resolved = resolve("sh", None, true);
        assert_eq!(resolved, expected);
    }

    #[test]
    fn test_search_path_disabled_skips_path_lookup() {
        // "sh" exists on PATH everywhere we test, but search is off
        let resolved = resolve("sh", None, false);
        assert!(resolved.is_none());
    }
}
