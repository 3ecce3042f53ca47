//! Common test utilities for media-dl integration tests

#![allow(dead_code)]
#![cfg(unix)]

use media_dl::{Config, MediaFetcher, StorageRoot, YtDlpExecutor};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Write an executable stub tool script into `dir` and return its path.
///
/// The script body receives the real yt-dlp argument shape
/// (`-o <template> --no-playlist --format <fmt> <url>`); `$2` is the output
/// template and the last argument is the URL.
pub fn write_stub_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    let script = format!("#!/bin/sh\n{body}\n");
    std::fs::write(&path, script).expect("write stub tool");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("make stub executable");
    path
}

/// A fetcher whose downloader is the given stub script, storing artifacts in
/// a fresh temp dir. Returns the fetcher plus the dirs keeping it alive.
pub fn stub_fetcher(stub_body: &str) -> (Arc<MediaFetcher>, TempDir, TempDir) {
    let tool_dir = tempfile::tempdir().expect("tool dir");
    let storage_dir = tempfile::tempdir().expect("storage dir");
    let stub = write_stub_tool(tool_dir.path(), "stub-ytdlp", stub_body);

    let mut config = Config::default();
    config.tools.downloader = "stub-ytdlp".to_string();
    config.tools.downloader_path = Some(stub);
    config.fetch.artifact_poll_attempts = 5;
    config.fetch.artifact_poll_interval_ms = 20;
    let config = Arc::new(config);

    let executor = Arc::new(YtDlpExecutor::new(
        config.tools.clone(),
        config.fetch.clone(),
    ));
    let fetcher = MediaFetcher::with_executor(
        config,
        StorageRoot::at(storage_dir.path()),
        executor,
    );

    (Arc::new(fetcher), tool_dir, storage_dir)
}
