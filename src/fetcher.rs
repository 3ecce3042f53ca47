//! Fetch orchestration
//!
//! [`MediaFetcher`] composes naming, storage, and tool execution to satisfy a
//! "fetch this URL" request: compute a deterministic target name, run the
//! external tool against an output template, discover whatever file the tool
//! actually produced, and hand back an on-disk-backed byte stream.
//!
//! Artifacts are never deleted here, on any path. Partial or stale files are
//! kept for caching and diagnosis; reclaiming space is a separate policy.

use crate::config::Config;
use crate::executor::{ToolExecutor, YtDlpExecutor};
use crate::naming::ContentKey;
use crate::storage::StorageRoot;
use crate::types::StoredArtifact;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::Path;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncRead, ReadBuf};
use tokio_util::sync::CancellationToken;

/// Extension placeholder in the output template; the tool substitutes the
/// real extension when it writes the file
const EXT_PLACEHOLDER: &str = "%(ext)s";

/// A readable byte stream backed by a downloaded artifact on disk
///
/// Dropping the stream releases the file handle; the underlying file is never
/// deleted.
#[derive(Debug)]
pub struct ArtifactStream {
    artifact: StoredArtifact,
    file: File,
}

impl ArtifactStream {
    /// Metadata of the artifact backing this stream
    pub fn artifact(&self) -> &StoredArtifact {
        &self.artifact
    }

    /// Split into metadata and the open file handle
    pub fn into_parts(self) -> (StoredArtifact, File) {
        (self.artifact, self.file)
    }
}

impl AsyncRead for ArtifactStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.get_mut().file).poll_read(cx, buf)
    }
}

/// Orchestrates one media download per call
///
/// Concurrent fetches of distinct URLs run fully independently, each owning
/// its child process. Fetches that resolve to the same content key serialize
/// on a per-key gate so they cannot race on the same output path.
pub struct MediaFetcher {
    config: Arc<Config>,
    storage: StorageRoot,
    executor: Arc<dyn ToolExecutor>,
    inflight: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl MediaFetcher {
    /// Create a fetcher from configuration
    ///
    /// Validates the config, resolves the storage root once (explicit
    /// directory or discovery), and creates it if absent.
    pub fn new(config: Arc<Config>) -> Result<Self> {
        config.validate()?;
        let storage = StorageRoot::discover(config.storage.download_dir.as_deref());
        storage.ensure_exists()?;
        let executor: Arc<dyn ToolExecutor> = Arc::new(YtDlpExecutor::new(
            config.tools.clone(),
            config.fetch.clone(),
        ));
        Ok(Self::with_executor(config, storage, executor))
    }

    /// Create a fetcher with an explicit storage root and executor
    ///
    /// The seam tests use to substitute stub executors.
    pub fn with_executor(
        config: Arc<Config>,
        storage: StorageRoot,
        executor: Arc<dyn ToolExecutor>,
    ) -> Self {
        Self {
            config,
            storage,
            executor,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// The resolved storage root
    pub fn storage(&self) -> &StorageRoot {
        &self.storage
    }

    /// Download the media behind `url` and open the result for reading
    ///
    /// Failure modes map one-to-one onto [`Error`] variants: a bad URL is
    /// [`Error::InvalidUrl`], a missing tool [`Error::ToolUnavailable`], a
    /// non-zero tool exit [`Error::FetchFailed`] carrying both captured
    /// streams, a success-exit with no file [`Error::ArtifactMissing`], and a
    /// cancelled request [`Error::Cancelled`], never wrapped as a failure.
    pub async fn fetch(&self, url: &str, cancel: CancellationToken) -> Result<ArtifactStream> {
        validate_url(url)?;

        let key = ContentKey::for_url(url);
        let prefix = key.prefix();

        // Same-key fetches would race on one output path; serialize them
        let gate = self.gate(&prefix);
        let _guard = gate.lock().await;

        self.storage.ensure_exists()?;
        let template = self
            .storage
            .path()
            .join(format!("{prefix}.{EXT_PLACEHOLDER}"));

        tracing::info!(url, prefix = %prefix, "fetch started");

        let outcome = self
            .executor
            .execute(url, &template, self.storage.path(), &cancel)
            .await?;

        if !outcome.success() {
            tracing::error!(
                url,
                exit_code = outcome.exit_code,
                stderr = %outcome.stderr,
                "download tool failed"
            );
            return Err(Error::FetchFailed {
                exit_code: outcome.exit_code,
                stdout: outcome.stdout,
                stderr: outcome.stderr,
            });
        }

        let artifact = self.discover_artifact(&prefix).await?;
        tracing::info!(
            url,
            path = %artifact.path.display(),
            size_bytes = artifact.size_bytes,
            "fetch complete"
        );

        let file = File::open(&artifact.path).await?;
        Ok(ArtifactStream { artifact, file })
    }

    /// Look up the artifact for a URL without downloading anything
    pub fn find_existing(&self, url: &str) -> Result<Option<StoredArtifact>> {
        validate_url(url)?;
        let key = ContentKey::for_url(url);
        scan_for_prefix(self.storage.path(), &key.prefix())
    }

    /// Wait for the tool's output file to become visible
    ///
    /// A bounded poll instead of a blind settling sleep: filesystem metadata
    /// can lag process exit, but a file that exists is found on the first
    /// scan with no added latency.
    async fn discover_artifact(&self, prefix: &str) -> Result<StoredArtifact> {
        let attempts = self.config.fetch.artifact_poll_attempts;
        let interval = Duration::from_millis(self.config.fetch.artifact_poll_interval_ms);

        for attempt in 0..attempts {
            if let Some(artifact) = scan_for_prefix(self.storage.path(), prefix)? {
                return Ok(artifact);
            }
            if attempt + 1 < attempts {
                tokio::time::sleep(interval).await;
            }
        }

        let listing = directory_listing(self.storage.path());
        tracing::warn!(
            prefix,
            dir = %self.storage.path().display(),
            ?listing,
            "tool reported success but no artifact matched"
        );
        Err(Error::ArtifactMissing {
            dir: self.storage.path().to_path_buf(),
            listing,
        })
    }

    /// Per-key gate, pruning entries nobody holds anymore
    fn gate(&self, prefix: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
        inflight.retain(|_, gate| Arc::strong_count(gate) > 1);
        inflight.entry(prefix.to_string()).or_default().clone()
    }
}

/// Reject anything that is not an absolute HTTP/HTTPS URL
fn validate_url(url: &str) -> Result<()> {
    if url.trim().is_empty() {
        return Err(Error::InvalidUrl("URL must not be empty".to_string()));
    }
    let parsed = url::Url::parse(url)
        .map_err(|_| Error::InvalidUrl(format!("not an absolute URL: {url}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::InvalidUrl(format!(
            "unsupported scheme '{other}': only http and https are accepted"
        ))),
    }
}

/// Scan a directory for files named `<prefix>.<anything>`
///
/// Multiple matches are possible when the tool produced companions or a
/// previous fetch left a different container; the lexicographically first
/// name is picked so the choice is at least deterministic. Unreadable
/// directory entries are skipped.
fn scan_for_prefix(dir: &Path, prefix: &str) -> Result<Option<StoredArtifact>> {
    let wanted = format!("{prefix}.");
    let mut matches: Vec<std::path::PathBuf> = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let Ok(entry) = entry else { continue };
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.starts_with(&wanted) && entry.path().is_file() {
            matches.push(entry.path());
        }
    }

    matches.sort();
    let Some(path) = matches.into_iter().next() else {
        return Ok(None);
    };

    let metadata = std::fs::metadata(&path)?;
    let modified = metadata.modified()?;
    let created = metadata.created().unwrap_or(modified);

    Ok(Some(StoredArtifact {
        path,
        size_bytes: metadata.len(),
        created_at: DateTime::<Utc>::from(created),
        modified_at: DateTime::<Utc>::from(modified),
    }))
}

/// Best-effort snapshot of a directory's file names, for diagnostics
fn directory_listing(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
