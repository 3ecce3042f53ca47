//! Core types for media-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// Outcome of one external-tool invocation
///
/// Captured streams are verbatim, line-ordered, and unfiltered. The struct is
/// immutable after construction and owned by the caller that receives it.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    /// Process exit code (`-1` when the process died to a signal)
    pub exit_code: i32,
    /// Everything the process wrote to standard output
    pub stdout: String,
    /// Everything the process wrote to standard error
    pub stderr: String,
}

impl ExecutionOutcome {
    /// Whether the invocation succeeded (exit code zero)
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// A downloaded file on durable storage
///
/// The file name begins with a content-key prefix; the extension was chosen by
/// the external tool and discovered by directory scan, not predicted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoredArtifact {
    /// Absolute path of the file under the storage root
    #[schema(value_type = String)]
    pub path: PathBuf,
    /// File size in bytes
    pub size_bytes: u64,
    /// Creation timestamp (best effort; falls back to the modification time on
    /// filesystems that do not record birth times)
    pub created_at: DateTime<Utc>,
    /// Last-modification timestamp
    pub modified_at: DateTime<Utc>,
}

impl StoredArtifact {
    /// The artifact's file name, lossily decoded
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// JSON reply for a completed fetch (`GET /api/v1/fetch`)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FetchReport {
    /// The URL that was fetched
    pub url: String,
    /// On-disk name of the downloaded artifact
    pub file_name: String,
    /// Artifact size in bytes
    pub size_bytes: u64,
    /// Human-readable artifact size (e.g., "12.34 MB")
    pub size_display: String,
    /// Wall-clock duration of the fetch in seconds
    pub elapsed_seconds: f64,
}

/// JSON reply for an artifact metadata lookup (`GET /api/v1/fetch/metadata`)
///
/// `exists == false` means no artifact has been downloaded for the URL yet;
/// all file fields are absent in that case.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArtifactMetadata {
    /// Whether an artifact exists for the URL
    pub exists: bool,
    /// The URL the lookup was performed for
    pub url: String,
    /// On-disk file name, if the artifact exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Absolute file path, if the artifact exists
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub path: Option<PathBuf>,
    /// File size in bytes, if the artifact exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    /// Human-readable file size, if the artifact exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_display: Option<String>,
    /// Creation timestamp, if the artifact exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last-modification timestamp, if the artifact exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl ArtifactMetadata {
    /// Metadata reply for a URL with no downloaded artifact
    pub fn absent(url: impl Into<String>) -> Self {
        Self {
            exists: false,
            url: url.into(),
            file_name: None,
            path: None,
            size_bytes: None,
            size_display: None,
            created_at: None,
            modified_at: None,
        }
    }

    /// Metadata reply for an existing artifact
    pub fn present(url: impl Into<String>, artifact: &StoredArtifact) -> Self {
        Self {
            exists: true,
            url: url.into(),
            file_name: Some(artifact.file_name()),
            path: Some(artifact.path.clone()),
            size_bytes: Some(artifact.size_bytes),
            size_display: Some(crate::utils::format_size(artifact.size_bytes)),
            created_at: Some(artifact.created_at),
            modified_at: Some(artifact.modified_at),
        }
    }
}
