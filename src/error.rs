//! Error types for media-dl
//!
//! This module provides comprehensive error handling for the library, including:
//! - Domain-specific error variants (invalid URL, tool resolution, execution, discovery)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for media-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for media-dl
///
/// This is the primary error type used throughout the library. Each variant includes
/// contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "storage.download_dir")
        key: Option<String>,
    },

    /// The supplied URL is missing, relative, or not HTTP/HTTPS
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The external download tool could not be located anywhere
    #[error("external tool '{tool}' not found")]
    ToolUnavailable {
        /// Name of the tool that could not be located (e.g., "yt-dlp")
        tool: String,
    },

    /// The external tool was found but could not be started
    ///
    /// Distinct from the tool running and exiting non-zero, which is reported
    /// as [`Error::FetchFailed`].
    #[error("failed to invoke '{tool}': {reason}")]
    ToolInvocation {
        /// Name of the tool that failed to start
        tool: String,
        /// The underlying spawn failure (missing binary, permissions, etc.)
        reason: String,
    },

    /// The external tool ran and exited non-zero
    #[error("download tool exited with code {exit_code}")]
    FetchFailed {
        /// The child process exit code
        exit_code: i32,
        /// Captured standard output, verbatim
        stdout: String,
        /// Captured standard error, verbatim
        stderr: String,
    },

    /// The tool reported success but no matching artifact exists on disk
    #[error("no artifact found in {} after successful download", .dir.display())]
    ArtifactMissing {
        /// The storage root that was searched
        dir: PathBuf,
        /// Snapshot of the directory contents at the time of the search
        listing: Vec<String>,
    },

    /// The fetch was cancelled by the caller
    ///
    /// Not a failure: must never be logged as an error, and the child process
    /// is guaranteed to have been terminated.
    #[error("fetch cancelled")]
    Cancelled,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServer(String),
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
/// It follows a standard format with machine-readable error codes,
/// human-readable messages, and optional contextual details.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "fetch_failed",
///     "message": "download tool exited with code 1",
///     "details": {
///       "exit_code": 1
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "invalid_url", "tool_unavailable")
    ///
    /// Clients can use this for programmatic error handling.
    pub code: String,

    /// Human-readable error message
    ///
    /// This is suitable for displaying to end users.
    pub message: String,

    /// Optional additional context about the error
    ///
    /// This can include fields like exit codes, captured stderr, directory
    /// listings, etc.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an API error with additional details
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
///
/// This trait maps domain errors to appropriate HTTP status codes.
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Config { .. } => 400,
            Error::InvalidUrl(_) => 400,

            // 499 Client Closed Request - caller abandoned the fetch
            Error::Cancelled => 499,

            // 502 Bad Gateway - the external tool failed
            Error::FetchFailed { .. } => 502,

            // 503 Service Unavailable - no tool, nothing to serve with
            Error::ToolUnavailable { .. } => 503,

            // 500 Internal Server Error - Server-side issues
            Error::ToolInvocation { .. } => 500,
            Error::ArtifactMissing { .. } => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServer(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::InvalidUrl(_) => "invalid_url",
            Error::ToolUnavailable { .. } => "tool_unavailable",
            Error::ToolInvocation { .. } => "tool_invocation_failed",
            Error::FetchFailed { .. } => "fetch_failed",
            Error::ArtifactMissing { .. } => "artifact_missing",
            Error::Cancelled => "cancelled",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServer(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        // Add contextual details for specific error types
        let details = match &error {
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            Error::ToolUnavailable { tool } => Some(serde_json::json!({
                "tool": tool,
            })),
            Error::ToolInvocation { tool, reason } => Some(serde_json::json!({
                "tool": tool,
                "reason": reason,
            })),
            Error::FetchFailed {
                exit_code,
                stdout,
                stderr,
            } => Some(serde_json::json!({
                "exit_code": exit_code,
                "stdout": stdout,
                "stderr": stderr,
            })),
            Error::ArtifactMissing { dir, listing } => Some(serde_json::json!({
                "directory": dir,
                "listing": listing,
            })),
            _ => None,
        };

        Self {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
