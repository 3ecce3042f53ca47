//! # media-dl
//!
//! Backend library for media-download applications built around the external
//! `yt-dlp` tool.
//!
//! ## Design Philosophy
//!
//! media-dl is designed to be:
//! - **Orchestration only** - The media-fetch protocol itself is delegated
//!   entirely to the external tool
//! - **Sensible defaults** - Works out of the box with zero configuration
//! - **Library-first** - Purely a Rust crate for embedding; the bundled REST
//!   API is an optional thin adapter
//! - **Precise about failure** - Every way a fetch can go wrong is a distinct,
//!   typed condition
//!
//! ## Quick Start
//!
//! ```no_run
//! use media_dl::{Config, MediaFetcher};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(Config::default());
//!     let fetcher = MediaFetcher::new(config)?;
//!
//!     let stream = fetcher
//!         .fetch("https://example.com/clip.mp4", CancellationToken::new())
//!         .await?;
//!     println!(
//!         "downloaded {} ({} bytes)",
//!         stream.artifact().file_name(),
//!         stream.artifact().size_bytes
//!     );
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// External tool invocation
pub mod executor;
/// Fetch orchestration
pub mod fetcher;
/// Deterministic content keys
pub mod naming;
/// Subprocess execution with streamed output capture
pub mod runner;
/// Storage-root resolution
pub mod storage;
/// External tool discovery
pub mod tools;
/// Core types
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::{ApiConfig, Config, FetchConfig, StorageConfig, ToolsConfig};
pub use error::{ApiError, Error, ErrorDetail, Result, ToHttpStatus};
pub use executor::{ToolExecutor, YtDlpExecutor};
pub use fetcher::{ArtifactStream, MediaFetcher};
pub use naming::{ContentKey, url_hash};
pub use storage::StorageRoot;
pub use types::{ArtifactMetadata, ExecutionOutcome, FetchReport, StoredArtifact};

use std::sync::Arc;

/// Run the API server until a termination signal arrives.
///
/// - **Unix:** listens for SIGTERM and SIGINT, falling back to Ctrl+C if
///   signal registration fails (restricted environments, containers).
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use media_dl::{Config, MediaFetcher, run_with_shutdown};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Arc::new(Config::default());
///     let fetcher = Arc::new(MediaFetcher::new(config.clone())?);
///
///     run_with_shutdown(fetcher, config).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(fetcher: Arc<MediaFetcher>, config: Arc<Config>) -> Result<()> {
    tokio::select! {
        result = api::start_api_server(fetcher, config) => result,
        _ = wait_for_signal() => {
            tracing::info!("termination signal received, shutting down");
            Ok(())
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Signal registration may fail in restricted environments; fall back to
    // the portable Ctrl+C handler rather than refusing to run
    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("received SIGTERM"),
                _ = sigint.recv() => tracing::info!("received SIGINT"),
            }
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "could not register SIGINT handler");
            sigterm.recv().await;
            tracing::info!("received SIGTERM");
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "could not register SIGTERM handler");
            sigint.recv().await;
            tracing::info!("received SIGINT");
        }
        (Err(_), Err(_)) => {
            tracing::warn!("could not register signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received Ctrl+C"),
        Err(e) => tracing::error!(error = %e, "failed to listen for Ctrl+C"),
    }
}
