//! Configuration types for media-dl

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use utoipa::ToSchema;

/// Storage configuration (where artifacts land on disk)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct StorageConfig {
    /// Explicit download directory. When unset, the directory is discovered
    /// once at startup relative to the executable and working directory
    /// (see [`crate::storage::StorageRoot::discover`]).
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub download_dir: Option<PathBuf>,
}

/// External tool configuration (binary name, explicit path, search behavior)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ToolsConfig {
    /// Name of the external downloader binary (default: "yt-dlp")
    #[serde(default = "default_downloader")]
    pub downloader: String,

    /// Path to the downloader executable (auto-detected if None)
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub downloader_path: Option<PathBuf>,

    /// Whether to search PATH and conventional install directories when no
    /// explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            downloader: default_downloader(),
            downloader_path: None,
            search_path: true,
        }
    }
}

/// Fetch behavior configuration (tool arguments, artifact discovery)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct FetchConfig {
    /// Format-preference expression handed to the tool
    /// (default: "best[ext=mp4]/best" — prefer a widely compatible container)
    #[serde(default = "default_format")]
    pub format: String,

    /// Pass --no-playlist so a single URL never expands into a playlist
    #[serde(default = "default_true")]
    pub no_playlist: bool,

    /// Maximum directory scans while waiting for the artifact to appear
    /// after the tool exits (default: 10)
    ///
    /// Filesystem metadata can lag briefly behind process exit on some
    /// platforms; a bounded poll absorbs that without a blind sleep.
    #[serde(default = "default_poll_attempts")]
    pub artifact_poll_attempts: u32,

    /// Delay between artifact discovery scans, in milliseconds (default: 100)
    #[serde(default = "default_poll_interval_ms")]
    pub artifact_poll_interval_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            no_playlist: true,
            artifact_poll_attempts: default_poll_attempts(),
            artifact_poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// REST API server configuration
///
/// Used as a nested sub-config within [`ServerIntegrationConfig`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind the API server to (default: 127.0.0.1:8750)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS headers (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins; "*" allows any origin (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Serve the interactive Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

/// Server integration configuration
///
/// Groups API-server settings. Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ServerIntegrationConfig {
    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// Main configuration for media-dl
///
/// Fields are organized into logical sub-configs:
/// - [`storage`](StorageConfig) — download directory
/// - [`tools`](ToolsConfig) — external binary name, path, search behavior
/// - [`fetch`](FetchConfig) — tool arguments and artifact discovery
/// - [`server`](ServerIntegrationConfig) — REST API settings
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// External tool settings
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Fetch behavior settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Server integration settings
    #[serde(default)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Validate the configuration, returning the first problem found
    pub fn validate(&self) -> crate::Result<()> {
        if self.tools.downloader.trim().is_empty() {
            return Err(crate::Error::Config {
                message: "downloader tool name must not be empty".to_string(),
                key: Some("tools.downloader".to_string()),
            });
        }
        if self.fetch.format.trim().is_empty() {
            return Err(crate::Error::Config {
                message: "format expression must not be empty".to_string(),
                key: Some("fetch.format".to_string()),
            });
        }
        if self.fetch.artifact_poll_attempts == 0 {
            return Err(crate::Error::Config {
                message: "artifact discovery needs at least one scan".to_string(),
                key: Some("fetch.artifact_poll_attempts".to_string()),
            });
        }
        Ok(())
    }
}

fn default_downloader() -> String {
    "yt-dlp".to_string()
}

fn default_format() -> String {
    "best[ext=mp4]/best".to_string()
}

fn default_poll_attempts() -> u32 {
    10
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_bind_address() -> SocketAddr {
    use std::net::{IpAddr, Ipv4Addr};
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8750)
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_true() -> bool {
    true
}
