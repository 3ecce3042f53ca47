//! REST API server example
//!
//! This example runs media-dl with the REST API enabled, allowing control via
//! HTTP endpoints.
//!
//! After starting, you can:
//! - View Swagger UI at http://localhost:8750/swagger-ui
//! - Download media via GET http://localhost:8750/api/v1/fetch?url=...
//! - Stream a download via POST http://localhost:8750/api/v1/fetch
//! - Inspect artifacts via GET http://localhost:8750/api/v1/fetch/metadata?url=...

use media_dl::config::{ApiConfig, Config, ServerIntegrationConfig, StorageConfig};
use media_dl::{MediaFetcher, run_with_shutdown};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    // Configure API
    let api_config = ApiConfig {
        bind_address: "127.0.0.1:8750".parse::<SocketAddr>()?,
        cors_enabled: true,
        cors_origins: vec!["*".to_string()],
        swagger_ui: true,
    };

    // Build configuration
    let config = Config {
        storage: StorageConfig {
            download_dir: Some("downloads".into()),
        },
        server: ServerIntegrationConfig { api: api_config },
        ..Default::default()
    };
    let config = Arc::new(config);

    // Create fetcher instance (resolves and creates the download directory)
    let fetcher = Arc::new(MediaFetcher::new(config.clone())?);

    println!("media-dl API listening on http://{}", config.server.api.bind_address);

    // Serve until SIGTERM/SIGINT
    run_with_shutdown(fetcher, config).await?;

    Ok(())
}
