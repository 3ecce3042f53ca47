//! REST API server module
//!
//! Provides a thin HTTP adapter over [`MediaFetcher`]: it translates requests
//! into fetch calls and fetch results into status codes, JSON bodies, and
//! streamed responses.

use crate::{Config, MediaFetcher, Result};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Fetch
/// - `GET /api/v1/fetch?url=` - Download media, reply with JSON metadata
/// - `POST /api/v1/fetch` - Download media, stream the file back
/// - `GET /api/v1/fetch/metadata?url=` - Metadata of a prior download (no fetch)
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /api/v1/openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(fetcher: Arc<MediaFetcher>, config: Arc<Config>) -> Router {
    let state = AppState::new(fetcher, config.clone());

    let api_v1 = Router::new()
        .route("/fetch", get(routes::fetch_json))
        .route("/fetch", post(routes::fetch_stream))
        .route("/fetch/metadata", get(routes::fetch_metadata))
        .route("/openapi.json", get(routes::openapi_spec));

    let router = Router::new()
        .nest("/api/v1", api_v1)
        .route("/health", get(routes::health_check));

    // Merge Swagger UI routes if enabled in config (before applying state)
    let router = if config.server.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api/v1/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    // Add state to all routes
    let router = router.with_state(state);

    // Apply CORS middleware if enabled in config
    if config.server.api.cors_enabled {
        let cors = build_cors_layer(&config.server.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// # Arguments
///
/// * `origins` - List of allowed origins (supports "*" for any origin)
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Creates a TCP listener, binds it to the configured address, and serves the
/// API router until the server is shut down.
///
/// # Example
///
/// ```no_run
/// use media_dl::{Config, MediaFetcher};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let fetcher = Arc::new(MediaFetcher::new(config.clone())?);
///
/// // Start API server (blocks until shutdown)
/// media_dl::api::start_api_server(fetcher, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(fetcher: Arc<MediaFetcher>, config: Arc<Config>) -> Result<()> {
    let bind_address = config.server.api.bind_address;

    tracing::info!(address = %bind_address, "starting API server");

    let app = create_router(fetcher, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(address = %bind_address, "API server listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| crate::error::Error::ApiServer(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
