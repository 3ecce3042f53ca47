//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the media-dl REST API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the media-dl REST API
///
/// The spec can be accessed via:
/// - `/api/v1/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation (if enabled)
#[derive(OpenApi)]
#[openapi(
    info(
        title = "media-dl REST API",
        version = "0.2.0",
        description = "REST API for downloading media via yt-dlp and serving the resulting artifacts",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8750", description = "Local development server")
    ),
    paths(
        // Fetch
        crate::api::routes::fetch_json,
        crate::api::routes::fetch_stream,
        crate::api::routes::fetch_metadata,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        crate::api::routes::FetchQuery,
        crate::api::routes::FetchRequest,
        crate::types::FetchReport,
        crate::types::ArtifactMetadata,
        crate::types::StoredArtifact,
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "fetch", description = "Media download and artifact access"),
        (name = "system", description = "Health and documentation")
    )
)]
pub struct ApiDoc;
