//! Media fetch handlers.

use super::{FetchQuery, FetchRequest};
use crate::api::AppState;
use crate::error::Error;
use crate::types::{ArtifactMetadata, FetchReport};
use crate::utils::format_size;
use axum::{
    Json,
    body::Body,
    extract::{Query, State},
    http::{StatusCode, header},
    response::Response,
};
use std::time::Instant;
use tokio_util::io::ReaderStream;
use tokio_util::sync::CancellationToken;

/// GET /fetch - Download media and reply with JSON metadata
#[utoipa::path(
    get,
    path = "/api/v1/fetch",
    tag = "fetch",
    params(
        ("url" = String, Query, description = "Absolute HTTP/HTTPS URL of the media to fetch")
    ),
    responses(
        (status = 200, description = "Download completed", body = FetchReport),
        (status = 400, description = "Invalid URL", body = crate::error::ApiError),
        (status = 502, description = "Download tool failed", body = crate::error::ApiError),
        (status = 503, description = "Download tool not installed", body = crate::error::ApiError)
    )
)]
pub async fn fetch_json(
    State(state): State<AppState>,
    Query(query): Query<FetchQuery>,
) -> Result<Json<FetchReport>, Error> {
    tracing::info!(url = %query.url, "fetch request received");
    let started = Instant::now();

    // If the client disconnects, the handler future is dropped and the guard
    // cancels the token, taking the child process down with it.
    let cancel = CancellationToken::new();
    let _disconnect_guard = cancel.clone().drop_guard();

    let stream = state.fetcher.fetch(&query.url, cancel).await?;
    let artifact = stream.artifact();

    Ok(Json(FetchReport {
        url: query.url,
        file_name: artifact.file_name(),
        size_bytes: artifact.size_bytes,
        size_display: format_size(artifact.size_bytes),
        elapsed_seconds: started.elapsed().as_secs_f64(),
    }))
}

/// POST /fetch - Download media and stream the file back
#[utoipa::path(
    post,
    path = "/api/v1/fetch",
    tag = "fetch",
    request_body = FetchRequest,
    responses(
        (status = 200, description = "Artifact bytes", content_type = "video/mp4"),
        (status = 400, description = "Invalid URL", body = crate::error::ApiError),
        (status = 502, description = "Download tool failed", body = crate::error::ApiError),
        (status = 503, description = "Download tool not installed", body = crate::error::ApiError)
    )
)]
pub async fn fetch_stream(
    State(state): State<AppState>,
    Json(request): Json<FetchRequest>,
) -> Result<Response, Error> {
    tracing::info!(url = %request.url, "fetch-and-stream request received");

    let cancel = CancellationToken::new();
    let _disconnect_guard = cancel.clone().drop_guard();

    let stream = state.fetcher.fetch(&request.url, cancel).await?;
    let (artifact, file) = stream.into_parts();
    let file_name = artifact.file_name();

    tracing::info!(
        file = %file_name,
        size_bytes = artifact.size_bytes,
        "streaming artifact to client"
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "video/mp4")
        .header(header::CONTENT_LENGTH, artifact.size_bytes)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{file_name}\""),
        )
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| Error::ApiServer(e.to_string()))
}

/// GET /fetch/metadata - Metadata of an already-downloaded artifact
///
/// Only inspects the storage directory; never downloads.
#[utoipa::path(
    get,
    path = "/api/v1/fetch/metadata",
    tag = "fetch",
    params(
        ("url" = String, Query, description = "URL the artifact was fetched from")
    ),
    responses(
        (status = 200, description = "Artifact metadata (exists=false when never fetched)", body = ArtifactMetadata),
        (status = 400, description = "Invalid URL", body = crate::error::ApiError)
    )
)]
pub async fn fetch_metadata(
    State(state): State<AppState>,
    Query(query): Query<FetchQuery>,
) -> Result<Json<ArtifactMetadata>, Error> {
    let metadata = match state.fetcher.find_existing(&query.url)? {
        Some(artifact) => {
            tracing::debug!(url = %query.url, file = %artifact.file_name(), "artifact found");
            ArtifactMetadata::present(&query.url, &artifact)
        }
        None => {
            tracing::debug!(url = %query.url, "no artifact for url");
            ArtifactMetadata::absent(&query.url)
        }
    };
    Ok(Json(metadata))
}
