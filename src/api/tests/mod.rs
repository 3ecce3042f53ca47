use super::*;
use crate::error::ApiError;
use crate::executor::ToolExecutor;
use crate::storage::StorageRoot;
use crate::types::ExecutionOutcome;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

/// Stub executor for router tests: writes an mp4 artifact and exits 0,
/// or exits with the configured failure
struct StubTool {
    exit_code: i32,
    stderr: String,
    write_file: bool,
}

#[async_trait]
impl ToolExecutor for StubTool {
    async fn execute(
        &self,
        _url: &str,
        output_template: &Path,
        _working_dir: &Path,
        _cancel: &CancellationToken,
    ) -> crate::Result<ExecutionOutcome> {
        if self.write_file {
            let target = output_template.to_string_lossy().replace("%(ext)s", "mp4");
            std::fs::write(target, b"fake mp4 bytes").unwrap();
        }
        Ok(ExecutionOutcome {
            exit_code: self.exit_code,
            stdout: String::new(),
            stderr: self.stderr.clone(),
        })
    }

    fn tool_name(&self) -> &str {
        "stub-tool"
    }
}

/// Router backed by a stub tool, plus the tempdir keeping its storage alive
fn test_router(stub: StubTool) -> (Router, tempfile::TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.fetch.artifact_poll_attempts = 2;
    config.fetch.artifact_poll_interval_ms = 10;
    let config = Arc::new(config);

    let fetcher = Arc::new(MediaFetcher::with_executor(
        config.clone(),
        StorageRoot::at(temp_dir.path()),
        Arc::new(stub),
    ));
    (create_router(fetcher, config), temp_dir)
}

fn succeeding_stub() -> StubTool {
    StubTool {
        exit_code: 0,
        stderr: String::new(),
        write_file: true,
    }
}

#[tokio::test]
async fn test_health_check() {
    let (app, _temp_dir) = test_router(succeeding_stub());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_fetch_rejects_invalid_url() {
    let (app, _temp_dir) = test_router(succeeding_stub());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/fetch?url=ftp://example.com/a")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let error: ApiError = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.error.code, "invalid_url");
}

#[tokio::test]
async fn test_fetch_missing_url_parameter_is_bad_request() {
    let (app, _temp_dir) = test_router(succeeding_stub());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/fetch")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_fetch_returns_json_report() {
    let (app, _temp_dir) = test_router(succeeding_stub());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/fetch?url=https://example.com/clip.mp4")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["url"], "https://example.com/clip.mp4");
    assert!(
        json["file_name"]
            .as_str()
            .unwrap()
            .starts_with("clip_")
    );
    assert_eq!(json["size_bytes"], b"fake mp4 bytes".len() as u64);
    assert!(json["elapsed_seconds"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn test_fetch_failure_surfaces_tool_diagnostics() {
    let (app, _temp_dir) = test_router(StubTool {
        exit_code: 1,
        stderr: "ERROR: Unsupported URL".to_string(),
        write_file: false,
    });

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/fetch?url=https://example.com/clip.mp4")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let error: ApiError = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.error.code, "fetch_failed");
    assert_eq!(error.error.details.unwrap()["stderr"], "ERROR: Unsupported URL");
}

#[tokio::test]
async fn test_post_fetch_streams_artifact_bytes() {
    let (app, _temp_dir) = test_router(succeeding_stub());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/fetch")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"url": "https://example.com/clip.mp4"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "video/mp4"
    );
    let disposition = response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(disposition.starts_with("attachment; filename=\"clip_"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"fake mp4 bytes");
}

#[tokio::test]
async fn test_metadata_for_unknown_url_reports_absent() {
    let (app, _temp_dir) = test_router(succeeding_stub());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/fetch/metadata?url=https://example.com/never-fetched.mp4")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["exists"], false);
    assert!(json.get("file_name").is_none());
}

#[tokio::test]
async fn test_metadata_after_fetch_reports_artifact() {
    let (app, _temp_dir) = test_router(succeeding_stub());
    let url = "https://example.com/clip.mp4";

    let fetch = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/fetch?url={url}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(fetch.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/fetch/metadata?url={url}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["exists"], true);
    assert_eq!(json["size_bytes"], b"fake mp4 bytes".len() as u64);
}

#[tokio::test]
async fn test_cors_enabled() {
    let (app, _temp_dir) = test_router(succeeding_stub());

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_openapi_spec_served() {
    let (app, _temp_dir) = test_router(succeeding_stub());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["paths"]["/api/v1/fetch"].is_object());
}
