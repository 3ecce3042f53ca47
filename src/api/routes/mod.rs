//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`fetch`] — Media download, streaming, artifact metadata
//! - [`system`] — Health and OpenAPI

use serde::{Deserialize, Serialize};

mod fetch;
mod system;

// Re-export all handlers so `routes::function_name` continues to work
pub use fetch::*;
pub use system::*;

// ============================================================================
// Query/Request Types (shared across handlers)
// ============================================================================

/// Query parameters for GET /fetch and GET /fetch/metadata
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct FetchQuery {
    /// Absolute HTTP/HTTPS URL of the media to fetch
    pub url: String,
}

/// Request body for POST /fetch
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct FetchRequest {
    /// Absolute HTTP/HTTPS URL of the media to fetch
    pub url: String,
}
