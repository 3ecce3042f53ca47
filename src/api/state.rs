//! Application state for the API server

use crate::{Config, MediaFetcher};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// This struct is cloned for each request (cheap Arc clone) and provides
/// access to the fetcher instance and configuration.
#[derive(Clone)]
pub struct AppState {
    /// The media fetcher handling download orchestration
    pub fetcher: Arc<MediaFetcher>,

    /// Configuration (read access)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(fetcher: Arc<MediaFetcher>, config: Arc<Config>) -> Self {
        Self { fetcher, config }
    }
}
