//! Application state for the HTTP server.

use std::sync::Arc;

use super::dto::VersionResponse;
use crate::db::repository::TodoRepository;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn TodoRepository>,
    /// Version payload, built once at startup
    pub version: Arc<VersionResponse>,
}

impl AppState {
    /// Create a new application state with the given repository and version string.
    pub fn new(repository: Arc<dyn TodoRepository>, version: impl Into<String>) -> Self {
        Self {
            repository,
            version: Arc::new(VersionResponse {
                version: version.into(),
            }),
        }
    }
}
