//! Application state shared across handlers.

use hitos_core::config::AppConfig;
use hitos_metadata::MetadataStore;
use hitos_storage::ObjectStore;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Illustration storage backend.
    pub storage: Arc<dyn ObjectStore>,
    /// Stage and milestone store.
    pub metadata: Arc<dyn MetadataStore>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        config: AppConfig,
        storage: Arc<dyn ObjectStore>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            storage,
            metadata,
        }
    }

    /// Upload body cap in bytes, as a `usize` for body readers.
    pub fn max_upload_bytes(&self) -> usize {
        usize::try_from(self.config.server.max_upload_bytes).unwrap_or(usize::MAX)
    }
}
