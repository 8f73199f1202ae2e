//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use tubefetch_core::MediaSource;

use crate::config::Config;

/// State shared across all HTTP handlers. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Where metadata and media bytes come from.
    pub media: Arc<dyn MediaSource>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
