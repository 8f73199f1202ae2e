pub mod download;
pub mod info;
pub mod stream;

use std::sync::Arc;

use axum::Router;
use utoipa::OpenApi;

use crate::state::AppState;

/// Routes under `/api`.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(download::router())
        .merge(info::router())
        .merge(stream::router())
}

pub fn api_docs() -> utoipa::openapi::OpenApi {
    let mut doc = download::DownloadApi::openapi();
    doc.merge(info::InfoApi::openapi());
    doc.merge(stream::StreamApi::openapi());
    doc
}

/// Message shared by every route that validates a URL.
pub(crate) const INVALID_URL: &str = "Invalid YouTube URL";
