//! `POST /api/info` – video metadata lookup.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};
use tubefetch_core::{FormatInfo, VideoInfo, youtube};
use utoipa::OpenApi;

use super::INVALID_URL;
use crate::error::ServerError;
use crate::routes::method_not_allowed;
use crate::schemas::api::{ErrorResponse, InfoRequest, present};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(video_info),
    components(schemas(InfoRequest, VideoInfo, FormatInfo))
)]
pub struct InfoApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/info", post(video_info).fallback(method_not_allowed))
}

#[utoipa::path(
    post,
    path = "/api/info",
    tag = "download",
    request_body = InfoRequest,
    responses(
        (status = 200, description = "Video metadata", body = VideoInfo),
        (status = 400, description = "URL missing or invalid", body = ErrorResponse),
        (status = 500, description = "Metadata lookup failed", body = ErrorResponse),
    )
)]
pub async fn video_info(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<InfoRequest>, JsonRejection>,
) -> Result<Json<VideoInfo>, ServerError> {
    let Json(req) = payload?;
    let url = present(req.url)
        .ok_or_else(|| ServerError::BadRequest("Missing URL parameter".into()))?;

    if !youtube::is_valid_youtube_url(&url) {
        return Err(ServerError::BadRequest(INVALID_URL.into()));
    }

    let info = state
        .media
        .probe(&url)
        .await
        .map_err(ServerError::fetch("Failed to fetch video info"))?;
    Ok(Json(info))
}
