//! `POST /api/download` (prepare a download) and `GET /api/download?url=`
//! (validate a URL).

use std::sync::Arc;

use axum::extract::Query;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::routing::post;
use axum::{Json, Router};
use tracing::info;
use tubefetch_core::{DownloadPlan, MediaFormat, Quality, youtube};
use utoipa::OpenApi;

use super::INVALID_URL;
use crate::error::ServerError;
use crate::routes::method_not_allowed;
use crate::schemas::api::{
    DownloadData, DownloadRequest, DownloadResponse, ErrorResponse, QualityValue, UrlCheckQuery,
    UrlCheckResponse, present,
};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(start_download, check_url),
    components(schemas(
        DownloadRequest,
        DownloadResponse,
        DownloadData,
        UrlCheckResponse,
        ErrorResponse,
    ))
)]
pub struct DownloadApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/download",
        post(start_download)
            .get(check_url)
            .fallback(method_not_allowed),
    )
}

/// Validate a download request and describe the resulting download.
///
/// Order of checks: required fields, URL shape, format, quality, then
/// identifier extraction. Only the last one is a server-side (500) failure.
#[utoipa::path(
    post,
    path = "/api/download",
    tag = "download",
    request_body = DownloadRequest,
    responses(
        (status = 200, description = "Download prepared", body = DownloadResponse),
        (status = 400, description = "Missing or invalid parameters", body = ErrorResponse),
        (status = 500, description = "Video ID could not be extracted", body = ErrorResponse),
    )
)]
pub async fn start_download(
    payload: Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<Json<DownloadResponse>, ServerError> {
    let Json(req) = payload?;

    let (Some(url), Some(format), Some(quality)) = (
        present(req.url),
        present(req.format),
        present(req.quality.map(QualityValue::into_text)),
    ) else {
        return Err(ServerError::BadRequest("Missing required parameters".into()));
    };

    if !youtube::is_valid_youtube_url(&url) {
        return Err(ServerError::BadRequest(INVALID_URL.into()));
    }

    let format = MediaFormat::parse(&format)?;
    let quality = Quality::parse(format, &quality)?;

    let video_id = youtube::extract_video_id(&url)
        .ok_or_else(|| ServerError::Processing("Could not extract video ID".into()))?;

    let plan = DownloadPlan::new(video_id, format, quality);
    info!(
        video_id = %plan.video_id,
        format = %plan.format,
        quality = %plan.quality,
        "download prepared"
    );
    Ok(Json(DownloadResponse::from_plan(&plan)))
}

/// Check whether `url` is an accepted YouTube URL.
#[utoipa::path(
    get,
    path = "/api/download",
    tag = "download",
    params(UrlCheckQuery),
    responses(
        (status = 200, description = "URL is valid", body = UrlCheckResponse),
        (status = 400, description = "URL invalid", body = ErrorResponse),
        (status = 405, description = "No `url` parameter given", body = ErrorResponse),
    )
)]
pub async fn check_url(
    query: Result<Query<UrlCheckQuery>, QueryRejection>,
) -> Result<Json<UrlCheckResponse>, ServerError> {
    let Query(q) = query?;
    // A bare GET is not a supported call on this path.
    let Some(url) = q.url else {
        return Err(ServerError::MethodNotAllowed);
    };

    if !youtube::is_valid_youtube_url(url.trim()) {
        return Err(ServerError::BadRequest(INVALID_URL.into()));
    }

    Ok(Json(UrlCheckResponse {
        status: "success".into(),
        message: "URL validated successfully".into(),
        valid: true,
    }))
}
