//! `GET /api/stream/{video_id}` – fetch, optionally transcode, and stream the
//! media back as an attachment.
//!
//! The response body pulls directly from the source stream, so a slow client
//! slows the producers down; when the client disconnects the body is dropped
//! and the source's processes with it.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::Response;
use axum::routing::get;
use tracing::{info, warn};
use tubefetch_core::{DownloadPlan, MediaFormat, Quality, youtube};
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::routes::method_not_allowed;
use crate::schemas::api::{ErrorResponse, StreamQuery};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(stream_media))]
pub struct StreamApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/stream/{video_id}",
        get(stream_media).fallback(method_not_allowed),
    )
}

#[utoipa::path(
    get,
    path = "/api/stream/{video_id}",
    tag = "download",
    params(
        ("video_id" = String, Path, description = "YouTube video identifier"),
        StreamQuery,
    ),
    responses(
        (status = 200, description = "Media bytes (video/mp4 or audio/mpeg)", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid id, format or quality", body = ErrorResponse),
        (status = 500, description = "Fetching the media failed", body = ErrorResponse),
    )
)]
pub async fn stream_media(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
    query: Result<Query<StreamQuery>, QueryRejection>,
) -> Result<Response, ServerError> {
    let Query(q) = query?;
    if !youtube::is_valid_video_id(&video_id) {
        return Err(ServerError::BadRequest("Invalid video ID".into()));
    }
    let format = MediaFormat::parse(&q.format)?;
    let quality = Quality::parse(format, &q.quality)?;
    let plan = DownloadPlan::new(video_id, format, quality);

    // The title only names the file; a failed probe falls back to the id.
    let title = match state.media.probe(&plan.source_url()).await {
        Ok(info) => Some(info.title),
        Err(e) => {
            warn!(video_id = %plan.video_id, error = %e, "metadata probe failed; using fallback filename");
            None
        }
    };

    let stream = state
        .media
        .open(&plan)
        .await
        .map_err(ServerError::fetch("Failed to process download"))?;

    let filename = plan.attachment_filename(title.as_deref());
    info!(video_id = %plan.video_id, %filename, "streaming download");

    Response::builder()
        .header(header::CONTENT_TYPE, format.mime_type())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from_stream(stream))
        .map_err(|e| ServerError::Internal(e.to_string()))
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::routes::build;
    use crate::routes::testing::{FakeSource, send, test_state_shared};
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use tubefetch_core::MediaFormat;

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn streams_source_bytes_as_attachment() {
        let source = Arc::new(FakeSource {
            chunks: vec![b"ID3", b"frames"],
            ..FakeSource::with_title("Live at Wembley (2024)")
        });
        let app = build(test_state_shared(source.clone()));

        let response = tower::ServiceExt::oneshot(
            app,
            get("/api/stream/abc123?format=mp3&quality=128"),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Live_at_Wembley_2024.mp3\""
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"ID3frames");

        let opened = source.opened.lock().unwrap();
        assert_eq!(opened.len(), 1);
        assert_eq!(opened[0].video_id, "abc123");
        assert_eq!(opened[0].format, MediaFormat::Mp3);
        assert_eq!(opened[0].quality.value(), 128);
    }

    #[tokio::test]
    async fn failed_probe_falls_back_to_id_filename() {
        let source = Arc::new(FakeSource {
            chunks: vec![b"mp4"],
            ..FakeSource::default()
        });
        let app = build(test_state_shared(source));
        let response = tower::ServiceExt::oneshot(
            app,
            get("/api/stream/abc123?format=mp4&quality=720p"),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "video/mp4");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"video_abc123.mp4\""
        );
    }

    #[tokio::test]
    async fn rejects_bad_parameters() {
        let source = Arc::new(FakeSource::default());
        let app = build(test_state_shared(source.clone()));

        for uri in [
            "/api/stream/abc123?format=mp4",
            "/api/stream/abc123?format=flv&quality=720",
            "/api/stream/abc123?format=mp3&quality=720",
            "/api/stream/abc%26x=1?format=mp4&quality=720",
        ] {
            let (status, body) = send(app.clone(), get(uri)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(body["error"].is_string(), "{uri}");
        }
        assert!(source.opened.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn source_failure_is_generic_500() {
        let source = Arc::new(FakeSource {
            fail_open: true,
            ..FakeSource::with_title("t")
        });
        let app = build(test_state_shared(source));
        let (status, body) = send(app, get("/api/stream/abc123?format=mp4&quality=360")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to process download");
    }
}
