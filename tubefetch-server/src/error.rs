//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to a `{"error": "..."}` JSON body with an appropriate status code.
//!
//! **Security note:** failures of the external tools (yt-dlp, ffmpeg) are
//! logged with full detail, but the caller only sees a fixed message so that
//! stderr output, paths and process details never leak to clients.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use tubefetch_core::{FetchError, MediaError};

/// All errors that can occur in the tubefetch-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The caller sent an invalid or incomplete request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request was valid but could not be turned into a download.
    #[error("processing failed: {0}")]
    Processing(String),

    /// Fetching metadata or media through the external tools failed.
    /// `context` is the message shown to the client.
    #[error("{context}: {source}")]
    Fetch {
        context: &'static str,
        #[source]
        source: FetchError,
    },

    /// No route matched the path.
    #[error("not found")]
    NotFound,

    /// The path exists but does not accept the request method.
    #[error("method not allowed")]
    MethodNotAllowed,

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Adapter for `map_err` that tags a [`FetchError`] with a client message.
    pub fn fetch(context: &'static str) -> impl FnOnce(FetchError) -> Self {
        move |source| ServerError::Fetch { context, source }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            // Client-facing errors: expose the message directly.
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ServerError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_owned()),
            ServerError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method not allowed".to_owned(),
            ),
            ServerError::Processing(m) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Processing failed: {m}"),
            ),

            // Internal errors: log the full detail, return a fixed message.
            ServerError::Fetch { context, source } => {
                error!(error = %source, "{context}");
                (StatusCode::INTERNAL_SERVER_ERROR, (*context).to_owned())
            }
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}

impl From<MediaError> for ServerError {
    fn from(e: MediaError) -> Self {
        ServerError::BadRequest(e.to_string())
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        ServerError::BadRequest(format!("Invalid query string: {}", rejection.body_text()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_codes() {
        let cases = [
            (ServerError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ServerError::Processing("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ServerError::NotFound, StatusCode::NOT_FOUND),
            (ServerError::MethodNotAllowed, StatusCode::METHOD_NOT_ALLOWED),
            (ServerError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn media_errors_are_bad_requests() {
        let err: ServerError = MediaError::UnsupportedFormat("avi".into()).into();
        assert!(matches!(err, ServerError::BadRequest(m) if m.contains("avi")));
    }

    #[test]
    fn fetch_errors_keep_source_out_of_client_message() {
        let source = FetchError::Timeout {
            program: "/opt/secret/yt-dlp".into(),
            seconds: 30,
        };
        let err = ServerError::fetch("Failed to fetch video info")(source);
        assert_eq!(
            err.to_string(),
            "Failed to fetch video info: /opt/secret/yt-dlp timed out after 30s"
        );
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
