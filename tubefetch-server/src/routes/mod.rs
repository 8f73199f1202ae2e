//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID spans)
//! - Health route
//! - `/api` download, info and stream routes
//! - Optional OpenAPI document (disable with `TUBEFETCH_ENABLE_DOCS=false`)
//! - Optional static download form (`TUBEFETCH_STATIC_DIR`)

mod api;
pub mod doc;
mod health;
#[cfg(test)]
mod testing;

use std::sync::Arc;

use axum::routing::get;
use axum::{Router, middleware};
use tower_http::services::ServeDir;

use crate::error::ServerError;
use crate::middleware::{cors, trace};
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(health::router())
        .merge(api::router());

    if state.config.enable_docs {
        app = app.route("/api-docs/openapi.json", get(doc::openapi_json));
    }

    app = match &state.config.static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app.fallback(not_found),
    };

    app
        // Outermost layers execute first on the way in.
        .layer(cors::cors_layer(&state.config))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}

async fn not_found() -> ServerError {
    ServerError::NotFound
}

/// Per-route fallback for unsupported methods, so 405s carry a JSON body too.
pub(crate) async fn method_not_allowed() -> ServerError {
    ServerError::MethodNotAllowed
}

#[cfg(test)]
mod test {
    use super::testing::{FakeSource, json_request, send, test_state};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    #[tokio::test]
    async fn unknown_path_is_json_404_without_static_dir() {
        let app = super::build(test_state(FakeSource::default()));
        let (status, body) = send(app, Request::get("/nope").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not found");
    }

    #[tokio::test]
    async fn unsupported_method_is_json_405() {
        let app = super::build(test_state(FakeSource::default()));
        let req = Request::delete("/api/download").body(Body::empty()).unwrap();
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "Method not allowed");
    }

    #[tokio::test]
    async fn trace_id_is_echoed_or_generated() {
        let app = super::build(test_state(FakeSource::default()));
        let id = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        let req = Request::get("/health")
            .header("x-trace-id", id)
            .body(Body::empty())
            .unwrap();
        let response = tower::ServiceExt::oneshot(app.clone(), req).await.unwrap();
        assert_eq!(response.headers()["x-trace-id"], id);

        let req = Request::get("/health").body(Body::empty()).unwrap();
        let response = tower::ServiceExt::oneshot(app, req).await.unwrap();
        let generated = response.headers()["x-trace-id"].to_str().unwrap();
        assert!(uuid::Uuid::parse_str(generated).is_ok());
    }

    #[tokio::test]
    async fn cors_preflight_allows_any_origin_by_default() {
        let app = super::build(test_state(FakeSource::default()));
        let req = Request::options("/api/download")
            .header("origin", "https://example.com")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap();
        let response = tower::ServiceExt::oneshot(app, req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn openapi_document_lists_routes() {
        let app = super::build(test_state(FakeSource::default()));
        let req = Request::get("/api-docs/openapi.json").body(Body::empty()).unwrap();
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::OK);
        for path in ["/health", "/api/download", "/api/info", "/api/stream/{video_id}"] {
            assert!(body["paths"].get(path).is_some(), "missing {path}");
        }
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let app = super::build(test_state(FakeSource::default()));
        let (status, body) = send(app, json_request("/api/download", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
    }
}
