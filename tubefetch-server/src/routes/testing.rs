//! Helpers shared by the route tests: an in-memory media source and a
//! request/response round trip through the real router.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use bytes::Bytes;
use futures::StreamExt;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use tubefetch_core::{DownloadPlan, FetchError, MediaSource, MediaStream, VideoInfo};

use crate::config::Config;
use crate::state::AppState;

/// Media source that answers from memory and records what it was asked.
#[derive(Default)]
pub struct FakeSource {
    pub info: Option<VideoInfo>,
    pub chunks: Vec<&'static [u8]>,
    pub fail_open: bool,
    pub probed: Mutex<Vec<String>>,
    pub opened: Mutex<Vec<DownloadPlan>>,
}

impl FakeSource {
    pub fn with_title(title: &str) -> Self {
        Self {
            info: Some(VideoInfo {
                title: title.to_owned(),
                duration: 60,
                thumbnail: String::new(),
                formats: Vec::new(),
            }),
            ..Self::default()
        }
    }
}

fn unavailable() -> FetchError {
    FetchError::Timeout {
        program: "fake".into(),
        seconds: 0,
    }
}

#[async_trait]
impl MediaSource for FakeSource {
    async fn probe(&self, url: &str) -> Result<VideoInfo, FetchError> {
        self.probed.lock().unwrap().push(url.to_owned());
        self.info.clone().ok_or_else(unavailable)
    }

    async fn open(&self, plan: &DownloadPlan) -> Result<MediaStream, FetchError> {
        self.opened.lock().unwrap().push(plan.clone());
        if self.fail_open {
            return Err(unavailable());
        }
        let chunks: Vec<std::io::Result<Bytes>> = self
            .chunks
            .iter()
            .map(|c| Ok(Bytes::from_static(c)))
            .collect();
        Ok(futures::stream::iter(chunks).boxed())
    }
}

pub fn test_state(source: FakeSource) -> Arc<AppState> {
    test_state_shared(Arc::new(source))
}

pub fn test_state_shared(source: Arc<FakeSource>) -> Arc<AppState> {
    let mut config = Config::from_lookup(|_| None);
    config.static_dir = None;
    Arc::new(AppState {
        config: Arc::new(config),
        media: source,
    })
}

pub fn json_request(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

/// Send `req` through `app` and decode the body as JSON (`Null` if it is not JSON).
pub async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}
