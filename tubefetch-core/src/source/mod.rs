//! Where media bytes come from.
//!
//! The HTTP layer only talks to [`MediaSource`]; [`YtDlpSource`] is the
//! production implementation that shells out to `yt-dlp` and `ffmpeg`.

mod ytdlp;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde::Serialize;

use crate::error::FetchError;
use crate::media::DownloadPlan;

pub use ytdlp::YtDlpSource;

/// Body of a download: chunks in order, terminated early by an error if the
/// producing process fails.
pub type MediaStream = BoxStream<'static, std::io::Result<Bytes>>;

#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Fetch title, duration and the list of available formats for `url`.
    async fn probe(&self, url: &str) -> Result<VideoInfo, FetchError>;

    /// Start producing the bytes for `plan`. Dropping the returned stream
    /// stops the producers.
    async fn open(&self, plan: &DownloadPlan) -> Result<MediaStream, FetchError>;
}

/// Video metadata returned by `POST /api/info`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    pub title: String,
    /// Length in whole seconds; `0` when unknown.
    pub duration: u64,
    /// Thumbnail URL; empty when unknown.
    pub thumbnail: String,
    pub formats: Vec<FormatInfo>,
}

/// One downloadable rendition of a video.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct FormatInfo {
    pub format_id: Option<String>,
    pub ext: Option<String>,
    /// `N/A` when yt-dlp does not report one.
    pub resolution: String,
    pub fps: Option<f64>,
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
    pub filesize: Option<u64>,
    /// Human label such as `720p` or `128kbps`.
    pub quality: Option<String>,
    pub has_video: bool,
    pub has_audio: bool,
}
