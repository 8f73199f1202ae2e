//! tubefetch-core – the request-independent half of tubefetch.
//!
//! - [`youtube`]: URL-shape validation and video-identifier extraction.
//! - [`media`]: output formats, per-format quality sets and the [`DownloadPlan`].
//! - [`filename`]: attachment filename sanitising.
//! - [`source`]: the [`MediaSource`] seam and its `yt-dlp`/`ffmpeg` implementation.

pub mod error;
pub mod filename;
pub mod media;
pub mod source;
pub mod youtube;

pub use error::FetchError;
pub use media::{DownloadPlan, MediaError, MediaFormat, Quality};
pub use source::{FormatInfo, MediaSource, MediaStream, VideoInfo, YtDlpSource};
