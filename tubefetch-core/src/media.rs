//! Output formats, their quality sets, and the per-request download plan.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::filename::sanitize_filename;
use crate::youtube;

/// Container the client asked for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MediaFormat {
    /// Muxed video + audio.
    Mp4,
    /// Audio only, transcoded with ffmpeg.
    Mp3,
}

impl MediaFormat {
    pub const ALL: [MediaFormat; 2] = [MediaFormat::Mp4, MediaFormat::Mp3];

    /// Parse a client-supplied format token (case-insensitive, trimmed).
    pub fn parse(raw: &str) -> Result<Self, MediaError> {
        raw.trim()
            .parse()
            .map_err(|_| MediaError::UnsupportedFormat(raw.trim().to_owned()))
    }

    pub fn extension(self) -> &'static str {
        match self {
            MediaFormat::Mp4 => "mp4",
            MediaFormat::Mp3 => "mp3",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            MediaFormat::Mp4 => "video/mp4",
            MediaFormat::Mp3 => "audio/mpeg",
        }
    }

    /// Accepted qualities: vertical resolution for video, kbit/s for audio.
    pub fn qualities(self) -> &'static [u16] {
        match self {
            MediaFormat::Mp4 => &[1080, 720, 480, 360],
            MediaFormat::Mp3 => &[320, 256, 128],
        }
    }
}

/// A quality value already checked against its format's allowed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Quality(u16);

impl Quality {
    /// Parse `raw` for `format`. A trailing unit (`p`, `k`, `kbps`) is ignored.
    pub fn parse(format: MediaFormat, raw: &str) -> Result<Self, MediaError> {
        let lowered = raw.trim().to_ascii_lowercase();
        let digits = ["kbps", "k", "p"]
            .iter()
            .find_map(|unit| lowered.strip_suffix(*unit))
            .unwrap_or(lowered.as_str());

        digits
            .parse::<u16>()
            .ok()
            .filter(|value| format.qualities().contains(value))
            .map(Quality)
            .ok_or_else(|| MediaError::UnsupportedQuality {
                format,
                raw: raw.trim().to_owned(),
                allowed: join_qualities(format),
            })
    }

    pub fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn format_names() -> String {
    MediaFormat::ALL
        .iter()
        .map(|f| f.extension())
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_qualities(format: MediaFormat) -> String {
    format
        .qualities()
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Client input that does not fit the format/quality model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("Unsupported format '{0}'; must be one of: {names}", names = format_names())]
    UnsupportedFormat(String),

    #[error("Unsupported quality '{raw}' for {format}; must be one of: {allowed}")]
    UnsupportedQuality {
        format: MediaFormat,
        raw: String,
        allowed: String,
    },
}

/// Everything needed to produce one download: which video, in what shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPlan {
    pub video_id: String,
    pub format: MediaFormat,
    pub quality: Quality,
}

impl DownloadPlan {
    pub fn new(video_id: impl Into<String>, format: MediaFormat, quality: Quality) -> Self {
        Self {
            video_id: video_id.into(),
            format,
            quality,
        }
    }

    pub fn source_url(&self) -> String {
        youtube::watch_url(&self.video_id)
    }

    /// `video_<id>.<ext>`, reported in the JSON envelope.
    pub fn placeholder_filename(&self) -> String {
        format!("video_{}.{}", self.video_id, self.format.extension())
    }

    /// Relative URL of the streaming route for this plan.
    pub fn stream_path(&self) -> String {
        format!(
            "/api/stream/{}?format={}&quality={}",
            self.video_id, self.format, self.quality
        )
    }

    /// Attachment filename derived from the video title when there is one.
    pub fn attachment_filename(&self, title: Option<&str>) -> String {
        let stem = title
            .map(sanitize_filename)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("video_{}", self.video_id));
        format!("{stem}.{}", self.format.extension())
    }

    /// `yt-dlp -f` selector. Video prefers a single progressive mp4 no taller
    /// than the requested height, since the output goes to a pipe and cannot
    /// be merged.
    pub fn format_selector(&self) -> String {
        match self.format {
            MediaFormat::Mp4 => {
                let h = self.quality.value();
                format!("best[height<={h}][ext=mp4]/best[height<={h}]/best")
            }
            MediaFormat::Mp3 => "bestaudio/best".to_owned(),
        }
    }

    /// ffmpeg `-b:a` value; `None` when no transcode step is needed.
    pub fn audio_bitrate(&self) -> Option<String> {
        match self.format {
            MediaFormat::Mp4 => None,
            MediaFormat::Mp3 => Some(format!("{}k", self.quality.value())),
        }
    }
}
