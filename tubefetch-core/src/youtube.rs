//! YouTube URL validation and video-identifier extraction.
//!
//! Validation accepts a URL when any of three overlapping shapes matches. The
//! first shape is the broadest and subsumes the other two; they are kept so
//! the accepted language stays exactly the one the web form advertises.
//! `\w` is restricted to ASCII word characters throughout.

use once_cell::sync::Lazy;
use regex::Regex;

static URL_PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"^(https?://)?(www\.)?(youtube\.com|youtu\.?be)/.+$")
            .expect("generic youtube url regex should compile"),
        Regex::new(r"^https?://(?:www\.)?youtube\.com/watch\?v=[A-Za-z0-9_-]+")
            .expect("watch url regex should compile"),
        Regex::new(r"^https?://youtu\.be/[A-Za-z0-9_-]+")
            .expect("short link regex should compile"),
    ]
});

static QUERY_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"v=([A-Za-z0-9_-]+)").expect("query id regex should compile"));

static SHORT_LINK_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"youtu\.be/([A-Za-z0-9_-]+)").expect("short link id regex should compile")
});

static VIDEO_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("video id regex should compile"));

/// Returns `true` when `url` has one of the accepted YouTube URL shapes.
pub fn is_valid_youtube_url(url: &str) -> bool {
    URL_PATTERNS.iter().any(|pattern| pattern.is_match(url))
}

/// Extract the video identifier from a `v=<id>` query parameter, falling back
/// to a `youtu.be/<id>` path segment.
pub fn extract_video_id(url: &str) -> Option<&str> {
    [&*QUERY_ID_PATTERN, &*SHORT_LINK_ID_PATTERN]
        .into_iter()
        .find_map(|pattern| pattern.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Returns `true` when `id` is a bare identifier token (`[\w-]+`).
pub fn is_valid_video_id(id: &str) -> bool {
    VIDEO_ID_PATTERN.is_match(id)
}

/// Canonical watch URL for a video identifier.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}
