use serde::{Deserialize, Serialize};
use tubefetch_core::DownloadPlan;
use utoipa::{IntoParams, ToSchema};

/// Body of `POST /api/download`. Every field is required; they are optional
/// here so that a missing one can be reported as a 400 with our own message.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DownloadRequest {
    /// YouTube watch or short link.
    pub url: Option<String>,
    /// `mp4` or `mp3`.
    pub format: Option<String>,
    /// `1080`/`720`/`480`/`360` for mp4, `320`/`256`/`128` for mp3.
    #[schema(value_type = Option<String>)]
    pub quality: Option<QualityValue>,
}

/// The form sends quality as a string; scripted clients often send a number.
/// Anything else is kept verbatim so the quality check can reject it.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum QualityValue {
    Text(String),
    Number(serde_json::Number),
    Other(serde_json::Value),
}

impl QualityValue {
    pub fn into_text(self) -> String {
        match self {
            QualityValue::Text(s) => s,
            QualityValue::Number(n) => match (n.as_u64(), n.as_f64()) {
                (Some(whole), _) => whole.to_string(),
                (None, Some(f)) if f >= 0.0 && f.fract() == 0.0 => format!("{f:.0}"),
                _ => n.to_string(),
            },
            QualityValue::Other(v) => v.to_string(),
        }
    }
}

/// Trim a request field; blank counts as absent.
pub fn present(field: Option<String>) -> Option<String> {
    field
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DownloadResponse {
    /// Always `"success"`.
    pub status: String,
    pub message: String,
    pub data: DownloadData,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadData {
    pub video_id: String,
    pub format: String,
    pub quality: String,
    /// Relative URL that streams the media.
    pub download_url: String,
    pub filename: String,
}

impl DownloadResponse {
    pub fn from_plan(plan: &DownloadPlan) -> Self {
        Self {
            status: "success".into(),
            message: "Download processed successfully".into(),
            data: DownloadData {
                video_id: plan.video_id.clone(),
                format: plan.format.to_string(),
                quality: plan.quality.to_string(),
                download_url: plan.stream_path(),
                filename: plan.placeholder_filename(),
            },
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UrlCheckQuery {
    /// URL to validate.
    pub url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UrlCheckResponse {
    pub status: String,
    pub message: String,
    pub valid: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct InfoRequest {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StreamQuery {
    /// `mp4` or `mp3`.
    pub format: String,
    /// Quality from the format's fixed set.
    pub quality: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod test {
    use super::*;
    use tubefetch_core::{MediaFormat, Quality};

    #[test]
    fn quality_accepts_text_or_number() {
        let req: DownloadRequest =
            serde_json::from_str(r#"{"url":"u","format":"mp3","quality":320}"#).unwrap();
        assert_eq!(req.quality.map(QualityValue::into_text).as_deref(), Some("320"));

        let req: DownloadRequest = serde_json::from_str(r#"{"quality":"720"}"#).unwrap();
        assert!(req.url.is_none());
        assert_eq!(req.quality.map(QualityValue::into_text).as_deref(), Some("720"));
    }

    #[test]
    fn whole_floats_and_other_values_become_text() {
        let text = |json: &str| {
            serde_json::from_str::<DownloadRequest>(json)
                .unwrap()
                .quality
                .map(QualityValue::into_text)
        };
        assert_eq!(text(r#"{"quality":720.0}"#).as_deref(), Some("720"));
        assert_eq!(text(r#"{"quality":720.5}"#).as_deref(), Some("720.5"));
        assert_eq!(text(r#"{"quality":true}"#).as_deref(), Some("true"));
        assert_eq!(text(r#"{"quality":null}"#), None);
    }

    #[test]
    fn blank_fields_are_absent() {
        assert_eq!(present(Some("  ".into())), None);
        assert_eq!(present(None), None);
        assert_eq!(present(Some(" mp4 ".into())).as_deref(), Some("mp4"));
    }

    #[test]
    fn envelope_uses_camel_case_keys() {
        let format = MediaFormat::Mp4;
        let plan = DownloadPlan::new("abc123", format, Quality::parse(format, "720").unwrap());
        let body = serde_json::to_value(DownloadResponse::from_plan(&plan)).unwrap();
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["videoId"], "abc123");
        assert_eq!(body["data"]["downloadUrl"], "/api/stream/abc123?format=mp4&quality=720");
        assert_eq!(body["data"]["filename"], "video_abc123.mp4");
    }
}
