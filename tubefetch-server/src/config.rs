//! Server configuration, loaded from environment variables at startup.

use std::path::PathBuf;

use crate::cli::Cli;

/// Runtime configuration for tubefetch-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:$PORT"`, `PORT` defaulting to 3000).
    pub bind_address: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated list of allowed CORS origins; `None` allows any.
    pub cors_allowed_origins: Option<String>,

    /// Serve the OpenAPI document at `/api-docs/openapi.json`.
    pub enable_docs: bool,

    /// Directory holding the download form; `None` disables static serving.
    pub static_dir: Option<PathBuf>,

    /// `yt-dlp` executable (name on `PATH` or absolute path).
    pub yt_dlp_bin: String,

    /// `ffmpeg` executable (name on `PATH` or absolute path).
    pub ffmpeg_bin: String,

    /// Upper bound for a single metadata probe, in seconds.
    pub probe_timeout_secs: u64,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());
        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(default)
        };

        let bind_address = lookup("TUBEFETCH_BIND").unwrap_or_else(|| {
            let port = lookup("PORT")
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(3000);
            format!("0.0.0.0:{port}")
        });

        Self {
            bind_address,
            log_level: env_or("TUBEFETCH_LOG", "info"),
            log_json: flag("TUBEFETCH_LOG_JSON", false),
            cors_allowed_origins: lookup("TUBEFETCH_CORS_ORIGINS").filter(|v| !v.trim().is_empty()),
            enable_docs: flag("TUBEFETCH_ENABLE_DOCS", true),
            static_dir: Some(env_or("TUBEFETCH_STATIC_DIR", "public"))
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from),
            yt_dlp_bin: env_or("TUBEFETCH_YT_DLP", "yt-dlp"),
            ffmpeg_bin: env_or("TUBEFETCH_FFMPEG", "ffmpeg"),
            probe_timeout_secs: lookup("TUBEFETCH_PROBE_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(bind) = &cli.bind {
            self.bind_address = bind.clone();
        }
        if let Some(level) = &cli.log {
            self.log_level = level.clone();
        }
        if cli.log_json {
            self.log_json = true;
        }
        if let Some(dir) = &cli.static_dir {
            self.static_dir = Some(dir.clone());
        }
        if cli.no_static {
            self.static_dir = None;
        }
        if cli.no_docs {
            self.enable_docs = false;
        }
        self
    }
}
