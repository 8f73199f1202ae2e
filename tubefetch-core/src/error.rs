use std::process::ExitStatus;

use thiserror::Error;

/// Errors raised while probing or fetching media through external tools.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The external program could not be started (missing binary, permissions).
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The external program did not finish within the allotted time.
    #[error("{program} timed out after {seconds}s")]
    Timeout { program: String, seconds: u64 },

    /// The external program finished with a non-zero exit status.
    #[error("{program} exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    /// The metadata printed by `yt-dlp` was not the JSON we expect.
    #[error("invalid metadata JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A pipe between processes failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
