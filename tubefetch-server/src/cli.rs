use std::path::PathBuf;

use clap::Parser;

/// Command-line overrides; anything left unset comes from the environment.
#[derive(Debug, Parser)]
#[command(name = "tubefetch-server", version, about = "YouTube download form backend")]
pub struct Cli {
    /// Address to listen on, e.g. `127.0.0.1:3000`.
    #[arg(long)]
    pub bind: Option<String>,

    /// tracing filter, e.g. `debug,tower_http=warn`.
    #[arg(long)]
    pub log: Option<String>,

    /// Emit newline-delimited JSON logs.
    #[arg(long)]
    pub log_json: bool,

    /// Directory with the download form.
    #[arg(long, conflicts_with = "no_static")]
    pub static_dir: Option<PathBuf>,

    /// Do not serve static files.
    #[arg(long)]
    pub no_static: bool,

    /// Do not expose the OpenAPI document.
    #[arg(long)]
    pub no_docs: bool,
}
