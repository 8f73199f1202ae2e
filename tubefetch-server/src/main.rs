//! tubefetch-server – entry point.
//!
//! Startup order:
//! 1. Parse the command line and load configuration from the environment.
//! 2. Initialise structured tracing (JSON in production, pretty in dev).
//! 3. Wire the yt-dlp/ffmpeg media source into the shared state.
//! 4. Build the Axum router and start the HTTP server with graceful shutdown.

mod cli;
mod config;
mod error;
mod middleware;
mod routes;
mod schemas;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use tubefetch_core::YtDlpSource;

use crate::cli::Cli;
use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Configuration ───────────────────────────────────────────────────────
    let cli = Cli::parse();
    let cfg = Config::from_env().with_cli(&cli);

    // ── 2. Tracing ─────────────────────────────────────────────────────────────
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match cfg.log_level.parse::<tracing_subscriber::EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: TUBEFETCH_LOG='{}' is not a valid tracing filter ({}); \
                     falling back to 'info'",
                    cfg.log_level, e
                );
                tracing_subscriber::EnvFilter::new("info")
            }
        },
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true);

    if cfg.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!(version = env!("CARGO_PKG_VERSION"), "tubefetch-server starting");

    // ── 3. Shared application state ────────────────────────────────────────────
    let media = YtDlpSource::new(&cfg.yt_dlp_bin, &cfg.ffmpeg_bin)
        .with_probe_timeout(Duration::from_secs(cfg.probe_timeout_secs));
    info!(
        yt_dlp = %cfg.yt_dlp_bin,
        ffmpeg = %cfg.ffmpeg_bin,
        probe_timeout_secs = cfg.probe_timeout_secs,
        "media source configured"
    );
    match &cfg.static_dir {
        Some(dir) => info!(dir = %dir.display(), "serving download form"),
        None => info!("static file serving disabled"),
    }

    let state = Arc::new(AppState {
        config: Arc::new(cfg.clone()),
        media: Arc::new(media),
    });

    // ── 4. HTTP server with graceful shutdown ──────────────────────────────────
    let app = routes::build(Arc::clone(&state));
    let addr: SocketAddr = cfg.bind_address.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("tubefetch-server stopped");
    Ok(())
}

/// Returns a future that resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; starting graceful shutdown");
}
