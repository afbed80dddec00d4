//! mono8k-server – entry point.
//!
//! Startup order:
//! 1. Parse configuration from environment variables.
//! 2. Initialise structured tracing (JSON in production, pretty in dev).
//! 3. Create the incoming / converted directories.
//! 4. Optionally provision an ffmpeg binary.
//! 5. Build the Axum router and start the HTTP server with graceful shutdown.

mod config;
mod error;
mod handlers;
mod middleware;
mod routes;
mod schemas;
mod state;
mod templates;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::handlers::{FfmpegConverter, Storage};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Configuration ───────────────────────────────────────────────────────
    let cfg = Config::from_env();

    // ── 2. Tracing ─────────────────────────────────────────────────────────────
    // Build the log-level filter, warning loudly if the configured value is
    // not a valid tracing filter expression.
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match cfg.log_level.parse::<tracing_subscriber::EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: MONO8K_LOG='{}' is not a valid tracing filter ({}); \
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

    info!(version = env!("CARGO_PKG_VERSION"), "mono8k-server starting");

    // ── 3. Storage areas ───────────────────────────────────────────────────────
    let storage = Storage::new(&cfg.incoming_dir, &cfg.converted_dir);
    storage.ensure_dirs().await?;
    info!(
        incoming = %storage.incoming_dir().display(),
        converted = %storage.converted_dir().display(),
        "storage ready"
    );

    // ── 4. ffmpeg ──────────────────────────────────────────────────────────────
    if cfg.ffmpeg_auto_download {
        if let Err(e) = handlers::ffmpeg::provision_ffmpeg().await {
            warn!(error = %e, "ffmpeg provisioning failed; conversions will fail until it is installed");
        }
    }
    let converter = FfmpegConverter::new(&cfg.ffmpeg_program, cfg.sample_rate, cfg.channels);
    info!(
        ffmpeg = %cfg.ffmpeg_program.display(),
        sample_rate = cfg.sample_rate,
        channels = cfg.channels,
        "converter configured"
    );

    // ── 5. HTTP server with graceful shutdown ──────────────────────────────────
    let addr: SocketAddr = cfg.bind_address.parse()?;
    let state = Arc::new(AppState::new(cfg, Arc::new(converter))?);
    let app = routes::build(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("mono8k-server stopped");
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
        use tokio::signal::unix::{signal, SignalKind};
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
