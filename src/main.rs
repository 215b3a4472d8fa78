//! Application entry point for the `aurorawatch-nz` service.
//!
//! This binary orchestrates the full startup sequence:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Building the shared HTTP client and in-memory state
//! - Spawning the independent polling loops (solar wind, GOES, ground
//!   magnetometers, composite score, sightings, shocks)
//! - Mounting all API routes via the `routes` gateway and serving
//!
//! # Environment Variables
//! - Feed URLs and poll intervals: see `config.rs` (all optional)
//! - `AURORA_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `AURORA_SPAN_EVENTS` (optional) – span event mode for tracing
//! - `FORCE_COLOR` (optional) – override TTY color detection

use std::{env, io::IsTerminal, net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use dotenvy::dotenv;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use anyhow::Result;

use aurorawatch_nz::poller::PollerSet;
use aurorawatch_nz::{config, pipeline, routes, SharedState};

// ---

/// Clone the shared handles into one polling loop.
macro_rules! spawn_poller {
    ($pollers:expr, $name:expr, $secs:expr, $refresh:path, $client:expr, $cfg:expr, $state:expr) => {{
        let client = $client.clone();
        let cfg = $cfg.clone();
        let state = $state.clone();
        $pollers.spawn($name, Duration::from_secs($secs), move || {
            let client = client.clone();
            let cfg = cfg.clone();
            let state = state.clone();
            async move { $refresh(&client, &cfg, &state).await }
        });
    }};
}

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    init_tracing();
    dotenv().ok();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent("aurorawatch-nz/0.1")
        .build()?;
    let state = Arc::new(SharedState::new());

    let mut pollers = PollerSet::new();
    spawn_poller!(pollers, "solar-wind", cfg.solar_poll_secs, pipeline::refresh_solar_wind, client, cfg, state);
    spawn_poller!(pollers, "goes", cfg.goes_poll_secs, pipeline::refresh_goes, client, cfg, state);
    spawn_poller!(pollers, "ground", cfg.ground_poll_secs, pipeline::refresh_ground, client, cfg, state);
    spawn_poller!(pollers, "base-score", cfg.composite_poll_secs, pipeline::refresh_base_score, client, cfg, state);
    spawn_poller!(pollers, "sightings", cfg.sightings_poll_secs, pipeline::refresh_sightings, client, cfg, state);
    spawn_poller!(pollers, "shocks", cfg.shocks_poll_secs, pipeline::refresh_shocks, client, cfg, state);

    // Build app from routes gateway
    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let app: Router = routes::router(state, cfg, client);

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    // Unreachable in practice; keeps the pollers owned until serve ends.
    pollers.shutdown();
    Ok(())
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// Configures [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var
/// - Span event emission mode controlled by `AURORA_SPAN_EVENTS`
///   (`"full"`, `"enter_exit"`, or CLOSE-only by default)
/// - Log level controlled by `AURORA_LOG_LEVEL` (or `RUST_LOG`)
///
/// Called once at startup before any logging macros are invoked.
fn init_tracing() {
    // ---
    let span_events = match env::var("AURORA_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    // Determine if we should use colors
    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to AURORA_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("AURORA_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "debug",
        };
        EnvFilter::new(format!("{level},hyper=warn,reqwest=warn"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
