// =============================================================================
// Market Pulse — Main Entry Point
// =============================================================================
//
// A small aggregation API for a crypto dashboard front end: fetches candles,
// funding rates, open interest, sentiment and global market stats from public
// REST APIs, computes the indicator catalogue, and serves the combined result
// on /data and /data.json.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod binance;
mod dashboard;
mod error;
mod indicators;
mod runtime_config;
mod types;

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::runtime_config::RuntimeConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = RuntimeConfig::load("pulse_config.json").unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    // Environment overrides.
    if let Ok(symbol) = std::env::var("PULSE_SYMBOL") {
        let symbol = symbol.trim().to_uppercase();
        if !symbol.is_empty() {
            config.symbol = symbol;
        }
    }
    if let Ok(addr) = std::env::var("PULSE_BIND_ADDR") {
        config.bind_addr = addr;
    }
    // The liquidation feed is optional: without a key the block degrades
    // gracefully on every request instead of failing the service.
    config.liquidation_api_key = std::env::var("LIQUIDATION_API_KEY")
        .ok()
        .filter(|k| !k.is_empty());

    info!(
        symbol = %config.symbol,
        kline_limit = config.kline_limit,
        liquidation_feed = config.liquidation_api_key.is_some(),
        "Market Pulse starting"
    );

    // ── 2. Build shared state ────────────────────────────────────────────
    let state = Arc::new(AppState::new(config));

    // ── 3. Start the API server ──────────────────────────────────────────
    let bind_addr = state.runtime_config.read().bind_addr.clone();
    let app = api::rest::router(state.clone());

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {bind_addr}: {e}"))?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(
        uptime_secs = state.start_time.elapsed().as_secs(),
        requests_served = state.request_count.load(std::sync::atomic::Ordering::Relaxed),
        "Market Pulse shut down complete."
    );
    Ok(())
}

/// Resolve when Ctrl+C is received.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    } else {
        warn!("Shutdown signal received — stopping gracefully");
    }
}
