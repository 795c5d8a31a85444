// =============================================================================
// Central Application State — market-pulse service
// =============================================================================
//
// Ties the runtime configuration and the shared HTTP clients together. Every
// request handler holds an Arc reference; the dashboard builder reads a
// config snapshot at the start of each request so a concurrent config change
// never tears a single response.
//
// Thread safety:
//   - Atomic counter for lock-free request counting.
//   - parking_lot::RwLock around the mutable configuration.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::binance::BinanceClient;
use crate::runtime_config::RuntimeConfig;

/// Central application state shared across handlers via `Arc<AppState>`.
pub struct AppState {
    // ── Configuration ───────────────────────────────────────────────────
    pub runtime_config: Arc<RwLock<RuntimeConfig>>,

    // ── Upstream clients ────────────────────────────────────────────────
    /// Exchange REST client (spot klines + futures funding/open interest).
    pub market: BinanceClient,

    /// Shared HTTP client for the non-exchange feeds (sentiment, global
    /// market stats, liquidations).
    pub http: reqwest::Client,

    // ── Operational counters ────────────────────────────────────────────
    /// Total dashboard requests served since startup.
    pub request_count: AtomicU64,

    /// Instant when the service was started. Used for uptime logging.
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Construct a new `AppState` from the given runtime configuration.
    ///
    /// Builds one `reqwest::Client` with a 10-second request timeout and
    /// shares it between the exchange client and the feed fetchers, so a
    /// dead upstream degrades a single block instead of stalling a request
    /// indefinitely.
    pub fn new(config: RuntimeConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("failed to build reqwest client");

        let market = BinanceClient::new(
            config.spot_base_url.clone(),
            config.futures_base_url.clone(),
            http.clone(),
        );

        Self {
            runtime_config: Arc::new(RwLock::new(config)),
            market,
            http,
            request_count: AtomicU64::new(0),
            start_time: std::time::Instant::now(),
        }
    }

    /// Record one served dashboard request and return the running total.
    pub fn count_request(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Snapshot the current configuration for one request.
    pub fn config_snapshot(&self) -> RuntimeConfig {
        self.runtime_config.read().clone()
    }
}
