// =============================================================================
// Runtime Configuration — Service settings with atomic save
// =============================================================================
//
// Central configuration for the market-pulse service: the watched symbol,
// kline limits, and every upstream base URL. Base URLs live in config (rather
// than as hard-coded constants) so integration tests can point the service at
// a local stub server.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash. All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_symbol() -> String {
    "BTCUSDT".to_string()
}

fn default_kline_limit() -> u32 {
    250
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_spot_base_url() -> String {
    "https://api.binance.com".to_string()
}

fn default_futures_base_url() -> String {
    "https://fapi.binance.com".to_string()
}

fn default_fear_greed_base_url() -> String {
    "https://api.alternative.me".to_string()
}

fn default_coingecko_base_url() -> String {
    "https://api.coingecko.com".to_string()
}

fn default_liquidation_base_url() -> String {
    "https://open-api.coinglass.com".to_string()
}

fn default_funding_sample() -> usize {
    42
}

fn default_stress_threshold() -> f64 {
    4.0
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level runtime configuration for the market-pulse service.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Symbol & limits -----------------------------------------------------
    /// The symbol the dashboard reports on.
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Bar count requested per indicator timeframe (blocks A/B).
    #[serde(default = "default_kline_limit")]
    pub kline_limit: u32,

    // --- HTTP surface --------------------------------------------------------
    /// Address the API server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    // --- Upstream base URLs --------------------------------------------------
    /// Spot exchange REST base (klines).
    #[serde(default = "default_spot_base_url")]
    pub spot_base_url: String,

    /// Futures exchange REST base (funding rate, open interest).
    #[serde(default = "default_futures_base_url")]
    pub futures_base_url: String,

    /// Fear & Greed index base (alternative.me).
    #[serde(default = "default_fear_greed_base_url")]
    pub fear_greed_base_url: String,

    /// CoinGecko base (coin sentiment + global market stats).
    #[serde(default = "default_coingecko_base_url")]
    pub coingecko_base_url: String,

    /// Liquidation aggregator base. Only used when an API key is present.
    #[serde(default = "default_liquidation_base_url")]
    pub liquidation_base_url: String,

    /// Liquidation aggregator API key. Read from the environment at startup
    /// (`LIQUIDATION_API_KEY`) and never persisted to disk.
    #[serde(skip)]
    pub liquidation_api_key: Option<String>,

    // --- Derived-score tuning ------------------------------------------------
    /// Trailing funding-rate observations used for the z-score.
    #[serde(default = "default_funding_sample")]
    pub funding_sample: usize,

    /// Stress score at or above which the `elevated` flag is set.
    #[serde(default = "default_stress_threshold")]
    pub stress_threshold: f64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            kline_limit: default_kline_limit(),
            bind_addr: default_bind_addr(),
            spot_base_url: default_spot_base_url(),
            futures_base_url: default_futures_base_url(),
            fear_greed_base_url: default_fear_greed_base_url(),
            coingecko_base_url: default_coingecko_base_url(),
            liquidation_base_url: default_liquidation_base_url(),
            liquidation_api_key: None,
            funding_sample: default_funding_sample(),
            stress_threshold: default_stress_threshold(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            symbol = %config.symbol,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    ///
    /// This prevents corruption if the process crashes mid-write.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        // Atomic write: write to a temporary sibling file, then rename.
        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.symbol, "BTCUSDT");
        assert_eq!(cfg.kline_limit, 250);
        assert_eq!(cfg.funding_sample, 42);
        assert!(cfg.liquidation_api_key.is_none());
        assert!(cfg.spot_base_url.starts_with("https://"));
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.symbol, "BTCUSDT");
        assert_eq!(cfg.bind_addr, "0.0.0.0:3001");
        assert!((cfg.stress_threshold - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "symbol": "ETHUSDT", "kline_limit": 500 }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.symbol, "ETHUSDT");
        assert_eq!(cfg.kline_limit, 500);
        assert_eq!(cfg.funding_sample, 42);
    }

    #[test]
    fn api_key_is_never_serialised() {
        let mut cfg = RuntimeConfig::default();
        cfg.liquidation_api_key = Some("secret".to_string());
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn roundtrip_serialisation() {
        let cfg = RuntimeConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let cfg2: RuntimeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.symbol, cfg2.symbol);
        assert_eq!(cfg.kline_limit, cfg2.kline_limit);
        assert_eq!(cfg.spot_base_url, cfg2.spot_base_url);
    }
}
