use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::CoreError;

pub const DEFAULT_QUOTE_BASE_URL: &str = "https://query1.finance.yahoo.com/v7/finance/quote";
pub const DEFAULT_METRIC_BASE_URL: &str = "https://www.google.com/finance/quote";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko)";

/// Runtime configuration for the enrichment pipeline.
///
/// Durations are stored as whole seconds so the struct can be read from a
/// JSON/env source without a custom deserializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Lifetime of a live quote (price/EPS). Prices go stale within seconds.
    pub quote_ttl_secs: u64,

    /// Lifetime of scraped fundamentals (P/E, earnings).
    pub metric_ttl_secs: u64,

    /// Lifetime of a cached historical series.
    pub history_ttl_secs: u64,

    /// How often the background sweeper evicts expired cache entries.
    pub cache_sweep_interval_secs: u64,

    /// Maximum number of symbols per primary-upstream request.
    pub quote_batch_size: usize,

    pub quote_base_url: String,
    pub metric_base_url: String,

    /// Exchange qualifier used for secondary-upstream symbols without an
    /// exchange suffix (e.g. `INFY` → `INFY:NSE`).
    pub default_exchange: String,

    pub http_timeout_secs: u64,
    pub user_agent: String,

    /// Extra display-name → symbol entries, merged over the built-in table.
    pub extra_symbols: HashMap<String, String>,

    /// Extra display-name (or symbol) → sector entries, merged over the
    /// built-in table.
    pub extra_sectors: HashMap<String, String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            quote_ttl_secs: 30,
            metric_ttl_secs: 3600,
            history_ttl_secs: 300,
            cache_sweep_interval_secs: 60,
            quote_batch_size: 10,
            quote_base_url: DEFAULT_QUOTE_BASE_URL.to_string(),
            metric_base_url: DEFAULT_METRIC_BASE_URL.to_string(),
            default_exchange: "NSE".to_string(),
            http_timeout_secs: 15,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            extra_symbols: HashMap::new(),
            extra_sectors: HashMap::new(),
        }
    }
}

impl DashboardConfig {
    pub fn quote_ttl(&self) -> Duration {
        Duration::from_secs(self.quote_ttl_secs)
    }

    pub fn metric_ttl(&self) -> Duration {
        Duration::from_secs(self.metric_ttl_secs)
    }

    pub fn history_ttl(&self) -> Duration {
        Duration::from_secs(self.history_ttl_secs)
    }

    pub fn cache_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_interval_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Reject values that would make the pipeline misbehave.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.quote_batch_size == 0 {
            return Err(CoreError::Config("quote_batch_size must be at least 1".into()));
        }
        if self.cache_sweep_interval_secs == 0 {
            return Err(CoreError::Config(
                "cache_sweep_interval_secs must be at least 1".into(),
            ));
        }
        if self.default_exchange.trim().is_empty() {
            return Err(CoreError::Config("default_exchange must not be empty".into()));
        }
        for (name, url) in [
            ("quote_base_url", &self.quote_base_url),
            ("metric_base_url", &self.metric_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(CoreError::Config(format!("{name} must be an http(s) URL: {url}")));
            }
        }
        Ok(())
    }
}
