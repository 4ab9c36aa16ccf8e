use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use portfolio_dashboard_core::models::settings::DashboardConfig;
use serde::Deserialize;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub holdings_path: PathBuf,
    pub static_dir: String,
    pub cors_allow: Vec<String>,
    pub dashboard: DashboardConfig,
}

/// Optional JSON file extending the built-in lookup tables.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TableOverrides {
    symbols: HashMap<String, String>,
    sectors: HashMap<String, String>,
}

impl Config {
    /// Read configuration from the process environment. `main` loads `.env`
    /// before this runs.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Unset keys take
    /// their defaults; set but unparsable keys are an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let listen_addr = parsed(&var, "PD_LISTEN_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?;
        let holdings_path = var("PD_HOLDINGS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/holdings.json"));
        let static_dir = var("PD_STATIC_DIR").unwrap_or_else(|| "dist".into());
        let cors_allow = var("PD_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let defaults = DashboardConfig::default();
        let mut dashboard = DashboardConfig {
            quote_ttl_secs: parsed(&var, "PD_QUOTE_TTL_SECS", defaults.quote_ttl_secs)?,
            metric_ttl_secs: parsed(&var, "PD_METRIC_TTL_SECS", defaults.metric_ttl_secs)?,
            history_ttl_secs: parsed(&var, "PD_HISTORY_TTL_SECS", defaults.history_ttl_secs)?,
            cache_sweep_interval_secs: parsed(
                &var,
                "PD_CACHE_SWEEP_SECS",
                defaults.cache_sweep_interval_secs,
            )?,
            http_timeout_secs: parsed(&var, "PD_HTTP_TIMEOUT_SECS", defaults.http_timeout_secs)?,
            quote_base_url: var("PD_QUOTE_BASE_URL").unwrap_or(defaults.quote_base_url.clone()),
            metric_base_url: var("PD_METRIC_BASE_URL").unwrap_or(defaults.metric_base_url.clone()),
            ..defaults
        };

        if let Some(path) = var("PD_TABLES_PATH") {
            let tables = load_tables(&path)?;
            tracing::info!(
                path = %path,
                symbols = tables.symbols.len(),
                sectors = tables.sectors.len(),
                "loaded lookup table overrides"
            );
            dashboard.extra_symbols = tables.symbols;
            dashboard.extra_sectors = tables.sectors;
        }

        dashboard.validate()?;

        Ok(Self {
            listen_addr,
            holdings_path,
            static_dir,
            cors_allow,
            dashboard,
        })
    }
}

fn parsed<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("Invalid {key}: {raw:?}")),
        None => Ok(default),
    }
}

fn load_tables(path: &str) -> anyhow::Result<TableOverrides> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read PD_TABLES_PATH {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid lookup tables in {path}"))
}
