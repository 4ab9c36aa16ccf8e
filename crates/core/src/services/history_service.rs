use std::sync::Arc;

use crate::errors::CoreError;
use crate::models::price::PriceSeries;
use crate::providers::traits::HistoryProvider;
use crate::storage::cache::TtlCache;

pub const DEFAULT_PERIOD: &str = "1y";
pub const DEFAULT_INTERVAL: &str = "1d";

pub const PERIODS: &[&str] = &[
    "1d", "5d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "10y", "ytd", "max",
];
pub const INTERVALS: &[&str] = &[
    "1m", "2m", "5m", "15m", "30m", "60m", "90m", "1h", "1d", "5d", "1wk", "1mo", "3mo",
];

/// Proxy + cache for historical close prices used by the dashboard charts.
///
/// Unlike the live-quote path this does not degrade to nulls: an upstream
/// failure is returned to the caller, and nothing is cached for it.
pub struct HistoryService {
    provider: Arc<dyn HistoryProvider>,
}

impl HistoryService {
    pub fn new(provider: Arc<dyn HistoryProvider>) -> Self {
        Self { provider }
    }

    /// Close-price series for `symbol`. `period` and `interval` default to
    /// one year of daily closes.
    pub async fn get_series(
        &self,
        cache: &TtlCache<PriceSeries>,
        symbol: &str,
        period: Option<&str>,
        interval: Option<&str>,
    ) -> Result<PriceSeries, CoreError> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(CoreError::Validation("symbol is required".into()));
        }
        let period = validated(period, DEFAULT_PERIOD, PERIODS, "period")?;
        let interval = validated(interval, DEFAULT_INTERVAL, INTERVALS, "interval")?;

        let key = format!("{symbol}|{period}|{interval}");
        if let Some(series) = cache.get(&key) {
            return Ok(series);
        }

        let points = self
            .provider
            .get_price_range(&symbol, period, interval)
            .await?;
        let series = PriceSeries::from_points(&symbol, period, interval, &points);
        tracing::debug!(
            provider = self.provider.name(),
            symbol = %symbol,
            points = series.len(),
            "fetched price history"
        );

        cache.insert(key, series.clone());
        Ok(series)
    }
}

fn validated<'a>(
    value: Option<&'a str>,
    default: &'a str,
    allowed: &[&str],
    what: &str,
) -> Result<&'a str, CoreError> {
    let value = value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(default);
    if allowed.contains(&value) {
        Ok(value)
    } else {
        Err(CoreError::Validation(format!(
            "unsupported {what} '{value}', expected one of: {}",
            allowed.join(", ")
        )))
    }
}
