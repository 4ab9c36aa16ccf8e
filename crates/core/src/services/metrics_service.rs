use std::collections::HashMap;
use std::sync::Arc;

use crate::models::quote::SecondaryMetric;
use crate::providers::traits::MetricPageProvider;
use crate::storage::cache::TtlCache;

use super::metric_extraction::extract_metrics;

/// Scrapes P/E and latest-earnings figures, one page per symbol.
///
/// Best effort throughout: a symbol that cannot be converted, a page that
/// fails to load, or a page the heuristics cannot read all produce a null
/// metric. Every outcome is cached (nulls included) so a broken page is not
/// re-scraped until the entry expires.
pub struct MetricsService {
    provider: Arc<dyn MetricPageProvider>,
    default_exchange: String,
}

impl MetricsService {
    pub fn new(provider: Arc<dyn MetricPageProvider>, default_exchange: impl Into<String>) -> Self {
        Self {
            provider,
            default_exchange: default_exchange.into(),
        }
    }

    /// Metrics for `symbols`, fetched sequentially in the given order.
    pub async fn fetch_metrics(
        &self,
        cache: &TtlCache<SecondaryMetric>,
        symbols: &[String],
    ) -> HashMap<String, SecondaryMetric> {
        let mut result = HashMap::with_capacity(symbols.len());

        for symbol in symbols {
            if result.contains_key(symbol) {
                continue;
            }
            if let Some(metric) = cache.get(symbol) {
                result.insert(symbol.clone(), metric);
                continue;
            }

            let metric = self.scrape(symbol).await;
            cache.insert(symbol.clone(), metric);
            result.insert(symbol.clone(), metric);
        }

        result
    }

    async fn scrape(&self, symbol: &str) -> SecondaryMetric {
        let Some(page_symbol) = to_page_symbol(symbol, &self.default_exchange) else {
            tracing::debug!(symbol, "no secondary-source form for symbol");
            return SecondaryMetric::empty();
        };

        match self.provider.fetch_page(&page_symbol).await {
            Ok(html) => {
                let metric = extract_metrics(&html);
                if metric.is_empty() {
                    tracing::debug!(symbol, page = %page_symbol, "no metrics found on page");
                }
                metric
            }
            Err(e) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    symbol,
                    error = %e,
                    "metric page fetch failed, caching null metrics"
                );
                SecondaryMetric::empty()
            }
        }
    }
}

/// Convert a primary-upstream symbol to the secondary source's form:
/// `TCS.NS` → `TCS:NSE`, `500180.BO` → `500180:BOM`, `TCS` →
/// `TCS:{default_exchange}`.
///
/// Returns `None` for unknown exchange suffixes and for tickers with
/// characters outside `A-Z 0-9 & -`.
pub fn to_page_symbol(symbol: &str, default_exchange: &str) -> Option<String> {
    let upper = symbol.trim().to_uppercase();
    let (ticker, exchange) = match upper.rsplit_once('.') {
        Some((ticker, "NS")) => (ticker, "NSE"),
        Some((ticker, "BO")) => (ticker, "BOM"),
        Some(_) => return None,
        None => (upper.as_str(), default_exchange),
    };

    let valid = !ticker.is_empty()
        && ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '&' || c == '-');
    valid.then(|| format!("{ticker}:{}", exchange.trim().to_uppercase()))
}
