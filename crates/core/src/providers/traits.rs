use async_trait::async_trait;
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::price::PricePoint;
use crate::models::quote::Quote;

/// Primary live-quote upstream, queried in batches.
///
/// Implementations report transport and HTTP failures as `Err`; the quote
/// service turns those into null quotes for the affected batch.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch quotes for one batch of symbols in a single upstream request.
    ///
    /// The returned map is keyed by the symbol as the upstream spells it and
    /// only contains symbols present in the response.
    async fn fetch_batch(&self, symbols: &[String]) -> Result<HashMap<String, Quote>, CoreError>;
}

/// Secondary upstream serving one unstructured page per symbol.
#[async_trait]
pub trait MetricPageProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch the raw page for a secondary-form symbol (e.g. `TCS:NSE`).
    async fn fetch_page(&self, page_symbol: &str) -> Result<String, CoreError>;
}

/// Historical close prices for charting.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Close prices for `symbol` over `period` (e.g. `1y`) sampled at
    /// `interval` (e.g. `1d`).
    async fn get_price_range(
        &self,
        symbol: &str,
        period: &str,
        interval: &str,
    ) -> Result<Vec<PricePoint>, CoreError>;
}
