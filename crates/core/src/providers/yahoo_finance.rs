use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::price::PricePoint;
use crate::models::quote::Quote;
use super::traits::{HistoryProvider, QuoteProvider};

const PROVIDER: &str = "Yahoo Finance";

/// Price field, then the fallback used when the market has not traded yet.
const PRICE_FIELDS: &[&str] = &["regularMarketPrice", "regularMarketPreviousClose"];
const EPS_FIELDS: &[&str] = &["epsTrailingTwelveMonths", "epsCurrentYear", "epsForward"];
const EARNINGS_TS_FIELDS: &[&str] = &["earningsTimestamp"];

/// Yahoo Finance batch quote endpoint (`/v7/finance/quote?symbols=A,B`).
///
/// - **Free**: No API key required.
/// - **Batching**: many symbols per request; the quote service caps batches.
/// - **Data**: price, trailing/forward EPS, next earnings timestamp.
///
/// The base URL is configurable so tests and proxies can stand in for the
/// real host.
pub struct YahooQuoteProvider {
    client: Client,
    base_url: String,
}

impl YahooQuoteProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration, user_agent: &str) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl QuoteProvider for YahooQuoteProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch_batch(&self, symbols: &[String]) -> Result<HashMap<String, Quote>, CoreError> {
        let joined = symbols.join(",");
        let response = self
            .client
            .get(&self.base_url)
            .header(header::ACCEPT, "application/json")
            .query(&[("symbols", joined.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Quote request for {} symbol(s) returned {status}", symbols.len()),
            });
        }

        let body: Value = response.json().await.map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse quote response: {e}"),
        })?;

        Ok(parse_quote_response(&body))
    }
}

/// Extract quotes from a `quoteResponse` body.
///
/// Entries without a `symbol` are skipped; missing or malformed fields become
/// `None` rather than failing the batch.
pub fn parse_quote_response(body: &Value) -> HashMap<String, Quote> {
    let results = body
        .pointer("/quoteResponse/result")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    results
        .iter()
        .filter_map(|entry| {
            let symbol = entry.get("symbol")?.as_str()?.trim();
            if symbol.is_empty() {
                return None;
            }
            let quote = Quote {
                price: first_number(entry, PRICE_FIELDS),
                eps: first_number(entry, EPS_FIELDS),
                earnings_timestamp: first_number(entry, EARNINGS_TS_FIELDS).map(|ts| ts as i64),
            };
            Some((symbol.to_string(), quote))
        })
        .collect()
}

/// First finite number among `keys`. Yahoo sometimes wraps numbers as
/// `{"raw": 12.3, "fmt": "12.30"}`.
fn first_number(entry: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| {
        let value = entry.get(*key)?;
        let n = value
            .as_f64()
            .or_else(|| value.get("raw").and_then(Value::as_f64))?;
        n.is_finite().then_some(n)
    })
}

/// Yahoo Finance chart API for historical closes, via the
/// `yahoo_finance_api` crate.
pub struct YahooHistoryProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooHistoryProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new().map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to create connector: {e}"),
        })?;
        Ok(Self { connector })
    }
}

#[async_trait]
impl HistoryProvider for YahooHistoryProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn get_price_range(
        &self,
        symbol: &str,
        period: &str,
        interval: &str,
    ) -> Result<Vec<PricePoint>, CoreError> {
        let resp = self
            .connector
            .get_quote_range(symbol, interval, period)
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to fetch {period}/{interval} history for {symbol}: {e}"),
            })?;

        let quotes = resp.quotes().map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse history for {symbol}: {e}"),
        })?;

        Ok(quotes
            .iter()
            .map(|q| PricePoint {
                timestamp: q.timestamp as i64,
                close: q.close,
            })
            .collect())
    }
}
