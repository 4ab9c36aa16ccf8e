use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::Duration;

use crate::errors::CoreError;
use super::traits::MetricPageProvider;

const PROVIDER: &str = "Google Finance";

/// Google Finance quote pages (`/finance/quote/TCS:NSE`).
///
/// - **Free**: No API key required.
/// - **Unstructured**: HTML only; P/E and earnings are scraped with
///   heuristics, see `services::metric_extraction`.
/// - **One page per symbol**: no batching.
pub struct GoogleFinanceProvider {
    client: Client,
    base_url: String,
}

impl GoogleFinanceProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration, user_agent: &str) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MetricPageProvider for GoogleFinanceProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch_page(&self, page_symbol: &str) -> Result<String, CoreError> {
        let url = format!("{}/{}", self.base_url, page_symbol);
        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "text/html")
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Page for {page_symbol} returned {status}"),
            });
        }

        Ok(response.text().await?)
    }
}
