use serde::{Deserialize, Serialize};

/// Live market data for one symbol from the primary quote upstream.
///
/// Every field is optional: a symbol the upstream does not know, or a batch
/// that failed, yields [`Quote::empty`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub price: Option<f64>,
    pub eps: Option<f64>,
    /// Unix timestamp (seconds) of the next or most recent earnings release.
    pub earnings_timestamp: Option<i64>,
}

impl Quote {
    /// A fully-null quote.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.price.is_none() && self.eps.is_none() && self.earnings_timestamp.is_none()
    }
}

/// Slower-moving fundamentals scraped from the secondary upstream.
///
/// A fully-null metric is still a meaningful cache entry: it records that the
/// page was fetched (or could not be) and keeps us from scraping it again
/// before the entry expires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondaryMetric {
    pub pe: Option<f64>,
    pub earnings: Option<f64>,
}

impl SecondaryMetric {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pe.is_none() && self.earnings.is_none()
    }
}
