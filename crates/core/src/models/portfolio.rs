use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::holding::RawHolding;

/// A holding after enrichment with live data and derived valuation metrics.
///
/// Serializes as the original holding fields followed by the computed ones.
/// Computed fields replace raw fields of the same name, so a stale `"cmp"` in
/// the file never shadows the reconciled `cmp`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedHolding {
    /// The record exactly as read from the holdings file.
    pub raw: RawHolding,
    pub symbol: Option<String>,
    pub qty: f64,
    pub purchase_price: f64,
    pub investment: f64,
    /// Current market price (live when available, else file-supplied, else 0).
    pub cmp: f64,
    pub present_value: f64,
    pub gain_loss: f64,
    /// Fractional return (0.5 == +50%).
    pub gain_loss_pct: f64,
    pub pe: Option<f64>,
    pub latest_earnings: Option<f64>,
    pub sector: String,
}

const COMPUTED_FIELDS: &[&str] = &[
    "symbol",
    "qty",
    "purchasePrice",
    "investment",
    "cmp",
    "presentValue",
    "gainLoss",
    "gainLossPct",
    "pe",
    "latestEarnings",
    "sector",
];

impl Serialize for EnrichedHolding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let raw = self.raw.fields();
        let passthrough = raw
            .iter()
            .filter(|(k, _)| !COMPUTED_FIELDS.contains(&k.as_str()));

        let mut map = serializer.serialize_map(None)?;
        for (key, value) in passthrough {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry("symbol", &self.symbol)?;
        map.serialize_entry("qty", &self.qty)?;
        map.serialize_entry("purchasePrice", &self.purchase_price)?;
        map.serialize_entry("investment", &self.investment)?;
        map.serialize_entry("cmp", &self.cmp)?;
        map.serialize_entry("presentValue", &self.present_value)?;
        map.serialize_entry("gainLoss", &self.gain_loss)?;
        map.serialize_entry("gainLossPct", &self.gain_loss_pct)?;
        map.serialize_entry("pe", &self.pe)?;
        map.serialize_entry("latestEarnings", &self.latest_earnings)?;
        map.serialize_entry("sector", &self.sector)?;
        map.end()
    }
}

/// Portfolio-wide sums. Plain arithmetic totals: no weighting, no currency
/// conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    pub total_investment: f64,
    pub total_present_value: f64,
    pub total_gain_loss: f64,
}

impl PortfolioTotals {
    /// Sum over holdings in order.
    pub fn from_holdings(holdings: &[EnrichedHolding]) -> Self {
        holdings.iter().fold(Self::default(), |mut acc, h| {
            acc.total_investment += h.investment;
            acc.total_present_value += h.present_value;
            acc.total_gain_loss += h.gain_loss;
            acc
        })
    }
}

/// The payload served to the dashboard UI for one request cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub last_updated: chrono::DateTime<chrono::Utc>,
    pub totals: PortfolioTotals,
    pub holdings: Vec<EnrichedHolding>,
}
