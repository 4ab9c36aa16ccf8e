use serde::{Deserialize, Serialize};

/// A single close price at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Unix timestamp (seconds).
    pub timestamp: i64,
    pub close: f64,
}

/// Historical close prices for one symbol, as aligned arrays for charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSeries {
    pub symbol: String,
    pub period: String,
    pub interval: String,
    pub timestamps: Vec<i64>,
    pub closes: Vec<f64>,
}

impl PriceSeries {
    /// Build a series from points, sorted by timestamp. Points with a
    /// non-finite close are dropped so both arrays stay aligned.
    pub fn from_points(symbol: &str, period: &str, interval: &str, points: &[PricePoint]) -> Self {
        let mut points: Vec<PricePoint> = points
            .iter()
            .filter(|p| p.close.is_finite())
            .copied()
            .collect();
        points.sort_by_key(|p| p.timestamp);

        Self {
            symbol: symbol.to_string(),
            period: period.to_string(),
            interval: interval.to_string(),
            timestamps: points.iter().map(|p| p.timestamp).collect(),
            closes: points.iter().map(|p| p.close).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}
