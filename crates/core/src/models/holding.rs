use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Candidate keys for each logical holding field, tried in order.
///
/// Holdings files are exported from spreadsheets and broker statements, so the
/// same column shows up under several spellings.
pub mod fields {
    pub const SYMBOL: &[&str] = &[
        "Symbol", "symbol", "NSE/BSE", "NSE", "BSE", "Ticker", "ticker", "NSE Code", "BSE Code",
    ];
    pub const NAME: &[&str] = &[
        "Particulars",
        "particulars",
        "Name",
        "name",
        "Stock Name",
        "Company",
    ];
    pub const QTY: &[&str] = &["Qty", "qty", "Quantity", "quantity", "Shares"];
    pub const PURCHASE_PRICE: &[&str] = &[
        "Purchase Price",
        "purchasePrice",
        "purchase_price",
        "Avg Price",
        "Buy Price",
    ];
    pub const INVESTMENT: &[&str] = &["Investment", "investment"];
    pub const CMP: &[&str] = &["CMP", "cmp", "Current Price", "currentPrice"];
    pub const SECTOR: &[&str] = &["Sector", "sector"];
    pub const INDUSTRY: &[&str] = &["Industry", "industry"];
}

/// A single line item from the holdings file.
///
/// No fixed schema: the record is kept as an ordered JSON object and read
/// through tolerant accessors that try several candidate keys and coerce
/// numeric strings ("1,250.50", "₹ 120") into numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawHolding(Map<String, Value>);

impl RawHolding {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// All fields in file order.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// First non-empty string among `keys`, trimmed. Numbers are rendered as
    /// strings so that numeric scrip codes still resolve.
    pub fn text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().filter_map(|k| self.0.get(*k)).find_map(|v| {
            let s = match v {
                Value::String(s) => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            (!s.is_empty()).then_some(s)
        })
    }

    /// First value among `keys` that coerces to a finite number.
    pub fn number(&self, keys: &[&str]) -> Option<f64> {
        keys.iter()
            .filter_map(|k| self.0.get(*k))
            .find_map(coerce_number)
    }

    /// Like [`number`](Self::number) but falls back to `0.0`.
    pub fn number_or_zero(&self, keys: &[&str]) -> f64 {
        self.number(keys).unwrap_or(0.0)
    }

    /// The display name of the holding (company name / particulars).
    pub fn display_name(&self) -> Option<String> {
        self.text(fields::NAME)
    }
}

impl From<Map<String, Value>> for RawHolding {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Signed decimal literal, after thousands separators are removed.
static NUMBER_IN_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[-+]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][-+]?\d+)?").expect("valid number pattern")
});

/// Coerce a JSON value into a finite `f64`.
///
/// Strings may carry currency prefixes, thousands separators or a trailing
/// percent sign; the first decimal literal in the string is used. A dot that
/// directly follows a letter belongs to the prefix (`Rs.1,250`, `INR.500`)
/// and never starts a fraction.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => first_number_in(&s.replace(',', ""))?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn first_number_in(text: &str) -> Option<f64> {
    let mut from = 0;
    loop {
        let m = NUMBER_IN_TEXT.find_at(text, from)?;
        let literal = m.as_str();
        let leading_dot = literal.trim_start_matches(['-', '+']).starts_with('.');
        let after_letter = text[..m.start()]
            .chars()
            .next_back()
            .is_some_and(char::is_alphabetic);
        if leading_dot && after_letter {
            // Sign and dot are single-byte, so this stays on a char boundary.
            from = m.start() + 1;
            continue;
        }
        return literal.parse::<f64>().ok();
    }
}
