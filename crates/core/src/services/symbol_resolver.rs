use crate::models::holding::{fields, RawHolding};

use super::lookup_tables::LookupTables;

/// Values that spreadsheets use for "no ticker".
const PLACEHOLDERS: &[&str] = &["N/A", "NA", "NONE", "NULL", "-", "--"];

/// Maps raw holdings to canonical exchange symbols.
///
/// Pure business logic: no I/O, never fails. An unresolved holding is a
/// normal outcome; downstream it simply has no live data.
pub struct SymbolResolver {
    tables: LookupTables,
}

impl SymbolResolver {
    pub fn new(tables: LookupTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &LookupTables {
        &self.tables
    }

    /// Resolve one holding. First match wins:
    /// 1. an explicit ticker-like field,
    /// 2. exact display-name lookup,
    /// 3. case/whitespace-insensitive display-name lookup.
    pub fn resolve(&self, holding: &RawHolding) -> Option<String> {
        if let Some(symbol) = holding
            .text(fields::SYMBOL)
            .and_then(|raw| normalize_ticker(&raw))
        {
            return Some(symbol);
        }

        let name = holding.display_name()?;
        self.tables
            .symbol_exact(&name)
            .or_else(|| self.tables.symbol_normalized(&name))
            .map(str::to_string)
    }

    /// Resolve every holding; the output is index-aligned with the input.
    pub fn resolve_all(&self, holdings: &[RawHolding]) -> Vec<Option<String>> {
        holdings.iter().map(|h| self.resolve(h)).collect()
    }
}

impl Default for SymbolResolver {
    fn default() -> Self {
        Self::new(LookupTables::builtin())
    }
}

/// Normalize a ticker taken verbatim from a holding.
///
/// Purely numeric values are BSE scrip codes (`500180` → `500180.BO`); bare
/// tickers are assumed NSE (`tcs` → `TCS.NS`); values that already carry an
/// exchange suffix are kept as-is (uppercased).
pub fn normalize_ticker(raw: &str) -> Option<String> {
    let ticker: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect();

    if ticker.is_empty()
        || PLACEHOLDERS.contains(&ticker.as_str())
        || !ticker.chars().any(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }

    if ticker.chars().all(|c| c.is_ascii_digit()) {
        return Some(format!("{ticker}.BO"));
    }

    // JSON numbers written as 500180.0, or signed
    let (negative, unsigned) = match ticker.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, ticker.strip_prefix('+').unwrap_or(&ticker)),
    };
    let (int, frac) = unsigned.split_once('.').unwrap_or((unsigned, "0"));
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if digits(int) && digits(frac) {
        return int
            .parse::<u64>()
            .ok()
            .filter(|code| !negative && *code > 0 && frac.bytes().all(|b| b == b'0'))
            .map(|code| format!("{code}.BO"));
    }

    if ticker.contains('.') {
        Some(ticker)
    } else {
        Some(format!("{ticker}.NS"))
    }
}
