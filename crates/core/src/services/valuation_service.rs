use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::models::holding::{fields, RawHolding};
use crate::models::portfolio::{EnrichedHolding, PortfolioSnapshot, PortfolioTotals};
use crate::models::quote::{Quote, SecondaryMetric};

use super::lookup_tables::LookupTables;

pub const UNKNOWN_SECTOR: &str = "Unknown";

/// Round half away from zero to `dp` decimal places.
pub fn round_to(value: f64, dp: i32) -> f64 {
    let factor = 10f64.powi(dp);
    (value * factor).round() / factor
}

/// Combines holding fields with live data and computes valuation metrics.
///
/// Pure business logic: no I/O, no clock (the snapshot timestamp is passed
/// in). Precedence rules:
/// - live price over the file's `CMP`, over `0`;
/// - explicit non-zero `Investment` over `purchase price × qty`;
/// - scraped P/E over `cmp / eps`; scraped earnings over live EPS;
/// - explicit sector, then industry, then the sector table, then "Unknown".
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    /// Enrich every holding (order preserved) and total the portfolio.
    ///
    /// `symbols` is index-aligned with `holdings`; a missing or `None` entry
    /// means the holding has no live data.
    pub fn reconcile(
        &self,
        holdings: &[RawHolding],
        symbols: &[Option<String>],
        quotes: &HashMap<String, Quote>,
        metrics: &HashMap<String, SecondaryMetric>,
        tables: &LookupTables,
        as_of: DateTime<Utc>,
    ) -> PortfolioSnapshot {
        let enriched: Vec<EnrichedHolding> = holdings
            .iter()
            .enumerate()
            .map(|(idx, holding)| {
                let symbol = symbols.get(idx).and_then(|s| s.as_deref());
                let quote = symbol.and_then(|s| quotes.get(s));
                let metric = symbol.and_then(|s| metrics.get(s));
                self.enrich(holding, symbol, quote, metric, tables)
            })
            .collect();

        PortfolioSnapshot {
            last_updated: as_of,
            totals: PortfolioTotals::from_holdings(&enriched),
            holdings: enriched,
        }
    }

    /// Enrich a single holding.
    pub fn enrich(
        &self,
        holding: &RawHolding,
        symbol: Option<&str>,
        quote: Option<&Quote>,
        metric: Option<&SecondaryMetric>,
        tables: &LookupTables,
    ) -> EnrichedHolding {
        let qty = holding.number_or_zero(fields::QTY);
        let purchase_price = holding.number_or_zero(fields::PURCHASE_PRICE);

        let investment = match holding.number(fields::INVESTMENT) {
            Some(explicit) if explicit != 0.0 => explicit,
            _ => round_to(purchase_price * qty, 2),
        };

        let live_price = quote.and_then(|q| q.price);
        let cmp = live_price
            .or_else(|| holding.number(fields::CMP))
            .unwrap_or(0.0);

        let present_value = round_to(qty * cmp, 2);
        let gain_loss = round_to(present_value - investment, 2);
        let gain_loss_pct = if investment != 0.0 {
            round_to(gain_loss / investment, 4)
        } else {
            0.0
        };

        let eps = quote.and_then(|q| q.eps);
        let pe = metric.and_then(|m| m.pe).or_else(|| match eps {
            Some(eps) if eps > 0.0 && cmp > 0.0 => Some(round_to(cmp / eps, 2)),
            _ => None,
        });
        let latest_earnings = metric.and_then(|m| m.earnings).or(eps);

        let sector = holding
            .text(fields::SECTOR)
            .or_else(|| holding.text(fields::INDUSTRY))
            .or_else(|| {
                let name = holding.display_name();
                tables
                    .sector_for(name.as_deref(), symbol)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| UNKNOWN_SECTOR.to_string());

        EnrichedHolding {
            raw: holding.clone(),
            symbol: symbol.map(str::to_string),
            qty,
            purchase_price,
            investment,
            cmp,
            present_value,
            gain_loss,
            gain_loss_pct,
            pe,
            latest_earnings,
            sector,
        }
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}
