use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::models::quote::Quote;
use crate::providers::traits::QuoteProvider;
use crate::storage::cache::TtlCache;

/// Upstream limit on symbols per quote request.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Fetches live quotes cache-first, in fixed-size batches.
///
/// Cache strategy:
/// - **Hit**: returned as-is, no upstream call.
/// - **Miss**: fetched from the provider; successful results are cached with
///   the cache's default TTL.
/// - **Failed batch / unknown symbol**: a null quote is returned and nothing
///   is cached, so the next request tries again.
///
/// The result is total: every requested symbol is present in the output,
/// whatever the upstream did.
pub struct QuoteService {
    provider: Arc<dyn QuoteProvider>,
    batch_size: usize,
}

impl QuoteService {
    pub fn new(provider: Arc<dyn QuoteProvider>, batch_size: usize) -> Self {
        Self {
            provider,
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Quotes for `symbols`, keyed exactly as requested.
    pub async fn fetch_quotes(
        &self,
        cache: &TtlCache<Quote>,
        symbols: &BTreeSet<String>,
    ) -> HashMap<String, Quote> {
        let mut result = HashMap::with_capacity(symbols.len());
        let mut to_fetch = Vec::new();

        for symbol in symbols {
            match cache.get(symbol) {
                Some(quote) => {
                    result.insert(symbol.clone(), quote);
                }
                None => to_fetch.push(symbol.clone()),
            }
        }

        if to_fetch.is_empty() {
            tracing::debug!(hits = result.len(), "all quotes served from cache");
            return result;
        }

        tracing::debug!(
            provider = self.provider.name(),
            hits = result.len(),
            misses = to_fetch.len(),
            "fetching quotes"
        );

        for batch in to_fetch.chunks(self.batch_size) {
            match self.provider.fetch_batch(batch).await {
                Ok(fetched) => {
                    // Upstream may echo symbols in a different case.
                    let fetched: HashMap<String, Quote> = fetched
                        .into_iter()
                        .map(|(symbol, quote)| (symbol.to_uppercase(), quote))
                        .collect();

                    for symbol in batch {
                        let quote = match fetched.get(&symbol.to_uppercase()) {
                            Some(quote) => {
                                cache.insert(symbol.clone(), *quote);
                                *quote
                            }
                            None => {
                                tracing::debug!(symbol = %symbol, "symbol missing from quote response");
                                Quote::empty()
                            }
                        };
                        result.insert(symbol.clone(), quote);
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        provider = self.provider.name(),
                        batch = ?batch,
                        error = %e,
                        "quote batch failed, returning null quotes"
                    );
                    for symbol in batch {
                        result.insert(symbol.clone(), Quote::empty());
                    }
                }
            }
        }

        result
    }
}
