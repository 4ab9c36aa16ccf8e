pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use models::{
    holding::RawHolding,
    portfolio::PortfolioSnapshot,
    price::PriceSeries,
    quote::{Quote, SecondaryMetric},
    settings::DashboardConfig,
};
use providers::{
    google_finance::GoogleFinanceProvider,
    traits::{HistoryProvider, MetricPageProvider, QuoteProvider},
    yahoo_finance::{YahooHistoryProvider, YahooQuoteProvider},
};
use services::{
    history_service::HistoryService, lookup_tables::LookupTables,
    metrics_service::MetricsService, quote_service::QuoteService,
    symbol_resolver::SymbolResolver, valuation_service::ValuationService,
};
use storage::{
    cache::{spawn_sweeper, TtlCache},
    holdings_file::HoldingsFile,
};
use tokio::task::JoinHandle;

use errors::CoreError;

/// Main entry point for the portfolio-dashboard core library.
///
/// Owns the process-wide caches and the upstream providers, and runs one
/// enrichment cycle per call: resolve symbols, fetch quotes and metrics
/// (cache-first), reconcile, total. Share it behind an `Arc`; every method
/// takes `&self`.
#[must_use]
pub struct PortfolioDashboard {
    config: DashboardConfig,
    resolver: SymbolResolver,
    quote_service: QuoteService,
    metrics_service: MetricsService,
    valuation_service: ValuationService,
    history_service: Option<HistoryService>,
    quote_cache: Arc<TtlCache<Quote>>,
    metric_cache: Arc<TtlCache<SecondaryMetric>>,
    history_cache: Arc<TtlCache<PriceSeries>>,
}

impl std::fmt::Debug for PortfolioDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioDashboard")
            .field("cached_quotes", &self.quote_cache.len())
            .field("cached_metrics", &self.metric_cache.len())
            .field("cached_series", &self.history_cache.len())
            .field("history_available", &self.history_service.is_some())
            .finish()
    }
}

impl PortfolioDashboard {
    /// Build a dashboard wired to the default upstreams (Yahoo Finance for
    /// quotes and history, Google Finance for P/E and earnings).
    pub fn new(config: DashboardConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let quote_provider = Arc::new(YahooQuoteProvider::new(
            config.quote_base_url.clone(),
            config.http_timeout(),
            &config.user_agent,
        ));
        let metric_provider = Arc::new(GoogleFinanceProvider::new(
            config.metric_base_url.clone(),
            config.http_timeout(),
            &config.user_agent,
        ));
        let history_provider: Option<Arc<dyn HistoryProvider>> = match YahooHistoryProvider::new() {
            Ok(provider) => Some(Arc::new(provider)),
            Err(e) => {
                tracing::warn!(error = %e, "history provider unavailable");
                None
            }
        };
        Self::with_providers(config, quote_provider, metric_provider, history_provider)
    }

    /// Build a dashboard with explicit providers (alternate upstreams, tests).
    pub fn with_providers(
        config: DashboardConfig,
        quote_provider: Arc<dyn QuoteProvider>,
        metric_provider: Arc<dyn MetricPageProvider>,
        history_provider: Option<Arc<dyn HistoryProvider>>,
    ) -> Result<Self, CoreError> {
        config.validate()?;
        let tables = LookupTables::builtin()
            .with_entries(&config.extra_symbols, &config.extra_sectors);

        Ok(Self {
            resolver: SymbolResolver::new(tables),
            quote_service: QuoteService::new(quote_provider, config.quote_batch_size),
            metrics_service: MetricsService::new(metric_provider, config.default_exchange.clone()),
            valuation_service: ValuationService::new(),
            history_service: history_provider.map(HistoryService::new),
            quote_cache: Arc::new(TtlCache::new(config.quote_ttl())),
            metric_cache: Arc::new(TtlCache::new(config.metric_ttl())),
            history_cache: Arc::new(TtlCache::new(config.history_ttl())),
            config,
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    // ── Portfolio ───────────────────────────────────────────────────

    /// Read the holdings file and build a snapshot from it.
    /// Fails only if the file cannot be read or parsed.
    pub async fn load_snapshot(&self, path: impl AsRef<Path>) -> Result<PortfolioSnapshot, CoreError> {
        let holdings = HoldingsFile::load_from_file(path).await?;
        Ok(self.build_snapshot(&holdings).await)
    }

    /// Enrich `holdings` with live data and total them. Never fails: upstream
    /// problems show up as null fields and file-supplied fallbacks.
    pub async fn build_snapshot(&self, holdings: &[RawHolding]) -> PortfolioSnapshot {
        let symbols = self.resolver.resolve_all(holdings);

        let quote_symbols: BTreeSet<String> = symbols.iter().flatten().cloned().collect();
        // First-appearance order, deduplicated.
        let mut seen = BTreeSet::new();
        let metric_symbols: Vec<String> = symbols
            .iter()
            .flatten()
            .filter(|s| seen.insert(s.as_str()))
            .cloned()
            .collect();

        let (quotes, metrics) = tokio::join!(
            self.quote_service
                .fetch_quotes(&self.quote_cache, &quote_symbols),
            self.metrics_service
                .fetch_metrics(&self.metric_cache, &metric_symbols),
        );

        let snapshot = self.valuation_service.reconcile(
            holdings,
            &symbols,
            &quotes,
            &metrics,
            self.resolver.tables(),
            chrono::Utc::now(),
        );
        tracing::info!(
            holdings = snapshot.holdings.len(),
            resolved = quote_symbols.len(),
            total_present_value = snapshot.totals.total_present_value,
            "portfolio snapshot built"
        );
        snapshot
    }

    // ── History ─────────────────────────────────────────────────────

    /// Historical close prices for charting.
    pub async fn get_history(
        &self,
        symbol: &str,
        period: Option<&str>,
        interval: Option<&str>,
    ) -> Result<PriceSeries, CoreError> {
        let service = self.history_service.as_ref().ok_or_else(|| CoreError::Api {
            provider: "history".into(),
            message: "No history provider is configured".into(),
        })?;
        service
            .get_series(&self.history_cache, symbol, period, interval)
            .await
    }

    // ── Caches ──────────────────────────────────────────────────────

    /// Flush every cache. The next request refetches everything.
    pub fn clear_caches(&self) {
        self.quote_cache.clear();
        self.metric_cache.clear();
        self.history_cache.clear();
        tracing::info!("all caches cleared");
    }

    /// Start background sweepers that evict expired cache entries. Must be
    /// called from within a tokio runtime.
    pub fn start_cache_sweepers(&self) -> Vec<JoinHandle<()>> {
        let interval = self.config.cache_sweep_interval();
        [
            spawn_sweeper("quotes", &self.quote_cache, interval),
            spawn_sweeper("metrics", &self.metric_cache, interval),
            spawn_sweeper("history", &self.history_cache, interval),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn quote_cache(&self) -> &TtlCache<Quote> {
        &self.quote_cache
    }

    pub fn metric_cache(&self) -> &TtlCache<SecondaryMetric> {
        &self.metric_cache
    }

    pub fn history_cache(&self) -> &TtlCache<PriceSeries> {
        &self.history_cache
    }
}
