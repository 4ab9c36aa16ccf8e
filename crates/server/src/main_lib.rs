use std::path::PathBuf;
use std::sync::Arc;

use portfolio_dashboard_core::PortfolioDashboard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub dashboard: Arc<PortfolioDashboard>,
    pub holdings_path: PathBuf,
}

impl AppState {
    pub fn new(dashboard: PortfolioDashboard, holdings_path: impl Into<PathBuf>) -> Arc<Self> {
        Arc::new(Self {
            dashboard: Arc::new(dashboard),
            holdings_path: holdings_path.into(),
        })
    }
}

/// Install the global subscriber. `RUST_LOG` filters (default `info`);
/// `PD_LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("PD_LOG_FORMAT").is_ok_and(|f| f.trim().eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let dashboard = PortfolioDashboard::new(config.dashboard.clone())?;
    tracing::info!(
        holdings = %config.holdings_path.display(),
        dashboard = ?dashboard,
        "dashboard initialised"
    );
    Ok(AppState::new(dashboard, config.holdings_path.clone()))
}
