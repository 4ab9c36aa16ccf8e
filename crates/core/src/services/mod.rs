pub mod history_service;
pub mod lookup_tables;
pub mod metric_extraction;
pub mod metrics_service;
pub mod quote_service;
pub mod symbol_resolver;
pub mod valuation_service;
