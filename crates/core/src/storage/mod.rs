pub mod cache;
pub mod holdings_file;
pub mod repair;
