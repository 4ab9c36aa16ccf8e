pub mod holding;
pub mod portfolio;
pub mod price;
pub mod quote;
pub mod settings;
