// Export all necessary modules
pub mod cli;
pub mod config;
pub mod error;
pub mod indicators;
pub mod market_data;
pub mod models;
pub mod service;

pub use error::IndexError;
pub use indicators::IndexCalculator;
pub use models::{IndexResult, Indicator, PriceBar, Sentiment};
pub use service::IndexService;
