//! Core exchange-rate abstractions, configuration and logging

pub mod config;
pub mod log;
pub mod rates;

// Re-export main types for cleaner imports
pub use rates::{DailyRates, ExchangeRateProvider, Quote, Rate, RawPayload};
