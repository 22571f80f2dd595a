pub mod client;
pub mod config;
pub mod error;
pub mod refresh;
pub mod resolver;
pub mod snapshot;

pub use client::RateClient;
pub use config::RateConfig;
pub use error::RateError;
pub use refresh::{RateRefresher, RefreshOutcome};
pub use resolver::{ExchangeRateResolver, RateSource};
