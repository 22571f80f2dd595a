//! Scheduled tier-1 rate refresh.
//!
//! One upstream call loads every tier-1 symbol against the EUR base.
//! On success both resolver tiers are replaced; on failure the
//! last-known-good tier is left untouched and the outcome reports
//! degraded. Runs independently of any request.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{info, warn};

use catalog::model::{BASE_CURRENCY, Currency, TIER_ONE_CURRENCIES};
use common::time::now_ms;

use crate::client::RateClient;
use crate::error::RateError;
use crate::resolver::ExchangeRateResolver;

/// Result of one refresh attempt.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    Updated { currencies: Vec<Currency> },
    Degraded { reason: String },
}

pub struct RateRefresher {
    client: RateClient,
    resolver: Arc<ExchangeRateResolver>,
}

impl RateRefresher {
    pub fn new(client: RateClient, resolver: Arc<ExchangeRateResolver>) -> Self {
        Self { client, resolver }
    }

    /// Fetch and install tier-1 rates once. Never propagates upstream
    /// failure; the existing tiers keep serving.
    pub async fn refresh_once(&self) -> RefreshOutcome {
        let symbols: Vec<&str> = TIER_ONE_CURRENCIES
            .iter()
            .copied()
            .filter(|c| *c != BASE_CURRENCY)
            .collect();

        match self.client.fetch_latest(BASE_CURRENCY, &symbols).await {
            Ok(api_rates) => {
                let rates = invert_api_rates(&api_rates);
                let currencies: Vec<Currency> = rates.keys().cloned().collect();

                self.resolver.apply_snapshot(rates, now_ms());

                info!(?currencies, "exchange rates refreshed");
                RefreshOutcome::Updated { currencies }
            }
            Err(e) => {
                warn!(error = %e, "exchange rate refresh failed; keeping last-known-good tier");
                RefreshOutcome::Degraded {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Fetch and cache one non-tier-1 pair rate. Out-of-band only; the
    /// request path reads the exotic cache and never calls this.
    pub async fn refresh_pair(&self, from: &Currency, to: &Currency) -> Result<Decimal, RateError> {
        let raw = self.client.fetch_pair(from.as_str(), to.as_str()).await?;
        let rate = Decimal::from_f64(raw).ok_or(RateError::InvalidResponse)?;

        self.resolver.insert_exotic_rate(from, to, rate);
        Ok(rate)
    }
}

/// Convert provider rates (base -> currency) into stored rate-to-base
/// entries (currency -> base) by inversion. Non-positive or non-finite
/// provider values are skipped; the base currency maps to 1.
pub fn invert_api_rates(api_rates: &HashMap<String, f64>) -> HashMap<Currency, Decimal> {
    let mut rates = HashMap::new();
    rates.insert(Currency::eur(), Decimal::ONE);

    for (symbol, &value) in api_rates {
        if !value.is_finite() || value <= 0.0 {
            warn!(symbol, value, "skipping unusable provider rate");
            continue;
        }

        let Ok(currency) = symbol.parse::<Currency>() else {
            warn!(symbol, "skipping unparsable provider symbol");
            continue;
        };

        if let Some(rate) = Decimal::from_f64(1.0 / value) {
            rates.insert(currency, rate);
        }
    }

    rates
}

/// Run the refresh loop forever. Ticks that land while a refresh is
/// still in flight are skipped rather than queued.
pub async fn run_rate_refresh(refresher: RateRefresher, every: Duration) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(every_ms = every.as_millis(), "rate refresh worker started");

    loop {
        ticker.tick().await;

        match refresher.refresh_once().await {
            RefreshOutcome::Updated { currencies } => {
                info!(count = currencies.len(), "rate refresh tick complete");
            }
            RefreshOutcome::Degraded { reason } => {
                warn!(reason, "rate refresh tick degraded");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn inversion_turns_base_to_currency_into_rate_to_base() {
        let mut api = HashMap::new();
        api.insert("USD".to_string(), 1.25);

        let rates = invert_api_rates(&api);

        let usd: Currency = "USD".parse().unwrap();
        assert_eq!(rates.get(&usd).copied(), Some(dec!(0.8)));
        assert_eq!(rates.get(&Currency::eur()).copied(), Some(dec!(1)));
    }

    #[test]
    fn unusable_provider_values_are_skipped() {
        let mut api = HashMap::new();
        api.insert("USD".to_string(), 0.0);
        api.insert("ILS".to_string(), -3.0);
        api.insert("GBP".to_string(), f64::NAN);
        api.insert("bad-code".to_string(), 1.5);

        let rates = invert_api_rates(&api);

        // Only the implicit base entry survives.
        assert_eq!(rates.len(), 1);
        assert!(rates.contains_key(&Currency::eur()));
    }
}
