use std::collections::HashMap;

use catalog::model::Currency;
use rust_decimal::Decimal;

/// One load of tier-1 rates, all expressed as rate-to-base:
/// `1 unit of currency = rate` units of the base currency.
#[derive(Debug, Clone)]
pub struct RateSnapshot {
    rates: HashMap<Currency, Decimal>,
    pub loaded_at_ms: u64,
}

impl RateSnapshot {
    pub fn new(rates: HashMap<Currency, Decimal>, loaded_at_ms: u64) -> Self {
        Self {
            rates,
            loaded_at_ms,
        }
    }

    pub fn rate_to_base(&self, currency: &Currency) -> Option<Decimal> {
        self.rates.get(currency).copied()
    }

    pub fn is_fresh(&self, now_ms: u64, window_ms: u64) -> bool {
        now_ms.saturating_sub(self.loaded_at_ms) < window_ms
    }

    pub fn currencies(&self) -> Vec<Currency> {
        self.rates.keys().cloned().collect()
    }
}
