//! Request-path currency resolution.
//!
//! Every rate comes out of process memory: a live snapshot (subject to a
//! freshness window), a last-known-good snapshot (any age), fixed
//! constants, or the identity rate as the final fail-safe. The request
//! path never touches the network; only the refresh worker does.

use std::collections::HashMap;

use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use cache::BoundedTtlCache;
use catalog::model::Currency;
use common::time::now_ms;

use crate::config::RateConfig;
use crate::error::RateError;
use crate::snapshot::RateSnapshot;

/// Which tier satisfied a rate-to-base lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateSource {
    Live,
    LastKnownGood,
    Fixed,
    /// No tier had the currency; 1.0 was used and a warning recorded.
    Identity,
}

#[derive(Default)]
struct Tiers {
    live: Option<RateSnapshot>,
    last_known_good: Option<RateSnapshot>,
}

pub struct ExchangeRateResolver {
    tiers: RwLock<Tiers>,
    fixed: HashMap<Currency, Decimal>,

    /// Non-tier-1 pair rates, keyed `FROM->TO`. Populated out-of-band;
    /// a miss here is an explicit error, never a constant fallback.
    exotic: BoundedTtlCache<Decimal>,

    freshness_window_ms: u64,
    exotic_ttl_ms: u64,
}

impl ExchangeRateResolver {
    pub fn new(cfg: &RateConfig) -> Self {
        Self::with_fixed_rates(cfg, Self::default_fixed_rates())
    }

    /// Construct with an explicit constants table (tests, ops overrides).
    pub fn with_fixed_rates(cfg: &RateConfig, fixed: HashMap<Currency, Decimal>) -> Self {
        Self {
            tiers: RwLock::new(Tiers::default()),
            fixed,
            exotic: BoundedTtlCache::new(cfg.exotic_capacity),
            freshness_window_ms: cfg.freshness_window_ms,
            exotic_ttl_ms: cfg.exotic_ttl_ms,
        }
    }

    /// Hardcoded rate-to-EUR approximations, the lowest-trust tier.
    pub fn default_fixed_rates() -> HashMap<Currency, Decimal> {
        let mut rates = HashMap::new();
        rates.insert(Currency::eur(), Decimal::ONE);
        rates.insert("USD".parse().unwrap(), Decimal::new(92, 2));
        rates.insert("ILS".parse().unwrap(), Decimal::new(25, 2));
        rates.insert("GBP".parse().unwrap(), Decimal::new(116, 2));
        rates
    }

    /// Install a freshly fetched snapshot, replacing both the live and
    /// last-known-good tiers. Called by the refresh worker only.
    pub fn apply_snapshot(&self, rates: HashMap<Currency, Decimal>, loaded_at_ms: u64) {
        let snapshot = RateSnapshot::new(rates, loaded_at_ms);

        let mut tiers = self.tiers.write();
        tiers.live = Some(snapshot.clone());
        tiers.last_known_good = Some(snapshot);
    }

    /// Record an out-of-band rate for a non-tier-1 pair.
    pub fn insert_exotic_rate(&self, from: &Currency, to: &Currency, rate: Decimal) {
        self.exotic
            .set(pair_key(from, to), rate, self.exotic_ttl_ms, now_ms());
    }

    /// Conversion rate such that `amount(from) * rate = amount(to)`.
    pub fn get_rate(&self, from: &Currency, to: &Currency) -> Result<Decimal, RateError> {
        self.get_rate_at(from, to, now_ms())
    }

    pub fn get_rate_at(
        &self,
        from: &Currency,
        to: &Currency,
        now_ms: u64,
    ) -> Result<Decimal, RateError> {
        if from == to {
            return Ok(Decimal::ONE);
        }

        if from.is_tier_one() && to.is_tier_one() {
            let (from_rate, from_source) = self.resolve_to_base(from, now_ms);
            let (to_rate, to_source) = self.resolve_to_base(to, now_ms);

            if to_rate.is_zero() {
                warn!(%from, %to, "zero base rate; no conversion applied");
                return Ok(Decimal::ONE);
            }

            let rate = from_rate / to_rate;
            debug!(
                %from, %to, %rate,
                from_source = ?from_source,
                to_source = ?to_source,
                "tier-1 rate resolved"
            );
            return Ok(rate);
        }

        // Outside tier-1 only a previously cached pair rate is
        // acceptable; failing loudly beats converting with a guess.
        match self.exotic.get(&pair_key(from, to), now_ms) {
            Some(rate) => Ok(rate),
            None => Err(RateError::RateUnavailable {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }

    /// Convert an amount between currencies. Amounts must be positive.
    pub fn convert(
        &self,
        amount: Decimal,
        from: &Currency,
        to: &Currency,
    ) -> Result<Decimal, RateError> {
        if amount <= Decimal::ZERO {
            return Err(RateError::InvalidAmount);
        }

        let rate = self.get_rate(from, to)?;
        Ok(amount * rate)
    }

    /// Resolve one tier-1 currency to its rate-to-base, walking the
    /// tier chain: fresh live snapshot, then last-known-good at any
    /// age, then fixed constants, then identity with a warning.
    pub fn resolve_to_base(&self, currency: &Currency, now_ms: u64) -> (Decimal, RateSource) {
        let tiers = self.tiers.read();

        if let Some(live) = &tiers.live {
            if live.is_fresh(now_ms, self.freshness_window_ms) {
                if let Some(rate) = live.rate_to_base(currency) {
                    return (rate, RateSource::Live);
                }
            }
        }

        if let Some(lkg) = &tiers.last_known_good {
            if let Some(rate) = lkg.rate_to_base(currency) {
                return (rate, RateSource::LastKnownGood);
            }
        }

        if let Some(rate) = self.fixed.get(currency) {
            warn!(%currency, %rate, "no rate snapshot; using fixed fallback constant");
            return (*rate, RateSource::Fixed);
        }

        warn!(%currency, "no snapshot or constant; no conversion applied");
        (Decimal::ONE, RateSource::Identity)
    }
}

fn pair_key(from: &Currency, to: &Currency) -> String {
    format!("{}->{}", from.as_str(), to.as_str())
}
