//! Cheapest-offer computation.
//!
//! All comparisons happen in the base currency. A conversion failure
//! for one offer degrades to comparing that offer's raw amount rather
//! than dropping it from the running; see DESIGN.md for the tradeoff.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use catalog::model::{Currency, FixtureId};
use catalog::store::OfferStore;
use rates::ExchangeRateResolver;

use crate::error::OfferError;
use crate::types::{LowestCheck, LowestOffer};

pub struct OfferComparator<O: OfferStore> {
    offers: Arc<O>,
    resolver: Arc<ExchangeRateResolver>,
}

impl<O: OfferStore> Clone for OfferComparator<O> {
    fn clone(&self) -> Self {
        Self {
            offers: Arc::clone(&self.offers),
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<O: OfferStore> OfferComparator<O> {
    pub fn new(offers: Arc<O>, resolver: Arc<ExchangeRateResolver>) -> Self {
        Self { offers, resolver }
    }

    /// Convert one price to the base currency for comparison. On
    /// resolver failure the raw amount is used as-is (logged, not
    /// surfaced) so the offer still competes.
    fn to_base(&self, price: Decimal, currency: &Currency) -> Decimal {
        if currency.is_base() {
            return price;
        }

        match self.resolver.get_rate(currency, &Currency::eur()) {
            Ok(rate) => price * rate,
            Err(e) => {
                warn!(
                    %currency,
                    %price,
                    error = %e,
                    "conversion failed; comparing unconverted amount"
                );
                price
            }
        }
    }

    /// Whether a candidate price would be the cheapest for the fixture.
    /// Ties favor the candidate. An empty existing set makes the
    /// candidate trivially lowest.
    pub async fn is_lowest_offer(
        &self,
        price: Decimal,
        currency: &Currency,
        fixture_id: FixtureId,
    ) -> Result<LowestCheck, OfferError> {
        let existing = self.offers.find_available_by_fixture(fixture_id).await?;
        let candidate_in_base = self.to_base(price, currency);

        if existing.is_empty() {
            debug!(%fixture_id, "no existing offers; candidate is lowest by default");
            return Ok(LowestCheck {
                is_lowest: true,
                lowest_price_in_base: candidate_in_base,
                candidate_in_base,
                total_offers: 0,
            });
        }

        let mut lowest = self.to_base(existing[0].price, &existing[0].currency);
        for offer in &existing[1..] {
            let converted = self.to_base(offer.price, &offer.currency);
            if converted < lowest {
                lowest = converted;
            }
        }

        let check = LowestCheck {
            is_lowest: candidate_in_base <= lowest,
            lowest_price_in_base: lowest,
            candidate_in_base,
            total_offers: existing.len(),
        };

        debug!(
            %fixture_id,
            is_lowest = check.is_lowest,
            lowest_in_base = %check.lowest_price_in_base,
            candidate_in_base = %check.candidate_in_base,
            total = check.total_offers,
            "price comparison completed"
        );

        Ok(check)
    }

    /// The available offer with the minimum base-currency price, or
    /// `None` when the fixture has no available offers. The first
    /// offer found wins exact ties.
    pub async fn get_lowest_offer(
        &self,
        fixture_id: FixtureId,
    ) -> Result<Option<LowestOffer>, OfferError> {
        let available = self.offers.find_available_by_fixture(fixture_id).await?;

        let mut best: Option<LowestOffer> = None;
        for offer in available {
            let price_in_base = self.to_base(offer.price, &offer.currency);

            let replace = match &best {
                None => true,
                Some(current) => price_in_base < current.price_in_base,
            };

            if replace {
                best = Some(LowestOffer {
                    offer,
                    price_in_base,
                });
            }
        }

        Ok(best)
    }
}
