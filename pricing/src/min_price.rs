//! Min-price synchronization.
//!
//! The sole writer of the fixture's denormalized min-price field. The
//! `updated` flag it reports is the only gate that decides whether the
//! invalidation cascade runs.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use catalog::model::{FixtureId, MinPrice};
use catalog::store::{FixtureStore, OfferStore};

use crate::comparator::OfferComparator;
use crate::error::OfferError;
use crate::types::MinPriceUpdate;

pub struct MinPriceSync<O: OfferStore, F: FixtureStore> {
    fixtures: Arc<F>,
    comparator: OfferComparator<O>,
}

impl<O: OfferStore, F: FixtureStore> MinPriceSync<O, F> {
    pub fn new(fixtures: Arc<F>, comparator: OfferComparator<O>) -> Self {
        Self {
            fixtures,
            comparator,
        }
    }

    /// Recompute the cheapest available offer and reconcile the stored
    /// field:
    ///
    /// - a new (amount, currency) pair is written in the winning
    ///   offer's own currency
    /// - an identical pair is a reported no-op
    /// - zero available offers unset the field entirely (never zero)
    pub async fn update_min_price(
        &self,
        fixture_id: FixtureId,
    ) -> Result<MinPriceUpdate, OfferError> {
        let fixture = self
            .fixtures
            .find_by_id(fixture_id)
            .await?
            .ok_or(OfferError::FixtureNotFound)?;

        let previous = fixture.min_price;
        let lowest = self.comparator.get_lowest_offer(fixture_id).await?;

        match lowest {
            Some(lowest) => {
                let amount = lowest.offer.price;
                let currency = lowest.offer.currency.clone();

                if previous
                    .as_ref()
                    .is_some_and(|mp| mp.matches(amount, &currency))
                {
                    debug!(%fixture_id, "min price unchanged");
                    return Ok(MinPriceUpdate {
                        updated: false,
                        new_min_price: None,
                        previous_min_price: previous,
                    });
                }

                let min_price = MinPrice {
                    amount,
                    currency,
                    updated_at: Utc::now(),
                };
                self.fixtures.set_min_price(fixture_id, &min_price).await?;

                info!(
                    %fixture_id,
                    amount = %min_price.amount,
                    currency = %min_price.currency,
                    "min price updated"
                );

                Ok(MinPriceUpdate {
                    updated: true,
                    new_min_price: Some(min_price),
                    previous_min_price: previous,
                })
            }
            None => {
                if previous.is_none() {
                    debug!(%fixture_id, "min price already clear");
                    return Ok(MinPriceUpdate {
                        updated: false,
                        new_min_price: None,
                        previous_min_price: None,
                    });
                }

                self.fixtures.unset_min_price(fixture_id).await?;

                info!(%fixture_id, "min price cleared; no available offers remain");

                Ok(MinPriceUpdate {
                    updated: true,
                    new_min_price: None,
                    previous_min_price: previous,
                })
            }
        }
    }
}
