//! Offer mutations and cached reads.
//!
//! Success or failure of a mutation is decided by the persistence
//! write alone; everything downstream (min-price sync, cascade) is
//! best-effort and self-healing through TTL expiry.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use catalog::model::{Currency, Fixture, FixtureId, Offer, OfferId};
use catalog::store::{FixtureStore, OfferStore};
use common::logger::TraceId;
use rates::ExchangeRateResolver;

use crate::caches::PricingCaches;
use crate::cascade::InvalidationCascade;
use crate::comparator::OfferComparator;
use crate::error::OfferError;
use crate::min_price::MinPriceSync;
use crate::types::{
    CacheDomainStats, LowestCheck, LowestOffer, MinPriceUpdate, OfferDraft, OfferFilters,
    OffersPage, Pagination,
};

pub struct OfferService<O: OfferStore, F: FixtureStore> {
    offers: Arc<O>,
    fixtures: Arc<F>,
    comparator: OfferComparator<O>,
    min_price: MinPriceSync<O, F>,
    cascade: InvalidationCascade<F>,
    caches: PricingCaches,
}

impl<O: OfferStore, F: FixtureStore> OfferService<O, F> {
    pub fn new(
        offers: Arc<O>,
        fixtures: Arc<F>,
        resolver: Arc<ExchangeRateResolver>,
        caches: PricingCaches,
    ) -> Self {
        let comparator = OfferComparator::new(Arc::clone(&offers), Arc::clone(&resolver));
        let min_price = MinPriceSync::new(Arc::clone(&fixtures), comparator.clone());
        let cascade = InvalidationCascade::new(
            Arc::clone(&fixtures),
            Arc::clone(&caches.teams),
            Arc::clone(&caches.leagues),
            Arc::clone(&caches.offers),
        );

        Self {
            offers,
            fixtures,
            comparator,
            min_price,
            cascade,
            caches,
        }
    }

    /// Persist a new offer, superseding the owner's previous offer for
    /// the same fixture and ticket type, then reconcile min-price and
    /// dependent caches.
    #[instrument(
        skip_all,
        fields(
            trace_id = %TraceId::default().to_field(),
            fixture = %draft.fixture_id,
            owner = %draft.owner,
        )
    )]
    pub async fn create_offer(&self, draft: OfferDraft) -> Result<Offer, OfferError> {
        if draft.price <= Decimal::ZERO {
            return Err(OfferError::InvalidPrice);
        }
        if !draft.currency.is_tier_one() {
            return Err(OfferError::UnsupportedCurrency(draft.currency.to_string()));
        }

        let fixture = self
            .fixtures
            .find_by_id(draft.fixture_id)
            .await?
            .ok_or(OfferError::FixtureNotFound)?;

        // One current offer per (fixture, owner, ticket type).
        let superseded = self
            .offers
            .delete_for_owner(draft.fixture_id, &draft.owner, draft.ticket_type)
            .await?;
        if let Some(old) = &superseded {
            debug!(superseded = %old.id, "previous offer superseded");
        }

        let now = Utc::now();
        let offer = Offer {
            id: Uuid::new_v4(),
            fixture_id: draft.fixture_id,
            owner: draft.owner,
            price: draft.price,
            currency: draft.currency,
            ticket_type: draft.ticket_type,
            is_available: true,
            note: draft.note,
            url: draft.url,
            created_at: now,
            updated_at: now,
        };
        self.offers.insert(&offer).await?;

        info!(
            offer = %offer.id,
            price = %offer.price,
            currency = %offer.currency,
            "offer created"
        );

        self.after_mutation(&fixture).await;

        Ok(offer)
    }

    /// Delete an offer by id. Unknown ids are a `None`, not an error;
    /// an offer whose fixture has vanished is still deleted.
    #[instrument(skip_all, fields(trace_id = %TraceId::default().to_field(), offer = %id))]
    pub async fn delete_offer(&self, id: OfferId) -> Result<Option<Offer>, OfferError> {
        let Some(offer) = self.offers.find_by_id(id).await? else {
            debug!("offer not found for deletion");
            return Ok(None);
        };

        let fixture = self.fixtures.find_by_id(offer.fixture_id).await?;

        let deleted = self.offers.delete(id).await?;
        info!(fixture = %offer.fixture_id, "offer deleted");

        match fixture {
            Some(fixture) => self.after_mutation(&fixture).await,
            None => {
                self.caches.offers.delete(offer.fixture_id);
                warn!(fixture = %offer.fixture_id, "fixture missing for deleted offer");
            }
        }

        Ok(deleted)
    }

    /// Flip an offer's availability. Unavailable offers stop
    /// participating in price computation, so this runs the same
    /// post-mutation reconciliation as create/delete.
    #[instrument(skip_all, fields(trace_id = %TraceId::default().to_field(), offer = %id))]
    pub async fn set_offer_availability(
        &self,
        id: OfferId,
        available: bool,
    ) -> Result<Option<Offer>, OfferError> {
        let Some(offer) = self.offers.set_availability(id, available).await? else {
            debug!("offer not found for availability change");
            return Ok(None);
        };

        info!(fixture = %offer.fixture_id, available, "offer availability changed");

        if let Some(fixture) = self.fixtures.find_by_id(offer.fixture_id).await? {
            self.after_mutation(&fixture).await;
        }

        Ok(Some(offer))
    }

    /// Read path: cached offer pages keyed by fixture and filters.
    pub async fn get_offers_by_fixture(
        &self,
        fixture_id: FixtureId,
        filters: &OfferFilters,
    ) -> Result<OffersPage, OfferError> {
        if let Some(mut page) = self.caches.offers.get(fixture_id, filters) {
            page.from_cache = true;
            debug!(%fixture_id, "offers served from cache");
            return Ok(page);
        }

        if self.fixtures.find_by_id(fixture_id).await?.is_none() {
            return Err(OfferError::FixtureNotFound);
        }

        let mut offers = self.offers.find_by_fixture(fixture_id).await?;
        if filters.available_only {
            offers.retain(|o| o.is_available);
        }
        if let Some(ticket_type) = filters.ticket_type {
            offers.retain(|o| o.ticket_type == ticket_type);
        }

        let total = offers.len();
        let limit = filters.limit.max(1);
        let page_no = filters.page.max(1);
        let start = (page_no - 1) * limit;

        let offers: Vec<Offer> = offers.into_iter().skip(start).take(limit).collect();

        let page = OffersPage {
            offers,
            pagination: Pagination {
                page: page_no,
                limit,
                total,
                pages: total.div_ceil(limit),
            },
            from_cache: false,
        };

        self.caches.offers.set(fixture_id, filters, page.clone());

        Ok(page)
    }

    pub async fn is_lowest_offer(
        &self,
        price: Decimal,
        currency: &Currency,
        fixture_id: FixtureId,
    ) -> Result<LowestCheck, OfferError> {
        self.comparator
            .is_lowest_offer(price, currency, fixture_id)
            .await
    }

    pub async fn get_lowest_offer(
        &self,
        fixture_id: FixtureId,
    ) -> Result<Option<LowestOffer>, OfferError> {
        self.comparator.get_lowest_offer(fixture_id).await
    }

    pub async fn update_min_price(
        &self,
        fixture_id: FixtureId,
    ) -> Result<MinPriceUpdate, OfferError> {
        self.min_price.update_min_price(fixture_id).await
    }

    // Administrative cache controls, one per domain.

    pub fn clear_team_fixtures_cache(&self) -> usize {
        self.caches.teams.clear()
    }

    pub fn clear_league_fixtures_cache(&self) -> usize {
        self.caches.leagues.clear()
    }

    pub fn clear_offers_cache(&self) -> usize {
        self.caches.offers.clear()
    }

    pub fn cache_stats(&self) -> CacheDomainStats {
        CacheDomainStats {
            teams: self.caches.teams.stats(),
            leagues: self.caches.leagues.stats(),
            offers: self.caches.offers.stats(),
        }
    }

    /// Post-mutation reconciliation. The cached offer list changed no
    /// matter what min-price does, so its entry always goes; the wider
    /// cascade runs only on a reported min-price change.
    async fn after_mutation(&self, fixture: &Fixture) {
        self.caches.offers.delete(fixture.id);

        match self.min_price.update_min_price(fixture.id).await {
            Ok(outcome) if outcome.updated => {
                self.cascade.run(fixture).await;
            }
            Ok(_) => {
                debug!(fixture = %fixture.id, "min price unchanged; no cascade");
            }
            Err(e) => {
                warn!(
                    fixture = %fixture.id,
                    error = %e,
                    "min price sync failed; caches heal on expiry"
                );
            }
        }
    }
}
