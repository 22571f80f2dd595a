use cache::CacheStats;
use catalog::model::{Currency, FixtureId, MinPrice, Offer, OwnerRef, TicketType};
use rust_decimal::Decimal;
use serde::Serialize;

/// Input for offer creation. Ids, timestamps and availability are
/// assigned by the service.
#[derive(Debug, Clone)]
pub struct OfferDraft {
    pub fixture_id: FixtureId,
    pub owner: OwnerRef,
    pub price: Decimal,
    pub currency: Currency,
    pub ticket_type: TicketType,
    pub note: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
}

/// One cached page of a fixture's offers.
#[derive(Debug, Clone, Serialize)]
pub struct OffersPage {
    pub offers: Vec<Offer>,
    pub pagination: Pagination,
    pub from_cache: bool,
}

/// Query filters for the offers-by-fixture read path. All fields
/// participate in the canonical cache key.
#[derive(Debug, Clone)]
pub struct OfferFilters {
    pub ticket_type: Option<TicketType>,
    pub available_only: bool,
    pub page: usize,
    pub limit: usize,
}

impl Default for OfferFilters {
    fn default() -> Self {
        Self {
            ticket_type: None,
            available_only: false,
            page: 1,
            limit: 20,
        }
    }
}

impl OfferFilters {
    pub(crate) fn cache_filters(&self) -> Vec<(&'static str, String)> {
        let mut filters = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(t) = self.ticket_type {
            filters.push(("ticket", t.to_string()));
        }
        if self.available_only {
            filters.push(("available", "true".to_string()));
        }
        filters
    }
}

/// Query filters for league fixture lookups; each combination is its
/// own cache-key variant under the league's prefix.
#[derive(Debug, Clone, Default)]
pub struct LeagueFilter {
    pub month: Option<String>,
    pub venue: Option<String>,
}

impl LeagueFilter {
    pub(crate) fn cache_filters(&self) -> Vec<(&'static str, String)> {
        let mut filters = Vec::new();
        if let Some(month) = &self.month {
            filters.push(("month", month.clone()));
        }
        if let Some(venue) = &self.venue {
            filters.push(("venue", venue.clone()));
        }
        filters
    }
}

/// Result of one min-price synchronization pass.
///
/// `new_min_price` is only populated when a new value was written;
/// an unchanged or cleared field leaves it `None`.
#[derive(Debug, Clone)]
pub struct MinPriceUpdate {
    pub updated: bool,
    pub new_min_price: Option<MinPrice>,
    pub previous_min_price: Option<MinPrice>,
}

/// The cheapest available offer after base-currency normalization.
#[derive(Debug, Clone)]
pub struct LowestOffer {
    pub offer: Offer,
    pub price_in_base: Decimal,
}

/// Outcome of checking a candidate against the current cheapest.
#[derive(Debug, Clone)]
pub struct LowestCheck {
    pub is_lowest: bool,
    pub lowest_price_in_base: Decimal,
    pub candidate_in_base: Decimal,
    pub total_offers: usize,
}

/// Per-step accounting of one invalidation cascade run.
#[derive(Debug, Clone, Default)]
pub struct CascadeReport {
    pub teams_refreshed: usize,
    pub league_refreshed: bool,
    pub offer_variants_dropped: usize,
}

/// Size/capacity snapshots for the three cache domains.
#[derive(Debug, Clone, Copy)]
pub struct CacheDomainStats {
    pub teams: CacheStats,
    pub leagues: CacheStats,
    pub offers: CacheStats,
}
