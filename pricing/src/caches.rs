//! Domain wrappers over the bounded TTL store.
//!
//! Three independent instances with their own capacity/TTL tradeoffs.
//! Keys are built through the canonical builder so filter order and
//! literal form never split one logical query across entries.

use std::sync::Arc;

use cache::{BoundedTtlCache, CachePolicy, CacheStats, keys};
use catalog::model::{Fixture, FixtureId, LeagueId, TeamId};
use common::time::now_ms;

use crate::types::{LeagueFilter, OfferFilters, OffersPage};

/// Fixture lists keyed by team id.
pub struct TeamFixturesCache {
    inner: BoundedTtlCache<Vec<Fixture>>,
    ttl_ms: u64,
}

impl TeamFixturesCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            inner: BoundedTtlCache::new(policy.capacity),
            ttl_ms: policy.ttl_ms,
        }
    }

    pub fn get(&self, team: TeamId) -> Option<Vec<Fixture>> {
        self.inner
            .get(&keys::entity_key("team", &team.to_string()), now_ms())
    }

    pub fn set(&self, team: TeamId, fixtures: Vec<Fixture>) {
        self.inner.set(
            keys::entity_key("team", &team.to_string()),
            fixtures,
            self.ttl_ms,
            now_ms(),
        );
    }

    pub fn delete(&self, team: TeamId) -> bool {
        self.inner.delete(&keys::entity_key("team", &team.to_string()))
    }

    pub fn clear(&self) -> usize {
        self.inner.clear()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }
}

/// Fixture lists keyed by league id plus optional month/venue filters.
pub struct LeagueFixturesCache {
    inner: BoundedTtlCache<Vec<Fixture>>,
    ttl_ms: u64,
}

impl LeagueFixturesCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            inner: BoundedTtlCache::new(policy.capacity),
            ttl_ms: policy.ttl_ms,
        }
    }

    fn key(league: LeagueId, filter: &LeagueFilter) -> String {
        keys::filtered_key("league", &league.to_string(), &filter.cache_filters())
    }

    pub fn get(&self, league: LeagueId, filter: &LeagueFilter) -> Option<Vec<Fixture>> {
        self.inner.get(&Self::key(league, filter), now_ms())
    }

    pub fn set(&self, league: LeagueId, filter: &LeagueFilter, fixtures: Vec<Fixture>) {
        self.inner
            .set(Self::key(league, filter), fixtures, self.ttl_ms, now_ms());
    }

    /// Drop every outstanding filter-key variant for one league.
    pub fn delete_league(&self, league: LeagueId) -> usize {
        self.inner
            .delete_prefix(&keys::entity_prefix("league", &league.to_string()))
    }

    pub fn clear(&self) -> usize {
        self.inner.clear()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }
}

/// Offer pages keyed by fixture id plus query filters. Shortest TTL of
/// the three domains; offer prices move fast.
pub struct OffersByFixtureCache {
    inner: BoundedTtlCache<OffersPage>,
    ttl_ms: u64,
}

impl OffersByFixtureCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            inner: BoundedTtlCache::new(policy.capacity),
            ttl_ms: policy.ttl_ms,
        }
    }

    fn key(fixture: FixtureId, filters: &OfferFilters) -> String {
        keys::filtered_key("offer", &fixture.to_string(), &filters.cache_filters())
    }

    pub fn get(&self, fixture: FixtureId, filters: &OfferFilters) -> Option<OffersPage> {
        self.inner.get(&Self::key(fixture, filters), now_ms())
    }

    pub fn set(&self, fixture: FixtureId, filters: &OfferFilters, page: OffersPage) {
        self.inner
            .set(Self::key(fixture, filters), page, self.ttl_ms, now_ms());
    }

    /// Drop every cached page for the fixture.
    pub fn delete(&self, fixture: FixtureId) -> usize {
        self.inner
            .delete_prefix(&keys::entity_prefix("offer", &fixture.to_string()))
    }

    pub fn clear(&self) -> usize {
        self.inner.clear()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }
}

/// The three cache instances wired with their domain policies.
#[derive(Clone)]
pub struct PricingCaches {
    pub teams: Arc<TeamFixturesCache>,
    pub leagues: Arc<LeagueFixturesCache>,
    pub offers: Arc<OffersByFixtureCache>,
}

impl PricingCaches {
    pub fn new() -> Self {
        Self {
            teams: Arc::new(TeamFixturesCache::new(CachePolicy::TEAM_FIXTURES)),
            leagues: Arc::new(LeagueFixturesCache::new(CachePolicy::LEAGUE_FIXTURES)),
            offers: Arc::new(OffersByFixtureCache::new(CachePolicy::OFFERS_BY_FIXTURE)),
        }
    }
}

impl Default for PricingCaches {
    fn default() -> Self {
        Self::new()
    }
}
