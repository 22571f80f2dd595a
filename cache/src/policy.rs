//! Capacity/TTL policies for the cache domains.
//!
//! The three domains trade volatility against value differently:
//! schedule data (team/league fixtures) is large but slow-moving, offer
//! lists are the most volatile so they get the shortest TTL.

/// Capacity and TTL for one cache instance.
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    /// Max entries held in memory.
    pub capacity: usize,
    /// Lifetime of an entry after insertion or the latest read.
    pub ttl_ms: u64,
}

const HOUR_MS: u64 = 60 * 60 * 1000;
const MINUTE_MS: u64 = 60 * 1000;

impl CachePolicy {
    /// Fixtures keyed by team: hundreds of teams, hour-scale TTL.
    pub const TEAM_FIXTURES: CachePolicy = CachePolicy {
        capacity: 500,
        ttl_ms: HOUR_MS,
    };

    /// Fixtures keyed by league (all filter variants): tens of leagues.
    pub const LEAGUE_FIXTURES: CachePolicy = CachePolicy {
        capacity: 200,
        ttl_ms: HOUR_MS,
    };

    /// Offer lists keyed by fixture: prices change far more often than
    /// schedules, so the TTL is minutes.
    pub const OFFERS_BY_FIXTURE: CachePolicy = CachePolicy {
        capacity: 1000,
        ttl_ms: 15 * MINUTE_MS,
    };
}
