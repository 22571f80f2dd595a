//! Cache invalidation cascade.
//!
//! Runs only after a reported min-price change. Refresh is always
//! delete-then-reload from the system of record, never in-place
//! patching, so the reloaded entry reflects every field. Each step is
//! independently best-effort: a failed reload leaves that entry cold
//! and the next TTL expiry or read-through heals it.

use std::sync::Arc;

use tracing::{info, warn};

use catalog::model::Fixture;
use catalog::store::FixtureStore;

use crate::caches::{LeagueFixturesCache, OffersByFixtureCache, TeamFixturesCache};
use crate::types::{CascadeReport, LeagueFilter};

pub struct InvalidationCascade<F: FixtureStore> {
    fixtures: Arc<F>,
    teams: Arc<TeamFixturesCache>,
    leagues: Arc<LeagueFixturesCache>,
    offers: Arc<OffersByFixtureCache>,
}

impl<F: FixtureStore> InvalidationCascade<F> {
    pub fn new(
        fixtures: Arc<F>,
        teams: Arc<TeamFixturesCache>,
        leagues: Arc<LeagueFixturesCache>,
        offers: Arc<OffersByFixtureCache>,
    ) -> Self {
        Self {
            fixtures,
            teams,
            leagues,
            offers,
        }
    }

    pub async fn run(&self, fixture: &Fixture) -> CascadeReport {
        let mut report = CascadeReport::default();

        // Both teams' fixture lists carry the changed min price.
        for team in [fixture.home_team, fixture.away_team] {
            self.teams.delete(team);

            match self.fixtures.find_by_team(team).await {
                Ok(fresh) => {
                    self.teams.set(team, fresh);
                    report.teams_refreshed += 1;
                }
                Err(e) => {
                    warn!(%team, error = %e, "team fixtures reload failed; entry stays cold");
                }
            }
        }

        // Every outstanding filter variant for the league goes; the
        // unfiltered entry is reloaded eagerly, variants on demand.
        self.leagues.delete_league(fixture.league);

        match self.fixtures.find_by_league(fixture.league).await {
            Ok(fresh) => {
                self.leagues
                    .set(fixture.league, &LeagueFilter::default(), fresh);
                report.league_refreshed = true;
            }
            Err(e) => {
                warn!(league = %fixture.league, error = %e, "league fixtures reload failed");
            }
        }

        // The fixture's own offer pages repopulate lazily on next read.
        report.offer_variants_dropped = self.offers.delete(fixture.id);

        info!(
            fixture = %fixture.id,
            teams_refreshed = report.teams_refreshed,
            league_refreshed = report.league_refreshed,
            offer_variants_dropped = report.offer_variants_dropped,
            "invalidation cascade finished"
        );

        report
    }
}
