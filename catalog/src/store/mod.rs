pub mod sqlite_store;

use crate::model::{Fixture, FixtureId, LeagueId, MinPrice, Offer, OfferId, OwnerRef, TeamId, TicketType};

/// Persistent store for offers.
///
/// Implementations own schema/CRUD mechanics; the pricing engine only
/// depends on this surface.
#[async_trait::async_trait]
pub trait OfferStore: Send + Sync {
    async fn find_by_id(&self, id: OfferId) -> anyhow::Result<Option<Offer>>;

    /// Every offer for the fixture, available or not, cheapest first by
    /// raw (unconverted) price.
    async fn find_by_fixture(&self, fixture_id: FixtureId) -> anyhow::Result<Vec<Offer>>;

    /// Only `is_available` offers participate in price computation.
    async fn find_available_by_fixture(&self, fixture_id: FixtureId) -> anyhow::Result<Vec<Offer>>;

    async fn insert(&self, offer: &Offer) -> anyhow::Result<()>;

    /// Delete by id, returning the removed offer if it existed.
    async fn delete(&self, id: OfferId) -> anyhow::Result<Option<Offer>>;

    /// Remove the current offer for (fixture, owner, ticket type), if
    /// any. Used to supersede on re-submission.
    async fn delete_for_owner(
        &self,
        fixture_id: FixtureId,
        owner: &OwnerRef,
        ticket_type: TicketType,
    ) -> anyhow::Result<Option<Offer>>;

    async fn set_availability(&self, id: OfferId, available: bool)
    -> anyhow::Result<Option<Offer>>;
}

/// Persistent store for fixtures.
#[async_trait::async_trait]
pub trait FixtureStore: Send + Sync {
    async fn find_by_id(&self, id: FixtureId) -> anyhow::Result<Option<Fixture>>;

    async fn insert(&self, fixture: &Fixture) -> anyhow::Result<()>;

    async fn find_by_team(&self, team_id: TeamId) -> anyhow::Result<Vec<Fixture>>;

    async fn find_by_league(&self, league_id: LeagueId) -> anyhow::Result<Vec<Fixture>>;

    /// Write the denormalized min-price field.
    async fn set_min_price(&self, id: FixtureId, min_price: &MinPrice) -> anyhow::Result<()>;

    /// Remove the field entirely; a fixture without available offers
    /// carries no min-price, not a zero one.
    async fn unset_min_price(&self, id: FixtureId) -> anyhow::Result<()>;
}
