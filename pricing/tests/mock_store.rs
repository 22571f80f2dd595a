use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use catalog::model::{
    Fixture, FixtureId, LeagueId, MinPrice, Offer, OfferId, OwnerRef, TeamId, TicketType,
};
use catalog::store::{FixtureStore, OfferStore};

#[derive(Default)]
pub struct InMemoryOfferStore {
    pub map: Arc<Mutex<HashMap<OfferId, Offer>>>,
}

impl InMemoryOfferStore {
    pub async fn seed(&self, offer: Offer) {
        self.map.lock().await.insert(offer.id, offer);
    }
}

#[async_trait]
impl OfferStore for InMemoryOfferStore {
    async fn find_by_id(&self, id: OfferId) -> anyhow::Result<Option<Offer>> {
        Ok(self.map.lock().await.get(&id).cloned())
    }

    async fn find_by_fixture(&self, fixture_id: FixtureId) -> anyhow::Result<Vec<Offer>> {
        let mut offers: Vec<Offer> = self
            .map
            .lock()
            .await
            .values()
            .filter(|o| o.fixture_id == fixture_id)
            .cloned()
            .collect();
        offers.sort_by(|a, b| a.price.cmp(&b.price));
        Ok(offers)
    }

    async fn find_available_by_fixture(&self, fixture_id: FixtureId) -> anyhow::Result<Vec<Offer>> {
        let mut offers = self.find_by_fixture(fixture_id).await?;
        offers.retain(|o| o.is_available);
        Ok(offers)
    }

    async fn insert(&self, offer: &Offer) -> anyhow::Result<()> {
        self.map.lock().await.insert(offer.id, offer.clone());
        Ok(())
    }

    async fn delete(&self, id: OfferId) -> anyhow::Result<Option<Offer>> {
        Ok(self.map.lock().await.remove(&id))
    }

    async fn delete_for_owner(
        &self,
        fixture_id: FixtureId,
        owner: &OwnerRef,
        ticket_type: TicketType,
    ) -> anyhow::Result<Option<Offer>> {
        let mut map = self.map.lock().await;
        let existing = map
            .values()
            .find(|o| {
                o.fixture_id == fixture_id
                    && o.owner.id() == owner.id()
                    && o.ticket_type == ticket_type
            })
            .map(|o| o.id);

        Ok(existing.and_then(|id| map.remove(&id)))
    }

    async fn set_availability(
        &self,
        id: OfferId,
        available: bool,
    ) -> anyhow::Result<Option<Offer>> {
        let mut map = self.map.lock().await;
        match map.get_mut(&id) {
            Some(offer) => {
                offer.is_available = available;
                Ok(Some(offer.clone()))
            }
            None => Ok(None),
        }
    }
}

#[derive(Default)]
pub struct InMemoryFixtureStore {
    pub map: Arc<Mutex<HashMap<FixtureId, Fixture>>>,
    /// When set, team/league index queries fail; used to exercise the
    /// cascade's best-effort steps.
    pub fail_index_queries: Arc<AtomicBool>,
}

impl InMemoryFixtureStore {
    pub async fn seed(&self, fixture: Fixture) {
        self.map.lock().await.insert(fixture.id, fixture);
    }
}

#[async_trait]
impl FixtureStore for InMemoryFixtureStore {
    async fn find_by_id(&self, id: FixtureId) -> anyhow::Result<Option<Fixture>> {
        Ok(self.map.lock().await.get(&id).cloned())
    }

    async fn insert(&self, fixture: &Fixture) -> anyhow::Result<()> {
        self.map.lock().await.insert(fixture.id, fixture.clone());
        Ok(())
    }

    async fn find_by_team(&self, team_id: TeamId) -> anyhow::Result<Vec<Fixture>> {
        if self.fail_index_queries.load(Ordering::SeqCst) {
            anyhow::bail!("index queries disabled");
        }
        Ok(self
            .map
            .lock()
            .await
            .values()
            .filter(|f| f.home_team == team_id || f.away_team == team_id)
            .cloned()
            .collect())
    }

    async fn find_by_league(&self, league_id: LeagueId) -> anyhow::Result<Vec<Fixture>> {
        if self.fail_index_queries.load(Ordering::SeqCst) {
            anyhow::bail!("index queries disabled");
        }
        Ok(self
            .map
            .lock()
            .await
            .values()
            .filter(|f| f.league == league_id)
            .cloned()
            .collect())
    }

    async fn set_min_price(&self, id: FixtureId, min_price: &MinPrice) -> anyhow::Result<()> {
        let mut map = self.map.lock().await;
        let fixture = map
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("Fixture not found"))?;
        fixture.min_price = Some(min_price.clone());
        Ok(())
    }

    async fn unset_min_price(&self, id: FixtureId) -> anyhow::Result<()> {
        let mut map = self.map.lock().await;
        let fixture = map
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("Fixture not found"))?;
        fixture.min_price = None;
        Ok(())
    }
}
