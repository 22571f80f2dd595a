use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use tokio::test;
use uuid::Uuid;

use catalog::model::{Currency, Fixture, MinPrice, Offer, OwnerRef, TicketType};
use catalog::store::sqlite_store::SqliteCatalogStore;
use catalog::store::{FixtureStore, OfferStore};

fn sample_fixture() -> Fixture {
    Fixture {
        id: Uuid::new_v4(),
        home_team: Uuid::new_v4(),
        away_team: Uuid::new_v4(),
        league: Uuid::new_v4(),
        kickoff_at: Utc.with_ymd_and_hms(2026, 9, 12, 19, 45, 0).unwrap(),
        venue: Some("Estadio Norte".into()),
        min_price: None,
    }
}

fn sample_offer(fixture: &Fixture) -> Offer {
    let now = Utc::now();
    Offer {
        id: Uuid::new_v4(),
        fixture_id: fixture.id,
        owner: OwnerRef::Agent(Uuid::new_v4()),
        price: dec!(120.50),
        currency: Currency::eur(),
        ticket_type: TicketType::Standard,
        is_available: true,
        note: None,
        url: Some("https://tickets.example/abc".into()),
        created_at: now,
        updated_at: now,
    }
}

async fn mem_store() -> SqliteCatalogStore {
    SqliteCatalogStore::new("sqlite::memory:").await.unwrap()
}

#[test]
async fn offer_round_trips_through_sqlite() -> anyhow::Result<()> {
    let store = mem_store().await;
    let fixture = sample_fixture();
    let offer = sample_offer(&fixture);

    OfferStore::insert(&store, &offer).await?;

    let loaded = OfferStore::find_by_id(&store, offer.id).await?.unwrap();
    assert_eq!(loaded.fixture_id, offer.fixture_id);
    assert_eq!(loaded.owner, offer.owner);
    assert_eq!(loaded.price, dec!(120.50));
    assert_eq!(loaded.currency, Currency::eur());
    assert_eq!(loaded.ticket_type, TicketType::Standard);
    assert!(loaded.is_available);

    Ok(())
}

#[test]
async fn available_query_filters_and_orders_by_price() -> anyhow::Result<()> {
    let store = mem_store().await;
    let fixture = sample_fixture();

    let mut cheap = sample_offer(&fixture);
    cheap.price = dec!(80);

    let mut hidden = sample_offer(&fixture);
    hidden.price = dec!(10);
    hidden.is_available = false;

    let expensive = sample_offer(&fixture);

    OfferStore::insert(&store, &expensive).await?;
    OfferStore::insert(&store, &cheap).await?;
    OfferStore::insert(&store, &hidden).await?;

    let available = store.find_available_by_fixture(fixture.id).await?;
    assert_eq!(available.len(), 2);
    assert_eq!(available[0].price, dec!(80));
    assert_eq!(available[1].price, dec!(120.50));

    let all = store.find_by_fixture(fixture.id).await?;
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].price, dec!(10));

    Ok(())
}

#[test]
async fn delete_for_owner_removes_only_the_matching_triple() -> anyhow::Result<()> {
    let store = mem_store().await;
    let fixture = sample_fixture();

    let standard = sample_offer(&fixture);
    let mut vip = sample_offer(&fixture);
    vip.owner = standard.owner;
    vip.ticket_type = TicketType::Vip;

    OfferStore::insert(&store, &standard).await?;
    OfferStore::insert(&store, &vip).await?;

    let removed = store
        .delete_for_owner(fixture.id, &standard.owner, TicketType::Standard)
        .await?;
    assert_eq!(removed.map(|o| o.id), Some(standard.id));

    // VIP offer for the same owner survives.
    assert!(OfferStore::find_by_id(&store, vip.id).await?.is_some());

    // Second delete is a no-op.
    let removed = store
        .delete_for_owner(fixture.id, &standard.owner, TicketType::Standard)
        .await?;
    assert!(removed.is_none());

    Ok(())
}

#[test]
async fn set_availability_updates_flag() -> anyhow::Result<()> {
    let store = mem_store().await;
    let fixture = sample_fixture();
    let offer = sample_offer(&fixture);

    OfferStore::insert(&store, &offer).await?;

    let updated = store.set_availability(offer.id, false).await?.unwrap();
    assert!(!updated.is_available);

    assert!(store.set_availability(Uuid::new_v4(), true).await?.is_none());

    Ok(())
}

#[test]
async fn fixture_min_price_sets_and_unsets() -> anyhow::Result<()> {
    let store = mem_store().await;
    let fixture = sample_fixture();

    FixtureStore::insert(&store, &fixture).await?;

    let loaded = FixtureStore::find_by_id(&store, fixture.id).await?.unwrap();
    assert!(loaded.min_price.is_none());

    let mp = MinPrice {
        amount: dec!(90),
        currency: "USD".parse().unwrap(),
        updated_at: Utc::now(),
    };
    store.set_min_price(fixture.id, &mp).await?;

    let loaded = FixtureStore::find_by_id(&store, fixture.id).await?.unwrap();
    let stored = loaded.min_price.unwrap();
    assert!(stored.matches(dec!(90), &"USD".parse().unwrap()));

    store.unset_min_price(fixture.id).await?;
    let loaded = FixtureStore::find_by_id(&store, fixture.id).await?.unwrap();
    assert!(loaded.min_price.is_none());

    Ok(())
}

#[test]
async fn fixtures_index_by_team_and_league() -> anyhow::Result<()> {
    let store = mem_store().await;

    let mut home_game = sample_fixture();
    let mut away_game = sample_fixture();
    let other = sample_fixture();

    let team = Uuid::new_v4();
    home_game.home_team = team;
    away_game.away_team = team;
    away_game.league = home_game.league;

    FixtureStore::insert(&store, &home_game).await?;
    FixtureStore::insert(&store, &away_game).await?;
    FixtureStore::insert(&store, &other).await?;

    let by_team = store.find_by_team(team).await?;
    assert_eq!(by_team.len(), 2);

    let by_league = store.find_by_league(home_game.league).await?;
    assert_eq!(by_league.len(), 2);

    Ok(())
}
