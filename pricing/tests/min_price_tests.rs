use std::collections::HashMap;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::test;
use uuid::Uuid;

use catalog::model::{Currency, Fixture, MinPrice, Offer, OwnerRef, TicketType};
use catalog::store::FixtureStore;
use common::time::now_ms;
use pricing::OfferError;
use pricing::comparator::OfferComparator;
use pricing::min_price::MinPriceSync;
use rates::{ExchangeRateResolver, RateConfig};

mod mock_store;
use mock_store::{InMemoryFixtureStore, InMemoryOfferStore};

fn fixture() -> Fixture {
    Fixture {
        id: Uuid::new_v4(),
        home_team: Uuid::new_v4(),
        away_team: Uuid::new_v4(),
        league: Uuid::new_v4(),
        kickoff_at: Utc.with_ymd_and_hms(2026, 10, 3, 18, 0, 0).unwrap(),
        venue: None,
        min_price: None,
    }
}

fn offer(fixture: &Fixture, price: Decimal, currency: &str) -> Offer {
    let now = Utc::now();
    Offer {
        id: Uuid::new_v4(),
        fixture_id: fixture.id,
        owner: OwnerRef::Supplier(Uuid::new_v4()),
        price,
        currency: currency.parse().unwrap(),
        ticket_type: TicketType::Standard,
        is_available: true,
        note: None,
        url: None,
        created_at: now,
        updated_at: now,
    }
}

fn sync(
    offers: &Arc<InMemoryOfferStore>,
    fixtures: &Arc<InMemoryFixtureStore>,
) -> MinPriceSync<InMemoryOfferStore, InMemoryFixtureStore> {
    let resolver = ExchangeRateResolver::new(&RateConfig::default());

    let mut rates = HashMap::new();
    rates.insert(Currency::eur(), dec!(1));
    rates.insert("USD".parse().unwrap(), dec!(0.92));
    resolver.apply_snapshot(rates, now_ms());

    MinPriceSync::new(
        Arc::clone(fixtures),
        OfferComparator::new(Arc::clone(offers), Arc::new(resolver)),
    )
}

#[test]
async fn min_price_stores_the_winning_offers_own_currency() -> anyhow::Result<()> {
    let offers = Arc::new(InMemoryOfferStore::default());
    let fixtures = Arc::new(InMemoryFixtureStore::default());

    let f = fixture();
    fixtures.seed(f.clone()).await;
    offers.seed(offer(&f, dec!(100), "EUR")).await;
    offers.seed(offer(&f, dec!(90), "USD")).await;

    let sync = sync(&offers, &fixtures);
    let outcome = sync.update_min_price(f.id).await?;

    assert!(outcome.updated);
    assert!(outcome.previous_min_price.is_none());

    // 90 USD wins the EUR comparison but is stored in USD.
    let written = outcome.new_min_price.unwrap();
    assert!(written.matches(dec!(90), &"USD".parse().unwrap()));

    let stored = fixtures.find_by_id(f.id).await?.unwrap().min_price.unwrap();
    assert!(stored.matches(dec!(90), &"USD".parse().unwrap()));

    Ok(())
}

#[test]
async fn second_call_with_no_changes_is_idempotent() -> anyhow::Result<()> {
    let offers = Arc::new(InMemoryOfferStore::default());
    let fixtures = Arc::new(InMemoryFixtureStore::default());

    let f = fixture();
    fixtures.seed(f.clone()).await;
    offers.seed(offer(&f, dec!(75), "EUR")).await;

    let sync = sync(&offers, &fixtures);

    assert!(sync.update_min_price(f.id).await?.updated);

    let second = sync.update_min_price(f.id).await?;
    assert!(!second.updated);
    assert!(second.new_min_price.is_none());
    assert!(
        second
            .previous_min_price
            .unwrap()
            .matches(dec!(75), &Currency::eur())
    );

    Ok(())
}

#[test]
async fn no_offers_unsets_the_field_instead_of_zeroing_it() -> anyhow::Result<()> {
    let offers = Arc::new(InMemoryOfferStore::default());
    let fixtures = Arc::new(InMemoryFixtureStore::default());

    let mut f = fixture();
    f.min_price = Some(MinPrice {
        amount: dec!(60),
        currency: Currency::eur(),
        updated_at: Utc::now(),
    });
    fixtures.seed(f.clone()).await;

    let sync = sync(&offers, &fixtures);
    let outcome = sync.update_min_price(f.id).await?;

    assert!(outcome.updated);
    assert!(outcome.new_min_price.is_none());
    assert!(fixtures.find_by_id(f.id).await?.unwrap().min_price.is_none());

    // Already clear: reported as a no-op.
    let again = sync.update_min_price(f.id).await?;
    assert!(!again.updated);

    Ok(())
}

#[test]
async fn unknown_fixture_is_an_explicit_error() {
    let offers = Arc::new(InMemoryOfferStore::default());
    let fixtures = Arc::new(InMemoryFixtureStore::default());

    let sync = sync(&offers, &fixtures);
    let err = sync.update_min_price(Uuid::new_v4()).await.unwrap_err();

    assert!(matches!(err, OfferError::FixtureNotFound));
}
