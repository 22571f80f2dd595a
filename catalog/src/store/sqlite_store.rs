//! SQLite-backed reference implementation of the catalog stores.
//!
//! Responsible for durable persistence of fixtures and offers so that:
//!
//!  - offers survive restarts and the unique (fixture, owner, ticket
//!    type) constraint is enforced by the schema
//!  - the min-price field can be set and unset independently of the
//!    rest of the fixture record
//!  - the pricing engine operates purely against the store traits

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use std::str::FromStr;

use super::{FixtureStore, OfferStore};
use crate::model::{
    Currency, Fixture, FixtureId, LeagueId, MinPrice, Offer, OfferId, OwnerRef, TeamId, TicketType,
};

/// SQLite persistence backend for fixtures and offers.
pub struct SqliteCatalogStore {
    pool: SqlitePool,
}

impl SqliteCatalogStore {
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect and ensure the schema exists.
    pub async fn new(path: &str) -> anyhow::Result<Self> {
        let pool = SqlitePool::connect(path).await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS fixtures (
                id TEXT PRIMARY KEY,
                home_team TEXT NOT NULL,
                away_team TEXT NOT NULL,
                league TEXT NOT NULL,

                kickoff_at TEXT NOT NULL,
                venue TEXT,

                min_price_amount TEXT,
                min_price_currency TEXT,
                min_price_updated_at TEXT
            );
        "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS offers (
                id TEXT PRIMARY KEY,
                fixture_id TEXT NOT NULL,
                owner_type TEXT NOT NULL,
                owner_id TEXT NOT NULL,

                price TEXT NOT NULL,
                currency TEXT NOT NULL,
                ticket_type TEXT NOT NULL,
                is_available INTEGER NOT NULL,

                note TEXT,
                url TEXT,

                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,

                UNIQUE (fixture_id, owner_id, ticket_type)
            );
        "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

fn parse_ts(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .map_err(|e| anyhow::anyhow!("Invalid timestamp '{}': {}", raw, e))?
        .with_timezone(&Utc))
}

fn offer_from_row(row: &SqliteRow) -> anyhow::Result<Offer> {
    let id_str: String = row.get("id");
    let fixture_str: String = row.get("fixture_id");
    let owner_type: String = row.get("owner_type");
    let owner_id_str: String = row.get("owner_id");

    let price_str: String = row.get("price");
    let currency_str: String = row.get("currency");
    let ticket_str: String = row.get("ticket_type");

    let note: Option<String> = row.get("note");
    let url: Option<String> = row.get("url");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Offer {
        id: uuid::Uuid::parse_str(&id_str)?,
        fixture_id: uuid::Uuid::parse_str(&fixture_str)?,
        owner: OwnerRef::from_parts(&owner_type, uuid::Uuid::parse_str(&owner_id_str)?)?,
        price: Decimal::from_str(&price_str)
            .map_err(|e| anyhow::anyhow!("Invalid price '{}': {}", price_str, e))?,
        currency: Currency::from_str(&currency_str)?,
        ticket_type: TicketType::from_str(&ticket_str)?,
        is_available: row.get::<i64, _>("is_available") != 0,
        note,
        url,
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}

fn fixture_from_row(row: &SqliteRow) -> anyhow::Result<Fixture> {
    let id_str: String = row.get("id");
    let home_str: String = row.get("home_team");
    let away_str: String = row.get("away_team");
    let league_str: String = row.get("league");
    let kickoff: String = row.get("kickoff_at");
    let venue: Option<String> = row.get("venue");

    let min_price = match (
        row.get::<Option<String>, _>("min_price_amount"),
        row.get::<Option<String>, _>("min_price_currency"),
        row.get::<Option<String>, _>("min_price_updated_at"),
    ) {
        (Some(amount), Some(currency), Some(updated_at)) => Some(MinPrice {
            amount: Decimal::from_str(&amount)
                .map_err(|e| anyhow::anyhow!("Invalid min price '{}': {}", amount, e))?,
            currency: Currency::from_str(&currency)?,
            updated_at: parse_ts(&updated_at)?,
        }),
        _ => None,
    };

    Ok(Fixture {
        id: uuid::Uuid::parse_str(&id_str)?,
        home_team: uuid::Uuid::parse_str(&home_str)?,
        away_team: uuid::Uuid::parse_str(&away_str)?,
        league: uuid::Uuid::parse_str(&league_str)?,
        kickoff_at: parse_ts(&kickoff)?,
        venue,
        min_price,
    })
}

#[async_trait]
impl OfferStore for SqliteCatalogStore {
    async fn find_by_id(&self, id: OfferId) -> anyhow::Result<Option<Offer>> {
        let row = sqlx::query("SELECT * FROM offers WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(offer_from_row).transpose()
    }

    async fn find_by_fixture(&self, fixture_id: FixtureId) -> anyhow::Result<Vec<Offer>> {
        let rows = sqlx::query(
            "SELECT * FROM offers WHERE fixture_id = ? ORDER BY CAST(price AS REAL) ASC",
        )
        .bind(fixture_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(offer_from_row).collect()
    }

    async fn find_available_by_fixture(&self, fixture_id: FixtureId) -> anyhow::Result<Vec<Offer>> {
        let rows = sqlx::query(
            "SELECT * FROM offers WHERE fixture_id = ? AND is_available = 1 \
             ORDER BY CAST(price AS REAL) ASC",
        )
        .bind(fixture_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(offer_from_row).collect()
    }

    async fn insert(&self, offer: &Offer) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO offers (
                id, fixture_id, owner_type, owner_id,
                price, currency, ticket_type, is_available,
                note, url, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?);
        "#,
        )
        .bind(offer.id.to_string())
        .bind(offer.fixture_id.to_string())
        .bind(offer.owner.kind())
        .bind(offer.owner.id().to_string())
        .bind(offer.price.to_string())
        .bind(offer.currency.as_str())
        .bind(offer.ticket_type.to_string())
        .bind(offer.is_available as i64)
        .bind(&offer.note)
        .bind(&offer.url)
        .bind(offer.created_at.to_rfc3339())
        .bind(offer.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: OfferId) -> anyhow::Result<Option<Offer>> {
        let existing = OfferStore::find_by_id(self, id).await?;

        if existing.is_some() {
            sqlx::query("DELETE FROM offers WHERE id = ?")
                .bind(id.to_string())
                .execute(&self.pool)
                .await?;
        }

        Ok(existing)
    }

    async fn delete_for_owner(
        &self,
        fixture_id: FixtureId,
        owner: &OwnerRef,
        ticket_type: TicketType,
    ) -> anyhow::Result<Option<Offer>> {
        let row = sqlx::query(
            "SELECT * FROM offers WHERE fixture_id = ? AND owner_id = ? AND ticket_type = ?",
        )
        .bind(fixture_id.to_string())
        .bind(owner.id().to_string())
        .bind(ticket_type.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let Some(existing) = row.as_ref().map(offer_from_row).transpose()? else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM offers WHERE id = ?")
            .bind(existing.id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(Some(existing))
    }

    async fn set_availability(
        &self,
        id: OfferId,
        available: bool,
    ) -> anyhow::Result<Option<Offer>> {
        let result = sqlx::query("UPDATE offers SET is_available = ?, updated_at = ? WHERE id = ?")
            .bind(available as i64)
            .bind(Utc::now().to_rfc3339())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        OfferStore::find_by_id(self, id).await
    }
}

#[async_trait]
impl FixtureStore for SqliteCatalogStore {
    async fn find_by_id(&self, id: FixtureId) -> anyhow::Result<Option<Fixture>> {
        let row = sqlx::query("SELECT * FROM fixtures WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(fixture_from_row).transpose()
    }

    async fn insert(&self, fixture: &Fixture) -> anyhow::Result<()> {
        let (amount, currency, updated_at) = match &fixture.min_price {
            Some(mp) => (
                Some(mp.amount.to_string()),
                Some(mp.currency.as_str().to_string()),
                Some(mp.updated_at.to_rfc3339()),
            ),
            None => (None, None, None),
        };

        sqlx::query(
            r#"
            INSERT INTO fixtures (
                id, home_team, away_team, league,
                kickoff_at, venue,
                min_price_amount, min_price_currency, min_price_updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                home_team = excluded.home_team,
                away_team = excluded.away_team,
                league = excluded.league,
                kickoff_at = excluded.kickoff_at,
                venue = excluded.venue,
                min_price_amount = excluded.min_price_amount,
                min_price_currency = excluded.min_price_currency,
                min_price_updated_at = excluded.min_price_updated_at;
        "#,
        )
        .bind(fixture.id.to_string())
        .bind(fixture.home_team.to_string())
        .bind(fixture.away_team.to_string())
        .bind(fixture.league.to_string())
        .bind(fixture.kickoff_at.to_rfc3339())
        .bind(&fixture.venue)
        .bind(amount)
        .bind(currency)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_team(&self, team_id: TeamId) -> anyhow::Result<Vec<Fixture>> {
        let rows = sqlx::query(
            "SELECT * FROM fixtures WHERE home_team = ? OR away_team = ? ORDER BY kickoff_at ASC",
        )
        .bind(team_id.to_string())
        .bind(team_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(fixture_from_row).collect()
    }

    async fn find_by_league(&self, league_id: LeagueId) -> anyhow::Result<Vec<Fixture>> {
        let rows = sqlx::query("SELECT * FROM fixtures WHERE league = ? ORDER BY kickoff_at ASC")
            .bind(league_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(fixture_from_row).collect()
    }

    async fn set_min_price(&self, id: FixtureId, min_price: &MinPrice) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE fixtures SET min_price_amount = ?, min_price_currency = ?, \
             min_price_updated_at = ? WHERE id = ?",
        )
        .bind(min_price.amount.to_string())
        .bind(min_price.currency.as_str())
        .bind(min_price.updated_at.to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn unset_min_price(&self, id: FixtureId) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE fixtures SET min_price_amount = NULL, min_price_currency = NULL, \
             min_price_updated_at = NULL WHERE id = ?",
        )
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
