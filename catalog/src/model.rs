use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type FixtureId = uuid::Uuid;
pub type TeamId = uuid::Uuid;
pub type LeagueId = uuid::Uuid;
pub type OfferId = uuid::Uuid;
pub type AgentId = uuid::Uuid;
pub type SupplierId = uuid::Uuid;

/// ISO currency code, normalized to uppercase.
///
/// The tier-1 set (EUR base plus USD, ILS, GBP) is resolvable without a
/// snapshot via fixed constants; anything else goes through the
/// exotic-pair cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

pub const TIER_ONE_CURRENCIES: [&str; 4] = ["EUR", "USD", "ILS", "GBP"];

/// Base currency all tier-1 rates are stored against.
pub const BASE_CURRENCY: &str = "EUR";

impl Currency {
    pub fn eur() -> Self {
        Currency(BASE_CURRENCY.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_base(&self) -> bool {
        self.0 == BASE_CURRENCY
    }

    pub fn is_tier_one(&self) -> bool {
        TIER_ONE_CURRENCIES.contains(&self.0.as_str())
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
            anyhow::bail!("Invalid currency code: {}", s);
        }
        Ok(Currency(code))
    }
}

impl TryFrom<String> for Currency {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Currency> for String {
    fn from(c: Currency) -> String {
        c.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketType {
    Standard,
    Vip,
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TicketType::Standard => "standard",
            TicketType::Vip => "vip",
        };
        f.write_str(s)
    }
}

impl FromStr for TicketType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(TicketType::Standard),
            "vip" => Ok(TicketType::Vip),
            other => Err(anyhow::anyhow!("Invalid ticket type: {}", other)),
        }
    }
}

/// Who is selling an offer. Each kind is handled exhaustively; there is
/// no runtime type-name branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "owner_type", content = "owner_id")]
pub enum OwnerRef {
    Agent(AgentId),
    Supplier(SupplierId),
}

impl OwnerRef {
    pub fn kind(&self) -> &'static str {
        match self {
            OwnerRef::Agent(_) => "Agent",
            OwnerRef::Supplier(_) => "Supplier",
        }
    }

    pub fn id(&self) -> uuid::Uuid {
        match self {
            OwnerRef::Agent(id) => *id,
            OwnerRef::Supplier(id) => *id,
        }
    }

    pub fn from_parts(kind: &str, id: uuid::Uuid) -> anyhow::Result<Self> {
        match kind {
            "Agent" => Ok(OwnerRef::Agent(id)),
            "Supplier" => Ok(OwnerRef::Supplier(id)),
            other => Err(anyhow::anyhow!("Invalid owner type: {}", other)),
        }
    }
}

impl fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

/// A sellable ticket listing for a fixture.
///
/// At most one current offer exists per (fixture, owner, ticket type);
/// creating a new one supersedes the prior row. Only `is_available`
/// offers participate in price computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub fixture_id: FixtureId,
    pub owner: OwnerRef,

    pub price: Decimal,
    pub currency: Currency,
    pub ticket_type: TicketType,
    pub is_available: bool,

    pub note: Option<String>,
    pub url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Denormalized cheapest-available-offer field on a fixture.
///
/// Expressed in the winning offer's own currency; the base currency is
/// only the comparison unit. Absent entirely when no available offers
/// exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinPrice {
    pub amount: Decimal,
    pub currency: Currency,
    pub updated_at: DateTime<Utc>,
}

impl MinPrice {
    /// Compares the price pair only; `updated_at` is bookkeeping.
    pub fn matches(&self, amount: Decimal, currency: &Currency) -> bool {
        self.amount == amount && &self.currency == currency
    }
}

/// A scheduled match between two teams.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub id: FixtureId,
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub league: LeagueId,

    pub kickoff_at: DateTime<Utc>,
    pub venue: Option<String>,

    /// Written exclusively by the min-price synchronizer.
    pub min_price: Option<MinPrice>,
}
