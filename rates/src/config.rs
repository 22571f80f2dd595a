const DAY_MS: u64 = 24 * 60 * 60 * 1000;

#[derive(Clone, Debug)]
pub struct RateConfig {
    /// Upstream rate provider base URL. One endpoint serves all tier-1
    /// symbols in a single call (`/latest?base=EUR&symbols=...`).
    pub api_base_url: String,

    /// How often the background worker refetches tier-1 rates.
    ///
    /// Rates move slowly relative to offers; once a day matches the
    /// provider's update cadence and keeps the worker invisible in the
    /// request-latency profile.
    pub refresh_every_ms: u64,

    /// Age under which the live snapshot is trusted. Past this window
    /// resolution falls through to the last-known-good tier, which has
    /// no window at all: staleness beats unavailability.
    pub freshness_window_ms: u64,

    /// Per-request timeout for the upstream HTTP client.
    pub http_timeout_ms: u64,

    /// Lifetime of cached non-tier-1 pair rates.
    pub exotic_ttl_ms: u64,

    /// Capacity of the non-tier-1 pair cache. Exotic pairs are rare;
    /// this stays small on purpose.
    pub exotic_capacity: usize,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.exchangerate.host".to_string(),
            refresh_every_ms: DAY_MS,
            freshness_window_ms: DAY_MS,
            http_timeout_ms: 5_000,
            exotic_ttl_ms: DAY_MS,
            exotic_capacity: 64,
        }
    }
}

impl RateConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_base_url =
            std::env::var("RATE_API_URL").unwrap_or_else(|_| defaults.api_base_url.clone());

        Self {
            api_base_url,
            refresh_every_ms: env_u64("RATE_REFRESH_EVERY_MS", defaults.refresh_every_ms),
            freshness_window_ms: env_u64("RATE_FRESHNESS_WINDOW_MS", defaults.freshness_window_ms),
            http_timeout_ms: env_u64("RATE_HTTP_TIMEOUT_MS", defaults.http_timeout_ms),
            exotic_ttl_ms: env_u64("RATE_EXOTIC_TTL_MS", defaults.exotic_ttl_ms),
            exotic_capacity: defaults.exotic_capacity,
        }
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
