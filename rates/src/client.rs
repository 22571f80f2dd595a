use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::RateError;

/// HTTP client for the upstream exchange-rate provider.
///
/// Used exclusively by the refresh worker; nothing on the request path
/// holds one of these.
#[derive(Clone)]
pub struct RateClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct LatestEnvelope {
    rates: HashMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct ConvertEnvelope {
    result: f64,
}

impl RateClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, RateError> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Fetch rates from `base` to every requested symbol in one call.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_latest(
        &self,
        base: &str,
        symbols: &[&str],
    ) -> Result<HashMap<String, f64>, RateError> {
        let url = format!(
            "{}/latest?base={}&symbols={}",
            self.base_url,
            base,
            symbols.join(",")
        );

        let resp = self.http.get(&url).send().await?.error_for_status()?;
        let envelope: LatestEnvelope = resp.json().await?;

        if envelope.rates.is_empty() {
            return Err(RateError::InvalidResponse);
        }

        debug!(count = envelope.rates.len(), "latest rates fetched");

        Ok(envelope.rates)
    }

    /// Fetch a single pair rate. Out-of-band use only (exotic pairs).
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_pair(&self, from: &str, to: &str) -> Result<f64, RateError> {
        let url = format!("{}/convert?from={}&to={}", self.base_url, from, to);

        let resp = self.http.get(&url).send().await?.error_for_status()?;
        let envelope: ConvertEnvelope = resp.json().await?;

        if !envelope.result.is_finite() || envelope.result <= 0.0 {
            return Err(RateError::InvalidResponse);
        }

        Ok(envelope.result)
    }
}
