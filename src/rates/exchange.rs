//! PEN-per-USD exchange quotes used by the subsidy band lookup
//!
//! The subsidy calculator never fetches quotes itself: callers resolve a buy
//! rate through an [`ExchangeRateProvider`] and inject the number.

use std::future::Future;
use std::time::Duration;

use log::{error, info};
use serde::Deserialize;

use crate::error::{Result, SimulationError};

/// Default SBS average quote endpoint
pub const DEFAULT_DECOLECTA_URL: &str = "https://api.decolecta.com/v1/tipo-cambio/sbs/average";

/// Source of PEN-per-USD buy quotes
pub trait ExchangeRateProvider: Sync {
    /// Current buy rate (soles per dollar).
    ///
    /// Fails with `RateUnavailable`; implementations must not substitute a
    /// default quote.
    fn buy_rate(&self) -> impl Future<Output = Result<f64>> + Send;
}

/// A quote known up front (CLI override, tests, PEN-only batches)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedExchangeRate(pub f64);

impl ExchangeRateProvider for FixedExchangeRate {
    async fn buy_rate(&self) -> Result<f64> {
        validate_quote(self.0)
    }
}

/// Raw quote body returned by the SBS average endpoint
#[derive(Debug, Deserialize)]
struct QuoteResponse {
    buy_price: String,
    sell_price: String,
    #[serde(default)]
    date: Option<String>,
}

/// HTTP client for the Decolecta SBS exchange-rate service
#[derive(Debug, Clone)]
pub struct DecolectaClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl DecolectaClient {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SimulationError::RateUnavailable(e.to_string()))?;

        Ok(Self {
            http,
            url: url.into(),
            api_key: api_key.into(),
        })
    }

    /// Build from `API_KEY_DECOLECTA` and optional `DECOLECTA_URL`
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("API_KEY_DECOLECTA").map_err(|_| {
            SimulationError::RateUnavailable("API_KEY_DECOLECTA is not set".to_string())
        })?;
        let url =
            std::env::var("DECOLECTA_URL").unwrap_or_else(|_| DEFAULT_DECOLECTA_URL.to_string());
        Self::new(url, api_key)
    }

    async fn fetch_quote(&self) -> Result<QuoteResponse> {
        info!("Fetching exchange rate from {}", self.url);

        let response = self
            .http
            .get(&self.url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                error!("Exchange rate request failed: {}", e);
                SimulationError::RateUnavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("Exchange rate service answered {}", status);
            return Err(SimulationError::RateUnavailable(format!(
                "exchange rate service answered {}",
                status
            )));
        }

        response
            .json::<QuoteResponse>()
            .await
            .map_err(|e| SimulationError::RateUnavailable(format!("malformed quote: {}", e)))
    }
}

impl ExchangeRateProvider for DecolectaClient {
    async fn buy_rate(&self) -> Result<f64> {
        let quote = self.fetch_quote().await?;
        let buy = parse_price(&quote.buy_price)?;
        info!(
            "Exchange rate quote: buy={} sell={} date={}",
            buy,
            quote.sell_price,
            quote.date.as_deref().unwrap_or("-")
        );
        validate_quote(buy)
    }
}

fn parse_price(raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| SimulationError::RateUnavailable(format!("unparsable price '{}'", raw)))
}

pub(crate) fn validate_quote(rate: f64) -> Result<f64> {
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(SimulationError::RateUnavailable(format!(
            "quote must be a positive number, got {}",
            rate
        )))
    }
}
