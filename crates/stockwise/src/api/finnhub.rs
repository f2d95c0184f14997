//! Finnhub market-data client
//!
//! Serves the quote snapshot and the primary daily history. All requests
//! share one `governor` rate limiter sized to the account's per-minute
//! quota.

use crate::error::{Result, StockError};
use crate::models::{OhlcvSeries, PriceQuote, TickerSymbol};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Raw `/quote` payload
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteResponse {
    pub c: Option<f64>,
    pub h: Option<f64>,
    pub l: Option<f64>,
    pub o: Option<f64>,
    pub pc: Option<f64>,
}

impl QuoteResponse {
    /// Validate the payload into a quote
    ///
    /// A zero current price is the provider's signal for an unknown or
    /// unavailable symbol.
    pub fn into_quote(self, symbol: &TickerSymbol) -> Result<PriceQuote> {
        let missing = |field: &str| {
            StockError::MalformedResponse(format!("quote for {symbol} is missing '{field}'"))
        };

        let current = self.c.ok_or_else(|| missing("c"))?;
        if current == 0.0 {
            return Err(StockError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "price data unavailable or invalid ticker".to_string(),
            });
        }

        Ok(PriceQuote {
            symbol: symbol.clone(),
            current,
            high: self.h.ok_or_else(|| missing("h"))?,
            low: self.l.ok_or_else(|| missing("l"))?,
            open: self.o.ok_or_else(|| missing("o"))?,
            previous_close: self.pc.ok_or_else(|| missing("pc"))?,
        })
    }
}

/// Raw `/stock/candle` payload
#[derive(Debug, Clone, Deserialize)]
pub struct CandleResponse {
    pub s: String,
    #[serde(default)]
    pub t: Vec<i64>,
    #[serde(default)]
    pub o: Vec<f64>,
    #[serde(default)]
    pub h: Vec<f64>,
    #[serde(default)]
    pub l: Vec<f64>,
    #[serde(default)]
    pub c: Vec<f64>,
    #[serde(default)]
    pub v: Vec<f64>,
}

impl CandleResponse {
    /// Normalize into a series; any status other than `"ok"` is an error
    pub fn into_series(self, symbol: &TickerSymbol) -> Result<OhlcvSeries> {
        if self.s != "ok" {
            return Err(StockError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: format!("candle status '{}'", self.s),
            });
        }

        let volume = self.v.into_iter().map(|v| v.max(0.0).round() as u64).collect();
        OhlcvSeries::from_columns(self.t, self.o, self.h, self.l, self.c, volume)
    }
}

/// Finnhub REST client
#[derive(Debug, Clone)]
pub struct FinnhubClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
}

impl FinnhubClient {
    /// Create a new Finnhub client with rate limiting
    ///
    /// # Arguments
    /// * `api_key` - Finnhub API key
    /// * `rate_limit` - Requests per minute (free tier: 60)
    pub fn new(api_key: impl Into<String>, rate_limit: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: crate::config::DEFAULT_FINNHUB_API_BASE.to_string(),
            rate_limiter,
        }
    }

    /// Point the client at another base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Bound each HTTP request at the transport level
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    /// Current quote snapshot for `symbol`
    pub async fn quote(&self, symbol: &TickerSymbol) -> Result<PriceQuote> {
        let raw: QuoteResponse = self
            .get_json("quote", &[("symbol", symbol.as_str().to_string())])
            .await?;
        raw.into_quote(symbol)
    }

    /// Daily bars between two unix timestamps (seconds, inclusive)
    pub async fn daily_candles(
        &self,
        symbol: &TickerSymbol,
        from: i64,
        to: i64,
    ) -> Result<OhlcvSeries> {
        let raw: CandleResponse = self
            .get_json(
                "stock/candle",
                &[
                    ("symbol", symbol.as_str().to_string()),
                    ("resolution", "D".to_string()),
                    ("from", from.to_string()),
                    ("to", to.to_string()),
                ],
            )
            .await?;
        raw.into_series(symbol)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/{path}", self.base_url);
        debug!(%url, "Finnhub request");

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("token", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| StockError::ApiError(format!("Finnhub request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(StockError::RateLimitExceeded {
                provider: "finnhub".to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StockError::ApiError(format!(
                "Finnhub API error {status}: {body}"
            )));
        }

        response.json::<T>().await.map_err(|e| {
            StockError::MalformedResponse(format!("Failed to parse Finnhub response: {e}"))
        })
    }
}
