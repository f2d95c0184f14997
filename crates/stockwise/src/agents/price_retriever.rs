//! Quote snapshot and daily history for one ticker
//!
//! History comes from an ordered list of sources: the first source that
//! returns a non-empty series wins, and no source is retried.

use crate::api::{FinnhubClient, YahooFinanceClient};
use crate::error::{FailureKind, Result, StockError};
use crate::models::{OhlcvSeries, PriceQuote, TickerSymbol};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use stockwise_core::Context;
use tracing::{debug, warn};

/// Provider of current quote snapshots
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn quote(&self, symbol: &TickerSymbol) -> Result<PriceQuote>;
}

/// Provider of daily OHLCV bars
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Short name used in logs and reports
    fn name(&self) -> &str;

    async fn daily_history(
        &self,
        symbol: &TickerSymbol,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<OhlcvSeries>;
}

#[async_trait]
impl QuoteSource for FinnhubClient {
    async fn quote(&self, symbol: &TickerSymbol) -> Result<PriceQuote> {
        FinnhubClient::quote(self, symbol).await
    }
}

#[async_trait]
impl HistorySource for FinnhubClient {
    fn name(&self) -> &str {
        "finnhub"
    }

    async fn daily_history(
        &self,
        symbol: &TickerSymbol,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<OhlcvSeries> {
        self.daily_candles(symbol, start.timestamp(), end.timestamp())
            .await
    }
}

#[async_trait]
impl HistorySource for YahooFinanceClient {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn daily_history(
        &self,
        symbol: &TickerSymbol,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<OhlcvSeries> {
        YahooFinanceClient::daily_history(self, symbol, start, end).await
    }
}

/// A successful history fetch and the source that served it
#[derive(Debug, Clone, Serialize)]
pub struct HistoryFetch {
    pub series: OhlcvSeries,
    pub source: String,
}

/// Quote and history retrieval with ordered history fallback
pub struct PriceRetriever {
    quotes: Arc<dyn QuoteSource>,
    history: Vec<Arc<dyn HistorySource>>,
}

impl PriceRetriever {
    /// `history` is tried in order
    pub fn new(quotes: Arc<dyn QuoteSource>, history: Vec<Arc<dyn HistorySource>>) -> Self {
        Self { quotes, history }
    }

    /// Current quote; a zero current price is reported as unavailable
    pub async fn fetch_quote(&self, ticker: &TickerSymbol, ctx: &Context) -> Result<PriceQuote> {
        let quote = ctx.guard("quote", self.quotes.quote(ticker)).await??;

        if quote.current == 0.0 {
            return Err(StockError::DataUnavailable {
                symbol: ticker.to_string(),
                reason: "price data unavailable or invalid ticker".to_string(),
            });
        }

        Ok(quote)
    }

    /// Daily bars covering the last `days` days
    pub async fn fetch_history(
        &self,
        ticker: &TickerSymbol,
        days: u32,
        ctx: &Context,
    ) -> Result<HistoryFetch> {
        let end = Utc::now();
        let start = end - chrono::Duration::days(i64::from(days));
        let mut attempts = Vec::with_capacity(self.history.len());

        for source in &self.history {
            let name = source.name();
            let outcome = ctx
                .guard(name, source.daily_history(ticker, start, end))
                .await
                .map_err(StockError::from)
                .and_then(|result| result);

            match outcome {
                Ok(series) if !series.is_empty() => {
                    debug!(%ticker, source = name, bars = series.len(), "Fetched history");
                    return Ok(HistoryFetch {
                        series,
                        source: name.to_string(),
                    });
                }
                Ok(_) => {
                    warn!(%ticker, source = name, "History source returned no bars");
                    attempts.push(format!("{name}: empty series"));
                }
                Err(e) if e.kind() == FailureKind::Cancelled => return Err(e),
                Err(e) => {
                    warn!(%ticker, source = name, error = %e, "History source failed, trying next");
                    attempts.push(format!("{name}: {e}"));
                }
            }
        }

        Err(StockError::HistoryUnavailable {
            symbol: ticker.to_string(),
            attempts,
        })
    }
}
