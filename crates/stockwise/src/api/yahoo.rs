//! Yahoo Finance client, the secondary source of daily history

use crate::error::{Result, StockError};
use crate::models::{Bar, OhlcvSeries, TickerSymbol};
use chrono::{DateTime, Utc};
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

/// Yahoo Finance API client
#[derive(Debug, Clone, Copy, Default)]
pub struct YahooFinanceClient;

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self
    }

    /// Daily bars for `symbol` between `start` and `end`
    pub async fn daily_history(
        &self,
        symbol: &TickerSymbol,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<OhlcvSeries> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| StockError::ApiError(format!("Yahoo Finance: {e}")))?;

        let start_odt = to_offset(start)?;
        let end_odt = to_offset(end)?;

        let response = provider
            .get_quote_history(symbol.as_str(), start_odt, end_odt)
            .await
            .map_err(|e| StockError::ApiError(format!("Yahoo Finance: {e}")))?;

        let quotes = response.quotes().map_err(|e| StockError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: format!("Yahoo Finance: {e}"),
        })?;

        Ok(OhlcvSeries::from_bars(
            quotes
                .iter()
                .map(|q| Bar {
                    timestamp: q.timestamp as i64,
                    open: q.open,
                    high: q.high,
                    low: q.low,
                    close: q.close,
                    volume: q.volume,
                })
                .collect(),
        ))
    }
}

fn to_offset(at: DateTime<Utc>) -> Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(at.timestamp())
        .map_err(|e| StockError::Other(format!("Invalid timestamp {at}: {e}")))
}
