//! API clients for market data and news providers

pub mod finnhub;
pub mod news_api;
pub mod yahoo;

pub use finnhub::{CandleResponse, FinnhubClient, QuoteResponse};
pub use news_api::NewsApiClient;
pub use yahoo::YahooFinanceClient;
