//! Multi-stage stock analysis
//!
//! A free-text question goes through a fixed chain of stages:
//!
//! - Ticker extraction from the question (chat model)
//! - News, quote and daily history retrieval (NewsAPI, Finnhub, Yahoo
//!   Finance as history fallback), fetched concurrently per ticker
//! - News sentiment summary (chat model) and local price statistics
//! - A combined financial summary and buy/hold/sell advice (chat model)
//! - A seven-day price prediction that degrades from a model-reasoned
//!   estimate to a momentum formula to the last close
//!
//! Every outbound call honours the run's timeout and cancellation, and
//! every stage reports failure as a typed [`Section`] instead of
//! placeholder text.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use stockwise::{StockConfig, StockPipeline};
//! use stockwise_core::Context;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(StockConfig::from_env()?);
//!     let pipeline = StockPipeline::from_config(config)?;
//!
//!     let run = pipeline
//!         .run("How are Apple and Microsoft doing?", &Context::new())
//!         .await?;
//!     for report in run.reports() {
//!         println!("{}: {:?}", report.ticker, report.prediction.value());
//!     }
//!     Ok(())
//! }
//! ```

pub mod agents;
pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod prompts;
pub mod render;

// Re-export main types for convenience
pub use config::StockConfig;
pub use engine::{AnalysisRun, Report, Section, StockPipeline, TickerOutcome};
pub use error::{FailureKind, Result, StockError};
pub use models::{Confidence, NewsItem, OhlcvSeries, Prediction, PriceQuote, TickerSymbol};
pub use render::{Formatter, FormatterFactory, OutputFormat};
