//! Pipeline stages
//!
//! Retrievers wrap the data sources, analysts and the reporter turn data
//! into text, and the predictor and final answer close the chain. Every
//! model-backed stage is a [`ChatAgent`] with its own system prompt.

pub mod chat;
pub mod final_answer;
pub mod financial_reporter;
pub mod news_analyst;
pub mod news_retriever;
pub mod price_analyst;
pub mod price_predictor;
pub mod price_retriever;
pub mod ticker_extractor;

#[cfg(test)]
pub(crate) mod stubs;

pub use chat::{ChatAgent, ChatConfig};
pub use final_answer::FinalAnswer;
pub use financial_reporter::FinancialReporter;
pub use news_analyst::{NO_NEWS_SUMMARY, NewsAnalyst};
pub use news_retriever::{NewsRetriever, NewsSource};
pub use price_analyst::{PriceAnalyst, PriceSummary, Trend};
pub use price_predictor::{
    Indicators, LastPrice, ModelReasoned, MomentumFormula, PredictionInput, PredictionTier,
    PricePredictor,
};
pub use price_retriever::{HistoryFetch, HistorySource, PriceRetriever, QuoteSource};
pub use ticker_extractor::{TickerExtractor, parse_tickers};
