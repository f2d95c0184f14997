//! In-memory providers and data sources for unit tests

use super::news_retriever::NewsSource;
use super::price_retriever::{HistorySource, QuoteSource};
use crate::error::{Result, StockError};
use crate::models::{Bar, NewsItem, OhlcvSeries, PriceQuote, TickerSymbol};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use stockwise_llm::{
    CompletionRequest, CompletionResponse, LLMError, LLMProvider, Message, StopReason, TokenUsage,
};

fn reply(text: &str) -> CompletionResponse {
    CompletionResponse {
        message: Message::assistant(text),
        stop_reason: StopReason::EndTurn,
        usage: TokenUsage {
            input_tokens: 10,
            output_tokens: 5,
        },
    }
}

/// Replies chosen by a substring of the system prompt
pub(crate) struct ScriptedProvider {
    rules: Vec<(String, String)>,
    fallback: Option<String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    /// Same reply to every request
    pub fn always(text: &str) -> Self {
        Self {
            rules: Vec::new(),
            fallback: Some(text.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// First rule whose needle occurs in the system prompt wins
    pub fn by_system(rules: &[(&str, &str)]) -> Self {
        Self {
            rules: rules
                .iter()
                .map(|(needle, text)| ((*needle).to_string(), (*text).to_string()))
                .collect(),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest) -> stockwise_llm::Result<CompletionResponse> {
        let system = request.system.clone().unwrap_or_default();
        self.requests.lock().unwrap().push(request);

        self.rules
            .iter()
            .find(|(needle, _)| system.contains(needle.as_str()))
            .map(|(_, text)| text.as_str())
            .or(self.fallback.as_deref())
            .map(reply)
            .ok_or_else(|| LLMError::RequestFailed("no scripted reply".to_string()))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Fails every request with a transport error
pub(crate) struct FailingProvider;

#[async_trait]
impl LLMProvider for FailingProvider {
    async fn complete(&self, _request: CompletionRequest) -> stockwise_llm::Result<CompletionResponse> {
        Err(LLMError::RequestFailed("connection refused".to_string()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

pub(crate) fn sample_quote(symbol: &str) -> PriceQuote {
    PriceQuote {
        symbol: TickerSymbol::parse(symbol).unwrap(),
        current: 150.0,
        high: 152.0,
        low: 147.5,
        open: 148.0,
        previous_close: 149.0,
    }
}

/// `n` daily bars with closes evenly spaced from `first` to `last`
pub(crate) fn linear_series(n: usize, first: f64, last: f64) -> OhlcvSeries {
    let step = if n > 1 {
        (last - first) / (n - 1) as f64
    } else {
        0.0
    };
    let bars = (0..n)
        .map(|i| {
            let close = first + step * i as f64;
            Bar {
                timestamp: 1_700_000_000 + 86_400 * i as i64,
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000,
            }
        })
        .collect();
    OhlcvSeries::from_bars(bars)
}

pub(crate) struct StubQuotes {
    quote: Option<PriceQuote>,
}

impl StubQuotes {
    pub fn fixed(quote: PriceQuote) -> Self {
        Self { quote: Some(quote) }
    }

    pub fn failing() -> Self {
        Self { quote: None }
    }
}

#[async_trait]
impl QuoteSource for StubQuotes {
    async fn quote(&self, symbol: &TickerSymbol) -> Result<PriceQuote> {
        match &self.quote {
            Some(quote) => Ok(PriceQuote {
                symbol: symbol.clone(),
                ..quote.clone()
            }),
            None => Err(StockError::ApiError("quote endpoint down".to_string())),
        }
    }
}

enum HistoryBehavior {
    Serve(OhlcvSeries),
    NoData,
    Fail,
    Hang,
}

/// Named history source counting its calls
pub(crate) struct StubHistory {
    name: String,
    behavior: HistoryBehavior,
    calls: AtomicUsize,
}

impl StubHistory {
    fn with(name: &str, behavior: HistoryBehavior) -> Self {
        Self {
            name: name.to_string(),
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn serving(name: &str, series: OhlcvSeries) -> Self {
        Self::with(name, HistoryBehavior::Serve(series))
    }

    /// Answers with a provider-side "no data" status
    pub fn no_data(name: &str) -> Self {
        Self::with(name, HistoryBehavior::NoData)
    }

    pub fn failing(name: &str) -> Self {
        Self::with(name, HistoryBehavior::Fail)
    }

    /// Never answers
    pub fn hanging(name: &str) -> Self {
        Self::with(name, HistoryBehavior::Hang)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HistorySource for StubHistory {
    fn name(&self) -> &str {
        &self.name
    }

    async fn daily_history(
        &self,
        symbol: &TickerSymbol,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<OhlcvSeries> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            HistoryBehavior::Serve(series) => Ok(series.clone()),
            HistoryBehavior::NoData => Err(StockError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "no_data".to_string(),
            }),
            HistoryBehavior::Fail => Err(StockError::ApiError("history endpoint down".to_string())),
            HistoryBehavior::Hang => std::future::pending().await,
        }
    }
}

enum NewsBehavior {
    Items(Vec<NewsItem>),
    Fail,
    Hang,
}

pub(crate) struct StubNews {
    behavior: NewsBehavior,
}

impl StubNews {
    pub fn items(items: &[(&str, &str)]) -> Self {
        Self {
            behavior: NewsBehavior::Items(
                items
                    .iter()
                    .map(|(title, source)| NewsItem::new(*title, *source))
                    .collect(),
            ),
        }
    }

    pub fn failing() -> Self {
        Self {
            behavior: NewsBehavior::Fail,
        }
    }

    pub fn hanging() -> Self {
        Self {
            behavior: NewsBehavior::Hang,
        }
    }
}

#[async_trait]
impl NewsSource for StubNews {
    async fn headlines(&self, _symbol: &TickerSymbol, page_size: u32) -> Result<Vec<NewsItem>> {
        match &self.behavior {
            NewsBehavior::Items(items) => Ok(items.iter().take(page_size as usize).cloned().collect()),
            NewsBehavior::Fail => Err(StockError::ApiError("news endpoint down".to_string())),
            NewsBehavior::Hang => std::future::pending().await,
        }
    }
}
