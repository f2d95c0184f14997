//! Query-to-report pipeline
//!
//! Per ticker, news, quote and history are fetched concurrently and joined.
//! The analysts then run, followed by the reporter and final answer in
//! parallel with the predictor. Only a quote failure aborts a ticker; every
//! other failure is recorded in its report section.

use super::report::{AnalysisRun, Report, Section, TickerOutcome};
use crate::agents::{
    ChatAgent, ChatConfig, FinalAnswer, FinancialReporter, HistorySource, NewsAnalyst,
    NewsRetriever, NewsSource, PriceAnalyst, PricePredictor, PriceRetriever, QuoteSource,
    TickerExtractor,
};
use crate::api::{FinnhubClient, NewsApiClient, YahooFinanceClient};
use crate::config::StockConfig;
use crate::error::{FailureKind, Result, StockError};
use crate::models::TickerSymbol;
use crate::prompts;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use stockwise_core::Context;
use stockwise_llm::LLMProvider;
use stockwise_llm::providers::{GroqConfig, GroqProvider};
use tracing::{info, instrument, warn};

/// Placeholder fed to the reporter when news analysis failed
const NEWS_FALLBACK: &str = "News analysis unavailable";

/// Placeholder fed to the reporter when price analysis failed
const PRICE_FALLBACK: &str = "Price analysis unavailable";

/// The full multi-stage analysis
pub struct StockPipeline {
    config: Arc<StockConfig>,
    extractor: TickerExtractor,
    news: NewsRetriever,
    prices: PriceRetriever,
    news_analyst: NewsAnalyst,
    reporter: FinancialReporter,
    predictor: PricePredictor,
    advisor: FinalAnswer,
}

impl StockPipeline {
    pub fn builder() -> StockPipelineBuilder {
        StockPipelineBuilder::new()
    }

    /// Wire the production clients from `config`
    ///
    /// Finnhub serves quotes and primary history, Yahoo Finance is the
    /// history fallback, and NewsAPI supplies headlines.
    pub fn from_config(config: Arc<StockConfig>) -> Result<Self> {
        let provider = GroqProvider::with_config(
            GroqConfig::new(config.groq_api_key.clone())
                .with_api_base(config.groq_api_base.clone())
                .with_timeout(config.request_timeout.as_secs().max(1)),
        )?;

        let finnhub = Arc::new(
            FinnhubClient::new(config.finnhub_api_key.clone(), config.finnhub_rate_limit)
                .with_base_url(config.finnhub_api_base.clone())
                .with_timeout(config.request_timeout)?,
        );

        let news = NewsApiClient::new(config.news_api_key.clone())
            .with_base_url(config.news_api_base.clone())
            .with_timeout(config.request_timeout)?;

        Self::builder()
            .provider(Arc::new(provider))
            .quote_source(finnhub.clone())
            .history_source(finnhub)
            .history_source(Arc::new(YahooFinanceClient::new()))
            .news_source(Arc::new(news))
            .config(config)
            .build()
    }

    pub fn config(&self) -> &StockConfig {
        &self.config
    }

    /// Extract tickers from `query` and analyze each of them
    ///
    /// Fails only when no ticker is found or the run is cancelled during
    /// extraction. Per-ticker failures are reported in the outcomes, in
    /// extraction order.
    #[instrument(skip(self, ctx), fields(request_id = ctx.request_id().unwrap_or_default()))]
    pub async fn run(&self, query: &str, ctx: &Context) -> Result<AnalysisRun> {
        let started_at = Utc::now();
        let mut ctx = ctx.clone().with_query(query);
        if ctx.call_timeout().is_none() {
            ctx = ctx.with_call_timeout(self.config.request_timeout);
        }

        let tickers = self.extractor.extract(query, &ctx).await;
        if ctx.cancellation().is_cancelled() {
            return Err(StockError::Cancelled("ticker extraction".to_string()));
        }
        if tickers.is_empty() {
            return Err(StockError::NoTickers(query.to_string()));
        }
        info!(tickers = ?tickers, "Extracted tickers");

        let outcomes = stream::iter(tickers.iter().cloned())
            .map(|ticker| self.analyze_ticker(ticker, &ctx))
            .buffered(self.config.max_concurrent_tickers.max(1))
            .collect::<Vec<_>>()
            .await;

        Ok(AnalysisRun {
            request_id: ctx.request_id().map(str::to_string),
            query: query.to_string(),
            tickers,
            outcomes,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Full analysis of one ticker
    #[instrument(skip(self, ctx))]
    pub async fn analyze_ticker(&self, ticker: TickerSymbol, ctx: &Context) -> TickerOutcome {
        let ctx = ctx.clone().with_ticker(ticker.as_str());

        let (news, quote, history) = tokio::join!(
            self.news.fetch_news(&ticker, &ctx),
            self.prices.fetch_quote(&ticker, &ctx),
            self.prices
                .fetch_history(&ticker, self.config.history_days, &ctx),
        );

        let quote = match quote {
            Ok(quote) => quote,
            Err(e) => {
                warn!(%ticker, error = %e, "Quote unavailable, skipping ticker");
                return TickerOutcome::Failed {
                    ticker,
                    kind: e.kind(),
                    message: e.to_string(),
                };
            }
        };

        let (history, history_source) = Report::history_parts(history);
        let news = Section::from_result(news);

        let news_analysis = match &news {
            Section::Ready { value } => {
                Section::from_result(self.news_analyst.summarize(value, &ctx).await)
            }
            Section::Failed { kind, message } => {
                Section::failed(*kind, format!("no headlines to analyze: {message}"))
            }
        };

        let closes = if history.is_empty() {
            quote.snapshot_points().to_vec()
        } else {
            history.close().to_vec()
        };
        let price_analysis = Section::from_result(PriceAnalyst::summarize(&closes));

        let news_text = news_analysis.text_or(NEWS_FALLBACK);
        let price_text = price_analysis.text_or(PRICE_FALLBACK);

        let reporting = async {
            match self.reporter.combine(&news_text, &price_text, &ctx).await {
                Ok(report) => {
                    let advice = Section::from_result(self.advisor.advise(&report, &ctx).await);
                    (Section::ready(report), advice)
                }
                Err(e) => {
                    let advice =
                        Section::failed(e.kind(), format!("no financial report to advise on: {e}"));
                    (Section::from_error(&e), advice)
                }
            }
        };

        let predicting = async {
            if ctx.cancellation().is_cancelled() {
                Section::failed(FailureKind::Cancelled, "prediction was cancelled")
            } else if history.is_empty() {
                Section::failed(FailureKind::NoData, "no daily history to predict from")
            } else {
                Section::ready(
                    self.predictor
                        .predict(&history, &news_text, &ticker, &ctx)
                        .await,
                )
            }
        };

        let ((financial_report, advice), prediction) = tokio::join!(reporting, predicting);

        TickerOutcome::Analyzed {
            report: Box::new(Report {
                ticker,
                quote,
                history,
                history_source,
                news,
                news_analysis,
                price_analysis,
                financial_report,
                prediction,
                advice,
                generated_at: Utc::now(),
            }),
        }
    }
}

/// Builder for [`StockPipeline`]
pub struct StockPipelineBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    quotes: Option<Arc<dyn QuoteSource>>,
    history: Vec<Arc<dyn HistorySource>>,
    news: Option<Arc<dyn NewsSource>>,
    config: Arc<StockConfig>,
}

impl StockPipelineBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            quotes: None,
            history: Vec::new(),
            news: None,
            config: Arc::new(StockConfig::default()),
        }
    }

    /// Set the chat-completion provider used by every model-backed stage
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn quote_source(mut self, source: Arc<dyn QuoteSource>) -> Self {
        self.quotes = Some(source);
        self
    }

    /// Append a history source; sources are tried in the order added
    pub fn history_source(mut self, source: Arc<dyn HistorySource>) -> Self {
        self.history.push(source);
        self
    }

    pub fn news_source(mut self, source: Arc<dyn NewsSource>) -> Self {
        self.news = Some(source);
        self
    }

    pub fn config(mut self, config: Arc<StockConfig>) -> Self {
        self.config = config;
        self
    }

    /// Build the pipeline
    ///
    /// # Errors
    ///
    /// Returns an error if the provider, quote source, news source or every
    /// history source is missing
    pub fn build(self) -> Result<StockPipeline> {
        let missing = |what: &str| StockError::ConfigError(format!("{what} not set"));

        let provider = self.provider.ok_or_else(|| missing("LLM provider"))?;
        let quotes = self.quotes.ok_or_else(|| missing("Quote source"))?;
        let news = self.news.ok_or_else(|| missing("News source"))?;
        if self.history.is_empty() {
            return Err(missing("History source"));
        }

        let config = self.config;
        let chat = |system: &str, name: &str| {
            ChatAgent::new(
                provider.clone(),
                ChatConfig::analysis(&config, system),
                name,
            )
        };

        let extractor = TickerExtractor::new(ChatAgent::new(
            provider.clone(),
            ChatConfig::extraction(&config, prompts::TICKER_EXTRACTOR),
            "ticker_extractor",
        ));
        let news_analyst = NewsAnalyst::new(chat(prompts::NEWS_ANALYST, "news_analyst"));
        let reporter =
            FinancialReporter::new(chat(prompts::FINANCIAL_REPORTER, "financial_reporter"));
        let predictor = PricePredictor::new(chat(prompts::PRICE_PREDICTOR, "price_predictor"));
        let advisor = FinalAnswer::new(chat(prompts::FINAL_ANSWER, "final_answer"));

        Ok(StockPipeline {
            news: NewsRetriever::new(news, config.news_page_size),
            prices: PriceRetriever::new(quotes, self.history),
            extractor,
            news_analyst,
            reporter,
            predictor,
            advisor,
            config,
        })
    }
}

impl Default for StockPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::stubs::{
        ScriptedProvider, StubHistory, StubNews, StubQuotes, linear_series, sample_quote,
    };
    use crate::agents::{NO_NEWS_SUMMARY, Trend};
    use crate::models::Confidence;
    use std::time::Duration;
    use stockwise_core::CancellationSource;

    const PREDICTION_JSON: &str =
        r#"{"predicted_price": 133.0, "confidence": "high", "reasoning": "Momentum"}"#;

    fn scripted(tickers: &str) -> Arc<ScriptedProvider> {
        Arc::new(ScriptedProvider::by_system(&[
            ("ticker symbols", tickers),
            ("news analyst", "Sentiment is positive."),
            ("financial reporter", "Overall Picture: healthy."),
            ("quantitative", PREDICTION_JSON),
            ("investment advisor", "Buy."),
        ]))
    }

    fn pipeline(provider: Arc<ScriptedProvider>, history: Vec<Arc<StubHistory>>) -> StockPipeline {
        let mut builder = StockPipeline::builder()
            .provider(provider)
            .quote_source(Arc::new(StubQuotes::fixed(sample_quote("AAPL"))))
            .news_source(Arc::new(StubNews::items(&[("Apple rallies", "Reuters")])));
        for source in history {
            builder = builder.history_source(source);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_builder_requires_sources() {
        let err = StockPipeline::builder().build().err().unwrap();
        assert_eq!(err.kind(), FailureKind::Configuration);

        let err = StockPipeline::builder()
            .provider(scripted("[]"))
            .quote_source(Arc::new(StubQuotes::fixed(sample_quote("AAPL"))))
            .news_source(Arc::new(StubNews::items(&[])))
            .build()
            .err()
            .unwrap();
        assert!(err.to_string().contains("History source"));
    }

    #[tokio::test]
    async fn test_full_report() {
        let history = Arc::new(StubHistory::serving("primary", linear_series(30, 100.0, 130.0)));
        let pipeline = pipeline(scripted(r#"["AAPL"]"#), vec![history]);

        let run = pipeline
            .run("How is Apple doing?", &Context::new().with_request_id("req-1"))
            .await
            .unwrap();

        assert_eq!(run.request_id.as_deref(), Some("req-1"));
        assert_eq!(run.outcomes.len(), 1);
        let report = run.outcomes[0].report().unwrap();

        assert_eq!(report.history.len(), 30);
        assert_eq!(report.history_source.value().map(String::as_str), Some("primary"));
        assert_eq!(report.news_analysis.value().map(String::as_str), Some("Sentiment is positive."));
        assert_eq!(report.price_analysis.value().unwrap().trend, Trend::Increasing);
        assert_eq!(
            report.financial_report.value().map(String::as_str),
            Some("Overall Picture: healthy.")
        );
        assert_eq!(report.prediction.value().unwrap().confidence, Confidence::High);
        assert_eq!(report.advice.value().map(String::as_str), Some("Buy."));
    }

    #[tokio::test]
    async fn test_no_tickers() {
        let pipeline = pipeline(scripted("[]"), vec![Arc::new(StubHistory::failing("h"))]);
        let err = pipeline.run("asdf qwer", &Context::new()).await.unwrap_err();
        assert!(matches!(err, StockError::NoTickers(_)));
    }

    #[tokio::test]
    async fn test_history_failure_uses_quote_snapshot() {
        let pipeline = pipeline(
            scripted(r#"["AAPL"]"#),
            vec![Arc::new(StubHistory::failing("primary")), Arc::new(StubHistory::no_data("backup"))],
        );

        let run = pipeline.run("Apple", &Context::new()).await.unwrap();
        let report = run.outcomes[0].report().unwrap();

        assert!(report.history.is_empty());
        assert_eq!(report.history_source.failure(), Some(FailureKind::NoData));
        // snapshot: previous close 149 -> current 150
        let summary = report.price_analysis.value().unwrap();
        assert_eq!(summary.count, 5);
        assert_eq!(summary.trend, Trend::Increasing);
        assert_eq!(report.prediction.failure(), Some(FailureKind::NoData));
        assert!(report.advice.is_ready());
    }

    #[tokio::test]
    async fn test_quote_failure_fails_only_that_ticker() {
        let pipeline = StockPipeline::builder()
            .provider(scripted(r#"["AAPL", "MSFT"]"#))
            .quote_source(Arc::new(StubQuotes::failing()))
            .news_source(Arc::new(StubNews::items(&[])))
            .history_source(Arc::new(StubHistory::serving("h", linear_series(10, 1.0, 2.0))))
            .build()
            .unwrap();

        let run = pipeline.run("Apple and Microsoft", &Context::new()).await.unwrap();
        assert_eq!(run.outcomes.len(), 2);
        assert_eq!(run.outcomes[0].ticker().as_str(), "AAPL");
        assert_eq!(run.outcomes[1].ticker().as_str(), "MSFT");
        assert!(run.outcomes.iter().all(|o| o.report().is_none()));
    }

    #[tokio::test]
    async fn test_news_failure_is_inline() {
        let pipeline = StockPipeline::builder()
            .provider(scripted(r#"["AAPL"]"#))
            .quote_source(Arc::new(StubQuotes::fixed(sample_quote("AAPL"))))
            .news_source(Arc::new(StubNews::failing()))
            .history_source(Arc::new(StubHistory::serving("h", linear_series(30, 100.0, 130.0))))
            .build()
            .unwrap();

        let run = pipeline.run("Apple", &Context::new()).await.unwrap();
        let report = run.outcomes[0].report().unwrap();
        assert_eq!(report.news.failure(), Some(FailureKind::Transport));
        assert_eq!(report.news_analysis.failure(), Some(FailureKind::Transport));
        assert!(report.financial_report.is_ready());
    }

    #[tokio::test]
    async fn test_empty_news_skips_analysis_call() {
        let provider = scripted(r#"["AAPL"]"#);
        let pipeline = StockPipeline::builder()
            .provider(provider.clone())
            .quote_source(Arc::new(StubQuotes::fixed(sample_quote("AAPL"))))
            .news_source(Arc::new(StubNews::items(&[])))
            .history_source(Arc::new(StubHistory::serving("h", linear_series(30, 100.0, 130.0))))
            .build()
            .unwrap();

        let run = pipeline.run("Apple", &Context::new()).await.unwrap();
        let report = run.outcomes[0].report().unwrap();
        assert_eq!(report.news_analysis.value().map(String::as_str), Some(NO_NEWS_SUMMARY));

        let analyst_calls = provider
            .requests()
            .iter()
            .filter(|r| r.system.as_deref() == Some(prompts::NEWS_ANALYST))
            .count();
        assert_eq!(analyst_calls, 0);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let source = CancellationSource::new();
        source.cancel();
        let ctx = Context::new().with_cancellation(source.token());

        let pipeline = pipeline(scripted(r#"["AAPL"]"#), vec![Arc::new(StubHistory::failing("h"))]);
        let err = pipeline.run("Apple", &ctx).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Cancelled);
    }

    #[tokio::test]
    async fn test_cancelled_during_history_marks_prediction_cancelled() {
        let source = CancellationSource::new();
        let ctx = Context::new().with_cancellation(source.token());
        let pipeline = pipeline(
            scripted(r#"["AAPL"]"#),
            vec![Arc::new(StubHistory::hanging("primary"))],
        );

        let cancel = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            source.cancel();
        };
        let ((), run) = tokio::join!(cancel, pipeline.run("Apple", &ctx));

        let run = run.unwrap();
        let report = run.outcomes[0].report().unwrap();
        assert!(report.history.is_empty());
        assert_eq!(report.history_source.failure(), Some(FailureKind::Cancelled));
        assert_eq!(report.prediction.failure(), Some(FailureKind::Cancelled));
        assert_eq!(report.advice.failure(), Some(FailureKind::Cancelled));
    }
}
