//! Configuration for the analysis pipeline
//!
//! Loaded once at process start, validated, then shared read-only as
//! `Arc<StockConfig>` by every client and stage.

use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use stockwise_utils::{env_or, env_parse, require_env};
use url::Url;

/// Default chat model for every model-backed stage
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
/// Default OpenAI-compatible endpoint
pub const DEFAULT_GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
/// Default market-data endpoint
pub const DEFAULT_FINNHUB_API_BASE: &str = "https://finnhub.io/api/v1";
/// Default news-search endpoint
pub const DEFAULT_NEWS_API_BASE: &str = "https://newsapi.org/v2";

/// Configuration for stock analysis operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// Chat-completion API key
    #[serde(skip_serializing, default)]
    pub groq_api_key: String,

    /// Market-data API key
    #[serde(skip_serializing, default)]
    pub finnhub_api_key: String,

    /// News-search API key
    #[serde(skip_serializing, default)]
    pub news_api_key: String,

    pub groq_api_base: String,
    pub finnhub_api_base: String,
    pub news_api_base: String,

    /// Model used to extract tickers from the query
    pub extraction_model: String,

    /// Model used by the analysis, report, prediction and advice stages
    pub analysis_model: String,

    /// Sampling temperature for every chat call
    pub temperature: f32,

    /// Maximum completion tokens per chat call
    pub max_tokens: usize,

    /// Headlines requested per ticker
    pub news_page_size: u32,

    /// Daily history window in days
    pub history_days: u32,

    /// Timeout applied to each outbound call
    pub request_timeout: Duration,

    /// Market-data requests per minute
    pub finnhub_rate_limit: u32,

    /// Tickers analyzed at the same time
    pub max_concurrent_tickers: usize,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            groq_api_key: String::new(),
            finnhub_api_key: String::new(),
            news_api_key: String::new(),
            groq_api_base: DEFAULT_GROQ_API_BASE.to_string(),
            finnhub_api_base: DEFAULT_FINNHUB_API_BASE.to_string(),
            news_api_base: DEFAULT_NEWS_API_BASE.to_string(),
            extraction_model: DEFAULT_MODEL.to_string(),
            analysis_model: DEFAULT_MODEL.to_string(),
            temperature: 0.4,
            max_tokens: 1024,
            news_page_size: 5,
            history_days: 90,
            request_timeout: Duration::from_secs(30),
            finnhub_rate_limit: 60,
            max_concurrent_tickers: 2,
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Load and validate the configuration from the environment
    ///
    /// Requires `GROQ_API_KEY`, `FINNHUB_API_KEY` and `NEWS_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            groq_api_key: require_env("GROQ_API_KEY")?,
            finnhub_api_key: require_env("FINNHUB_API_KEY")?,
            news_api_key: require_env("NEWS_API_KEY")?,
            groq_api_base: env_or("GROQ_API_BASE", DEFAULT_GROQ_API_BASE),
            extraction_model: env_or("STOCKWISE_EXTRACTION_MODEL", DEFAULT_MODEL),
            analysis_model: env_or("STOCKWISE_ANALYSIS_MODEL", DEFAULT_MODEL),
            history_days: env_parse("STOCKWISE_HISTORY_DAYS")?.unwrap_or(defaults.history_days),
            request_timeout: env_parse::<u64>("STOCKWISE_TIMEOUT_SECS")?
                .map_or(defaults.request_timeout, Duration::from_secs),
            max_concurrent_tickers: env_parse("STOCKWISE_MAX_CONCURRENT_TICKERS")?
                .unwrap_or(defaults.max_concurrent_tickers),
            ..defaults
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (name, key) in [
            ("groq_api_key", &self.groq_api_key),
            ("finnhub_api_key", &self.finnhub_api_key),
            ("news_api_key", &self.news_api_key),
        ] {
            if key.trim().is_empty() {
                return Err(StockError::ConfigError(format!("{name} must be set")));
            }
        }

        for (name, base) in [
            ("groq_api_base", &self.groq_api_base),
            ("finnhub_api_base", &self.finnhub_api_base),
            ("news_api_base", &self.news_api_base),
        ] {
            Url::parse(base).map_err(|e| {
                StockError::ConfigError(format!("{name} '{base}' is not a valid URL: {e}"))
            })?;
        }

        if self.extraction_model.trim().is_empty() || self.analysis_model.trim().is_empty() {
            return Err(StockError::ConfigError(
                "model names must not be empty".to_string(),
            ));
        }

        if self.news_page_size == 0 {
            return Err(StockError::ConfigError(
                "news_page_size must be greater than 0".to_string(),
            ));
        }

        if self.history_days == 0 {
            return Err(StockError::ConfigError(
                "history_days must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(StockError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        if self.finnhub_rate_limit == 0 || self.max_concurrent_tickers == 0 {
            return Err(StockError::ConfigError(
                "finnhub_rate_limit and max_concurrent_tickers must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    groq_api_key: Option<String>,
    finnhub_api_key: Option<String>,
    news_api_key: Option<String>,
    groq_api_base: Option<String>,
    finnhub_api_base: Option<String>,
    news_api_base: Option<String>,
    extraction_model: Option<String>,
    analysis_model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<usize>,
    news_page_size: Option<u32>,
    history_days: Option<u32>,
    request_timeout: Option<Duration>,
    finnhub_rate_limit: Option<u32>,
    max_concurrent_tickers: Option<usize>,
}

impl StockConfigBuilder {
    /// Set all three API keys
    pub fn api_keys(
        mut self,
        groq: impl Into<String>,
        finnhub: impl Into<String>,
        news: impl Into<String>,
    ) -> Self {
        self.groq_api_key = Some(groq.into());
        self.finnhub_api_key = Some(finnhub.into());
        self.news_api_key = Some(news.into());
        self
    }

    pub fn groq_api_base(mut self, base: impl Into<String>) -> Self {
        self.groq_api_base = Some(base.into());
        self
    }

    pub fn finnhub_api_base(mut self, base: impl Into<String>) -> Self {
        self.finnhub_api_base = Some(base.into());
        self
    }

    pub fn news_api_base(mut self, base: impl Into<String>) -> Self {
        self.news_api_base = Some(base.into());
        self
    }

    /// Set the ticker-extraction model
    pub fn extraction_model(mut self, model: impl Into<String>) -> Self {
        self.extraction_model = Some(model.into());
        self
    }

    /// Set the analysis model
    pub fn analysis_model(mut self, model: impl Into<String>) -> Self {
        self.analysis_model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn news_page_size(mut self, size: u32) -> Self {
        self.news_page_size = Some(size);
        self
    }

    /// Set the daily history window
    pub fn history_days(mut self, days: u32) -> Self {
        self.history_days = Some(days);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    pub fn finnhub_rate_limit(mut self, per_minute: u32) -> Self {
        self.finnhub_rate_limit = Some(per_minute);
        self
    }

    pub fn max_concurrent_tickers(mut self, limit: usize) -> Self {
        self.max_concurrent_tickers = Some(limit);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();

        let config = StockConfig {
            groq_api_key: self.groq_api_key.unwrap_or(defaults.groq_api_key),
            finnhub_api_key: self.finnhub_api_key.unwrap_or(defaults.finnhub_api_key),
            news_api_key: self.news_api_key.unwrap_or(defaults.news_api_key),
            groq_api_base: self.groq_api_base.unwrap_or(defaults.groq_api_base),
            finnhub_api_base: self.finnhub_api_base.unwrap_or(defaults.finnhub_api_base),
            news_api_base: self.news_api_base.unwrap_or(defaults.news_api_base),
            extraction_model: self.extraction_model.unwrap_or(defaults.extraction_model),
            analysis_model: self.analysis_model.unwrap_or(defaults.analysis_model),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            news_page_size: self.news_page_size.unwrap_or(defaults.news_page_size),
            history_days: self.history_days.unwrap_or(defaults.history_days),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            finnhub_rate_limit: self.finnhub_rate_limit.unwrap_or(defaults.finnhub_rate_limit),
            max_concurrent_tickers: self
                .max_concurrent_tickers
                .unwrap_or(defaults.max_concurrent_tickers),
        };

        config.validate()?;
        Ok(config)
    }
}
