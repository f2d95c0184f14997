//! Error types for stock analysis operations

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use stockwise_llm::LLMError;
use stockwise_utils::EnvError;
use thiserror::Error;

/// Category of a stage failure
///
/// Every [`StockError`] maps onto exactly one kind via [`StockError::kind`];
/// report sections carry the kind so callers can branch without parsing
/// messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Network or HTTP failure before a usable reply arrived
    Transport,
    /// The provider answered but had no data for the request
    NoData,
    /// A reply lacked the expected structure
    MalformedResponse,
    /// Structured data returned by a model could not be decoded
    ParseFailure,
    /// Too few samples for the requested computation
    InsufficientData,
    /// The per-call timeout elapsed
    Timeout,
    /// The run was cancelled
    Cancelled,
    /// The provider throttled the request
    RateLimited,
    /// Missing or invalid configuration
    Configuration,
}

impl FailureKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::NoData => "no_data",
            Self::MalformedResponse => "malformed_response",
            Self::ParseFailure => "parse_failure",
            Self::InsufficientData => "insufficient_data",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
            Self::RateLimited => "rate_limited",
            Self::Configuration => "configuration",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stock analysis specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// API request failed
    #[error("API error: {0}")]
    ApiError(String),

    /// Invalid stock symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Every history source failed
    #[error("No price history for {symbol} ({})", attempts.join("; "))]
    HistoryUnavailable {
        symbol: String,
        /// One `"source: error"` entry per source tried, in order
        attempts: Vec<String>,
    },

    /// The query did not name any recognizable ticker
    #[error("No ticker symbols found in query: {0}")]
    NoTickers(String),

    /// Rate limit exceeded for API
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded { provider: String },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Provider payload had an unexpected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// OHLCV columns could not be aligned
    #[error("Malformed price series: {0}")]
    MalformedSeries(String),

    /// Model-returned structured data could not be decoded
    #[error("Parse failure: {0}")]
    ParseFailure(String),

    /// Too few samples for a computation
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Chat-completion failure
    #[error("Model call failed: {0}")]
    Llm(#[from] LLMError),

    /// A guarded call exceeded its timeout
    #[error("{operation} timed out after {}s", limit.as_secs_f64())]
    Timeout { operation: String, limit: Duration },

    /// The run was cancelled
    #[error("{0} was cancelled")]
    Cancelled(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A prompt template failed to render
    #[error("Prompt rendering failed: {0}")]
    Prompt(#[from] minijinja::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl StockError {
    /// Failure category of this error
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::ApiError(_) | Self::NetworkError(_) | Self::Other(_) => FailureKind::Transport,
            Self::DataUnavailable { .. } | Self::HistoryUnavailable { .. } | Self::NoTickers(_) => {
                FailureKind::NoData
            }
            Self::InvalidSymbol(_) | Self::ParseFailure(_) => FailureKind::ParseFailure,
            Self::JsonError(_) | Self::MalformedResponse(_) | Self::MalformedSeries(_) => {
                FailureKind::MalformedResponse
            }
            Self::InsufficientData(_) => FailureKind::InsufficientData,
            Self::RateLimitExceeded { .. } => FailureKind::RateLimited,
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::Cancelled(_) => FailureKind::Cancelled,
            Self::ConfigError(_) | Self::Prompt(_) => FailureKind::Configuration,
            Self::Llm(err) => llm_failure_kind(err),
        }
    }
}

fn llm_failure_kind(err: &LLMError) -> FailureKind {
    match err {
        LLMError::RateLimitExceeded(_) => FailureKind::RateLimited,
        LLMError::AuthenticationFailed
        | LLMError::ModelNotFound(_)
        | LLMError::ConfigurationError(_) => FailureKind::Configuration,
        e if e.is_malformed_reply() => FailureKind::MalformedResponse,
        _ => FailureKind::Transport,
    }
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

/// Convert stockwise_core::Error to StockError
impl From<stockwise_core::Error> for StockError {
    fn from(err: stockwise_core::Error) -> Self {
        match err {
            stockwise_core::Error::Timeout { operation, limit } => {
                StockError::Timeout { operation, limit }
            }
            stockwise_core::Error::Cancelled(operation) => StockError::Cancelled(operation),
        }
    }
}

impl From<EnvError> for StockError {
    fn from(err: EnvError) -> Self {
        StockError::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StockError::InvalidSymbol("INVALID".to_string());
        assert_eq!(err.to_string(), "Invalid symbol: INVALID");

        let err = StockError::DataUnavailable {
            symbol: "AAPL".to_string(),
            reason: "zero current price".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Data not available for AAPL: zero current price"
        );

        let err = StockError::HistoryUnavailable {
            symbol: "AAPL".to_string(),
            attempts: vec!["finnhub: no_data".to_string(), "yahoo: timeout".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "No price history for AAPL (finnhub: no_data; yahoo: timeout)"
        );
    }

    #[test]
    fn test_failure_kinds() {
        assert_eq!(
            StockError::ApiError("502".to_string()).kind(),
            FailureKind::Transport
        );
        assert_eq!(
            StockError::NoTickers("asdf".to_string()).kind(),
            FailureKind::NoData
        );
        assert_eq!(
            StockError::ParseFailure("bad json".to_string()).kind(),
            FailureKind::ParseFailure
        );
        assert_eq!(
            StockError::InsufficientData("empty".to_string()).kind(),
            FailureKind::InsufficientData
        );
        assert_eq!(
            StockError::Llm(LLMError::EmptyContent).kind(),
            FailureKind::MalformedResponse
        );
        assert_eq!(
            StockError::Llm(LLMError::RateLimitExceeded("slow down".to_string())).kind(),
            FailureKind::RateLimited
        );
        assert_eq!(
            StockError::Llm(LLMError::RequestFailed("reset".to_string())).kind(),
            FailureKind::Transport
        );
        assert_eq!(
            StockError::Llm(LLMError::AuthenticationFailed).kind(),
            FailureKind::Configuration
        );
    }

    #[test]
    fn test_core_error_conversion() {
        let core = stockwise_core::Error::Timeout {
            operation: "quote".to_string(),
            limit: Duration::from_secs(3),
        };
        let err: StockError = core.into();
        assert_eq!(err.kind(), FailureKind::Timeout);

        let err: StockError = stockwise_core::Error::Cancelled("news".to_string()).into();
        assert_eq!(err.kind(), FailureKind::Cancelled);
    }

    #[test]
    fn test_env_error_conversion() {
        let err: StockError = EnvError::Missing("FINNHUB_API_KEY".to_string()).into();
        assert_eq!(err.kind(), FailureKind::Configuration);
        assert!(err.to_string().contains("FINNHUB_API_KEY"));
    }
}
