//! Per-ticker report and run result types

use crate::agents::{HistoryFetch, PriceSummary};
use crate::error::{FailureKind, StockError};
use crate::models::{NewsItem, OhlcvSeries, Prediction, PriceQuote, TickerSymbol};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one report section
///
/// A failed section carries its failure kind and message in place of a
/// value, so a rendered report shows the failure inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Section<T> {
    Ready { value: T },
    Failed { kind: FailureKind, message: String },
}

impl<T> Section<T> {
    pub fn ready(value: T) -> Self {
        Self::Ready { value }
    }

    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failed {
            kind,
            message: message.into(),
        }
    }

    pub fn from_result(result: crate::error::Result<T>) -> Self {
        match result {
            Ok(value) => Self::ready(value),
            Err(e) => Self::from_error(&e),
        }
    }

    pub fn from_error(error: &StockError) -> Self {
        Self::failed(error.kind(), error.to_string())
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Ready { value } => Some(value),
            Self::Failed { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    /// Failure kind, if the section failed
    pub fn failure(&self) -> Option<FailureKind> {
        match self {
            Self::Ready { .. } => None,
            Self::Failed { kind, .. } => Some(*kind),
        }
    }
}

impl<T: ToString> Section<T> {
    /// Text of the value, or `fallback` followed by the failure message
    pub fn text_or(&self, fallback: &str) -> String {
        match self {
            Self::Ready { value } => value.to_string(),
            Self::Failed { message, .. } => format!("{fallback} ({message})"),
        }
    }
}

/// Everything produced for one ticker; built once and never mutated
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub ticker: TickerSymbol,
    pub quote: PriceQuote,
    /// Daily bars; empty when every history source failed
    pub history: OhlcvSeries,
    /// Source that served `history`, or why none did
    pub history_source: Section<String>,
    pub news: Section<Vec<NewsItem>>,
    pub news_analysis: Section<String>,
    pub price_analysis: Section<PriceSummary>,
    pub financial_report: Section<String>,
    pub prediction: Section<Prediction>,
    pub advice: Section<String>,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    /// Split a history fetch result into the series and its source section
    pub(crate) fn history_parts(
        fetch: crate::error::Result<HistoryFetch>,
    ) -> (OhlcvSeries, Section<String>) {
        match fetch {
            Ok(HistoryFetch { series, source }) => (series, Section::ready(source)),
            Err(e) => (OhlcvSeries::empty(), Section::from_error(&e)),
        }
    }

    /// Expected change from the current quote to the predicted price
    pub fn expected_change(&self) -> Option<(f64, Option<f64>)> {
        self.prediction
            .value()
            .map(|p| p.expected_change(self.quote.current))
    }
}

/// Result of analyzing one extracted ticker
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TickerOutcome {
    Analyzed {
        report: Box<Report>,
    },
    /// The quote could not be fetched, so no report was built
    Failed {
        ticker: TickerSymbol,
        kind: FailureKind,
        message: String,
    },
}

impl TickerOutcome {
    pub fn ticker(&self) -> &TickerSymbol {
        match self {
            Self::Analyzed { report } => &report.ticker,
            Self::Failed { ticker, .. } => ticker,
        }
    }

    pub fn report(&self) -> Option<&Report> {
        match self {
            Self::Analyzed { report } => Some(report),
            Self::Failed { .. } => None,
        }
    }
}

/// One processed query
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRun {
    pub request_id: Option<String>,
    pub query: String,
    pub tickers: Vec<TickerSymbol>,
    /// One outcome per ticker, in extraction order
    pub outcomes: Vec<TickerOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl AnalysisRun {
    pub fn reports(&self) -> impl Iterator<Item = &Report> {
        self.outcomes.iter().filter_map(TickerOutcome::report)
    }
}
