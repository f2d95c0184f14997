//! Data model shared by every pipeline stage
//!
//! Each stage produces an immutable value consumed by the next. The types
//! here enforce the shape invariants of that data: ticker symbols are
//! validated on construction, and an [`OhlcvSeries`] can only exist with
//! aligned, equal-length columns in ascending time order.

use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Short uppercase alphanumeric code identifying one security
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TickerSymbol(String);

impl TickerSymbol {
    /// Longest accepted symbol
    pub const MAX_LEN: usize = 5;

    /// Trim, uppercase and validate a candidate symbol
    pub fn parse(raw: &str) -> Result<Self> {
        let symbol = raw.trim().to_ascii_uppercase();
        let valid = !symbol.is_empty()
            && symbol.len() <= Self::MAX_LEN
            && symbol.chars().all(|c| c.is_ascii_alphanumeric());

        if valid {
            Ok(Self(symbol))
        } else {
            Err(StockError::InvalidSymbol(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TickerSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TickerSymbol {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TickerSymbol {
    type Error = StockError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<TickerSymbol> for String {
    fn from(symbol: TickerSymbol) -> Self {
        symbol.0
    }
}

impl AsRef<str> for TickerSymbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One headline with the outlet that published it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub source: String,
}

impl NewsItem {
    pub fn new(title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source: source.into(),
        }
    }
}

impl fmt::Display for NewsItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.title, self.source)
    }
}

/// Quote snapshot for one instant
///
/// All fields are present or the quote does not exist: the retriever
/// reports an error instead of a partial quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub symbol: TickerSymbol,
    pub current: f64,
    pub high: f64,
    pub low: f64,
    pub open: f64,
    pub previous_close: f64,
}

impl PriceQuote {
    /// Absolute change against the previous close
    pub fn change(&self) -> f64 {
        self.current - self.previous_close
    }

    /// Percent change against the previous close
    pub fn change_percent(&self) -> Option<f64> {
        (self.previous_close != 0.0).then(|| self.change() / self.previous_close * 100.0)
    }

    /// Intraday price points, used when no daily history is available
    ///
    /// Ordered previous close, open, high, low, current.
    pub fn snapshot_points(&self) -> [f64; 5] {
        [
            self.previous_close,
            self.open,
            self.high,
            self.low,
            self.current,
        ]
    }
}

/// A single daily bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Unix timestamp in seconds
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Daily OHLCV bars as parallel columns in ascending time order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OhlcvSeries {
    timestamps: Vec<i64>,
    open: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
    close: Vec<f64>,
    volume: Vec<u64>,
}

impl OhlcvSeries {
    /// Series with no bars
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from provider columns
    ///
    /// Rejects columns of unequal length. Bars are re-sorted by timestamp
    /// when the provider returned them out of order.
    pub fn from_columns(
        timestamps: Vec<i64>,
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
        volume: Vec<u64>,
    ) -> Result<Self> {
        let n = timestamps.len();
        let lengths = [open.len(), high.len(), low.len(), close.len(), volume.len()];
        if lengths.iter().any(|&len| len != n) {
            return Err(StockError::MalformedSeries(format!(
                "column lengths differ: t={n} o={} h={} l={} c={} v={}",
                lengths[0], lengths[1], lengths[2], lengths[3], lengths[4]
            )));
        }

        let series = Self {
            timestamps,
            open,
            high,
            low,
            close,
            volume,
        };

        if series.timestamps.is_sorted() {
            Ok(series)
        } else {
            Ok(Self::from_bars(series.bars().collect()))
        }
    }

    /// Build from individual bars, sorting ascending by timestamp
    pub fn from_bars(mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|bar| bar.timestamp);

        let mut series = Self {
            timestamps: Vec::with_capacity(bars.len()),
            open: Vec::with_capacity(bars.len()),
            high: Vec::with_capacity(bars.len()),
            low: Vec::with_capacity(bars.len()),
            close: Vec::with_capacity(bars.len()),
            volume: Vec::with_capacity(bars.len()),
        };

        for bar in bars {
            series.timestamps.push(bar.timestamp);
            series.open.push(bar.open);
            series.high.push(bar.high);
            series.low.push(bar.low);
            series.close.push(bar.close);
            series.volume.push(bar.volume);
        }

        series
    }

    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    pub fn open(&self) -> &[f64] {
        &self.open
    }

    pub fn high(&self) -> &[f64] {
        &self.high
    }

    pub fn low(&self) -> &[f64] {
        &self.low
    }

    pub fn close(&self) -> &[f64] {
        &self.close
    }

    pub fn volume(&self) -> &[u64] {
        &self.volume
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.close.last().copied()
    }

    /// Iterate over the series bar by bar
    pub fn bars(&self) -> impl Iterator<Item = Bar> + '_ {
        (0..self.len()).map(|i| Bar {
            timestamp: self.timestamps[i],
            open: self.open[i],
            high: self.high[i],
            low: self.low[i],
            close: self.close[i],
            volume: self.volume[i],
        })
    }
}

/// Coarse confidence attached to a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Confidence {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(StockError::ParseFailure(format!(
                "unknown confidence level '{other}'"
            ))),
        }
    }
}

/// Seven-day price prediction, always fully populated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub predicted_price: f64,
    pub confidence: Confidence,
    pub reasoning: String,
}

impl Prediction {
    /// Absolute and percent change from `current` to the predicted price
    ///
    /// The percent is `None` when `current` is zero.
    pub fn expected_change(&self, current: f64) -> (f64, Option<f64>) {
        let change = self.predicted_price - current;
        let percent = (current != 0.0).then(|| change / current * 100.0);
        (change, percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_symbol_parse() {
        assert_eq!(TickerSymbol::parse(" aapl ").unwrap().as_str(), "AAPL");
        assert_eq!(TickerSymbol::parse("BRK1").unwrap().to_string(), "BRK1");
        assert!(TickerSymbol::parse("").is_err());
        assert!(TickerSymbol::parse("TOOLONG").is_err());
        assert!(TickerSymbol::parse("BRK.B").is_err());
    }

    #[test]
    fn test_ticker_symbol_serde() {
        let symbol: TickerSymbol = serde_json::from_str("\"msft\"").unwrap();
        assert_eq!(symbol.as_str(), "MSFT");
        assert_eq!(serde_json::to_string(&symbol).unwrap(), "\"MSFT\"");
        assert!(serde_json::from_str::<TickerSymbol>("\"$$$\"").is_err());
    }

    #[test]
    fn test_news_item_display() {
        let item = NewsItem::new("Apple unveils new chip", "Reuters");
        assert_eq!(item.to_string(), "Apple unveils new chip - Reuters");
    }

    #[test]
    fn test_quote_helpers() {
        let quote = PriceQuote {
            symbol: TickerSymbol::parse("AAPL").unwrap(),
            current: 150.0,
            high: 152.0,
            low: 148.0,
            open: 149.0,
            previous_close: 147.0,
        };

        assert!((quote.change() - 3.0).abs() < 1e-9);
        assert!((quote.change_percent().unwrap() - 2.040_816).abs() < 1e-5);
        assert_eq!(quote.snapshot_points(), [147.0, 149.0, 152.0, 148.0, 150.0]);

        let flat = PriceQuote {
            previous_close: 0.0,
            ..quote
        };
        assert!(flat.change_percent().is_none());
    }

    #[test]
    fn test_series_rejects_unequal_columns() {
        let result = OhlcvSeries::from_columns(
            vec![1, 2],
            vec![1.0, 2.0],
            vec![1.0, 2.0],
            vec![1.0, 2.0],
            vec![1.0],
            vec![10, 20],
        );
        assert!(matches!(result, Err(StockError::MalformedSeries(_))));
    }

    #[test]
    fn test_series_sorted_ascending() {
        let series = OhlcvSeries::from_columns(
            vec![30, 10, 20],
            vec![3.0, 1.0, 2.0],
            vec![3.0, 1.0, 2.0],
            vec![3.0, 1.0, 2.0],
            vec![3.5, 1.5, 2.5],
            vec![300, 100, 200],
        )
        .unwrap();

        assert_eq!(series.timestamps(), &[10, 20, 30]);
        assert_eq!(series.close(), &[1.5, 2.5, 3.5]);
        assert_eq!(series.volume(), &[100, 200, 300]);
        assert_eq!(series.last_close(), Some(3.5));
        assert_eq!(series.bars().count(), 3);
    }

    #[test]
    fn test_empty_series() {
        let series = OhlcvSeries::empty();
        assert!(series.is_empty());
        assert_eq!(series.len(), 0);
        assert!(series.last_close().is_none());
    }

    #[test]
    fn test_confidence_parse() {
        assert_eq!("HIGH".parse::<Confidence>().unwrap(), Confidence::High);
        assert_eq!(" Medium ".parse::<Confidence>().unwrap(), Confidence::Medium);
        assert!("certain".parse::<Confidence>().is_err());
        assert_eq!(serde_json::to_string(&Confidence::Low).unwrap(), "\"low\"");
    }

    #[test]
    fn test_expected_change() {
        let prediction = Prediction {
            predicted_price: 110.0,
            confidence: Confidence::Medium,
            reasoning: "momentum".to_string(),
        };

        let (change, percent) = prediction.expected_change(100.0);
        assert!((change - 10.0).abs() < 1e-9);
        assert!((percent.unwrap() - 10.0).abs() < 1e-9);
        assert!(prediction.expected_change(0.0).1.is_none());
    }
}
