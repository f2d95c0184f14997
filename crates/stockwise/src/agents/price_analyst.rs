//! Descriptive statistics and trend label for a close-price sequence
//!
//! Purely local: no model call, no I/O.

use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of the series from first to last sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
}

impl Trend {
    /// `Increasing` iff `last > first`; ties are `Decreasing`
    pub fn between(first: f64, last: f64) -> Self {
        if last > first {
            Self::Increasing
        } else {
            Self::Decreasing
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Count, moments and quartiles of a price sequence plus its trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation, `None` for a single sample
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
    pub trend: Trend,
}

impl fmt::Display for PriceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Price Trend: {}", self.trend)?;
        writeln!(f, "Summary Stats:")?;
        writeln!(f, "count  {:>14.6}", self.count as f64)?;
        writeln!(f, "mean   {:>14.6}", self.mean)?;
        match self.std {
            Some(std) => writeln!(f, "std    {std:>14.6}")?,
            None => writeln!(f, "std    {:>14}", "NaN")?,
        }
        writeln!(f, "min    {:>14.6}", self.min)?;
        writeln!(f, "25%    {:>14.6}", self.q25)?;
        writeln!(f, "50%    {:>14.6}", self.median)?;
        writeln!(f, "75%    {:>14.6}", self.q75)?;
        write!(f, "max    {:>14.6}", self.max)
    }
}

/// Stateless price statistics stage
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceAnalyst;

impl PriceAnalyst {
    /// Summarize `prices` in their given order
    ///
    /// Non-finite values are ignored. Fails with `InsufficientData` when no
    /// finite value remains.
    pub fn summarize(prices: &[f64]) -> Result<PriceSummary> {
        let values: Vec<f64> = prices.iter().copied().filter(|p| p.is_finite()).collect();
        let (Some(&first), Some(&last)) = (values.first(), values.last()) else {
            return Err(StockError::InsufficientData(
                "no prices to summarize".to_string(),
            ));
        };

        let count = values.len();
        let n = count as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = (count > 1).then(|| {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1.0)).sqrt()
        });

        let mut sorted = values;
        sorted.sort_by(f64::total_cmp);

        Ok(PriceSummary {
            count,
            mean,
            std,
            min: sorted[0],
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted[count - 1],
            trend: Trend::between(first, last),
        })
    }
}

/// Linear-interpolated quantile of a sorted, non-empty slice
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (pos - lower as f64)
}
