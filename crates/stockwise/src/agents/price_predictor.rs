//! Seven-day price prediction with ordered degradation
//!
//! Tiers are tried in order and the first one that yields a prediction
//! wins:
//!
//! 1. [`ModelReasoned`]: asks the model for a JSON prediction built from
//!    momentum, volatility and news sentiment
//! 2. [`MomentumFormula`]: `current * (1 + momentum / 100 * 0.5)`
//! 3. [`LastPrice`]: the last close, always yields
//!
//! [`PricePredictor::predict`] therefore never fails.

use super::chat::ChatAgent;
use crate::error::{Result, StockError};
use crate::models::{Confidence, OhlcvSeries, Prediction, TickerSymbol};
use crate::prompts::{self, PredictionPrompt};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stockwise_core::Context;
use ta::Next;
use ta::indicators::StandardDeviation;
use tracing::{debug, warn};

/// Look-back for momentum, in closes
pub const MOMENTUM_WINDOW: usize = 7;

/// Look-back for volatility, in closes
pub const VOLATILITY_WINDOW: usize = 30;

/// Reasoning attached to formula predictions
pub const MOMENTUM_REASONING: &str = "Based on 7-day momentum and current market trends";

/// Reasoning attached to last-price predictions
pub const LAST_PRICE_REASONING: &str = "Insufficient data for prediction";

/// Numeric inputs to every tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Indicators {
    /// Last close
    pub current: Option<f64>,
    /// Percent change over the last seven closes
    pub momentum_7d: Option<f64>,
    /// Population standard deviation of the last thirty closes
    pub volatility_30d: Option<f64>,
    pub samples: usize,
}

impl Indicators {
    pub fn from_closes(closes: &[f64]) -> Self {
        let current = closes.last().copied();

        let momentum_7d = closes
            .len()
            .checked_sub(MOMENTUM_WINDOW)
            .map(|i| closes[i])
            .filter(|base| *base != 0.0)
            .zip(current)
            .map(|(base, last)| (last - base) / base * 100.0);

        let volatility_30d = match rolling_std(closes, VOLATILITY_WINDOW) {
            Ok(std) => std,
            Err(e) => {
                warn!(error = %e, "Volatility unavailable");
                None
            }
        };

        Self {
            current,
            momentum_7d,
            volatility_30d,
            samples: closes.len(),
        }
    }
}

/// Standard deviation over the last `min(period, n)` values
fn rolling_std(values: &[f64], period: usize) -> Result<Option<f64>> {
    let mut std = StandardDeviation::new(period)
        .map_err(|e| StockError::InsufficientData(e.to_string()))?;
    Ok(values.iter().fold(None, |_, &v| Some(std.next(v))))
}

/// Everything a tier may look at
#[derive(Debug, Clone, Copy)]
pub struct PredictionInput<'a> {
    pub ticker: &'a TickerSymbol,
    pub indicators: &'a Indicators,
    pub sentiment: &'a str,
}

/// One step of the degradation chain
#[async_trait]
pub trait PredictionTier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Produce a prediction, or explain why this tier cannot
    async fn attempt(&self, input: &PredictionInput<'_>, ctx: &Context) -> Result<Prediction>;
}

#[derive(Debug, Deserialize)]
struct RawPrediction {
    predicted_price: f64,
    confidence: String,
    reasoning: String,
}

/// Decode the first JSON object in a model reply, ignoring anything after it
fn parse_prediction(reply: &str) -> Result<Prediction> {
    let start = reply
        .find('{')
        .ok_or_else(|| StockError::ParseFailure("no JSON object in reply".to_string()))?;

    let raw = serde_json::Deserializer::from_str(&reply[start..])
        .into_iter::<RawPrediction>()
        .next()
        .ok_or_else(|| StockError::ParseFailure("no JSON object in reply".to_string()))?
        .map_err(|e| StockError::ParseFailure(format!("invalid prediction object: {e}")))?;

    if !raw.predicted_price.is_finite() || raw.predicted_price <= 0.0 {
        return Err(StockError::ParseFailure(format!(
            "implausible predicted price {}",
            raw.predicted_price
        )));
    }

    Ok(Prediction {
        predicted_price: raw.predicted_price,
        confidence: raw.confidence.parse()?,
        reasoning: raw.reasoning,
    })
}

/// Model-reasoned prediction; needs momentum
pub struct ModelReasoned {
    chat: ChatAgent,
}

impl ModelReasoned {
    pub fn new(chat: ChatAgent) -> Self {
        Self { chat }
    }
}

#[async_trait]
impl PredictionTier for ModelReasoned {
    fn name(&self) -> &'static str {
        "model_reasoned"
    }

    async fn attempt(&self, input: &PredictionInput<'_>, ctx: &Context) -> Result<Prediction> {
        let indicators = input.indicators;
        let (Some(current), Some(momentum)) = (indicators.current, indicators.momentum_7d) else {
            return Err(StockError::InsufficientData(format!(
                "need {MOMENTUM_WINDOW} closes for momentum, have {}",
                indicators.samples
            )));
        };

        let prompt = prompts::price_prediction(&PredictionPrompt {
            ticker: input.ticker.as_str(),
            current_price: format!("{current:.2}"),
            momentum: format!("{momentum:+.2}%"),
            volatility: indicators
                .volatility_30d
                .map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}")),
            days: indicators.samples,
            sentiment: input.sentiment,
        })?;

        let reply = self.chat.ask(prompt, ctx).await?;
        parse_prediction(&reply)
    }
}

/// `current * (1 + momentum / 100 * 0.5)`; needs momentum
#[derive(Debug, Clone, Copy, Default)]
pub struct MomentumFormula;

#[async_trait]
impl PredictionTier for MomentumFormula {
    fn name(&self) -> &'static str {
        "momentum_formula"
    }

    async fn attempt(&self, input: &PredictionInput<'_>, _ctx: &Context) -> Result<Prediction> {
        let indicators = input.indicators;
        let (Some(current), Some(momentum)) = (indicators.current, indicators.momentum_7d) else {
            return Err(StockError::InsufficientData(
                "momentum unavailable".to_string(),
            ));
        };

        Ok(Prediction {
            predicted_price: current * (1.0 + momentum / 100.0 * 0.5),
            confidence: Confidence::Medium,
            reasoning: MOMENTUM_REASONING.to_string(),
        })
    }
}

/// Last close, or 0.0 for an empty series
#[derive(Debug, Clone, Copy, Default)]
pub struct LastPrice;

impl LastPrice {
    fn prediction(indicators: &Indicators) -> Prediction {
        Prediction {
            predicted_price: indicators.current.unwrap_or(0.0),
            confidence: Confidence::Low,
            reasoning: LAST_PRICE_REASONING.to_string(),
        }
    }
}

#[async_trait]
impl PredictionTier for LastPrice {
    fn name(&self) -> &'static str {
        "last_price"
    }

    async fn attempt(&self, input: &PredictionInput<'_>, _ctx: &Context) -> Result<Prediction> {
        Ok(Self::prediction(input.indicators))
    }
}

/// Ordered chain of prediction tiers
pub struct PricePredictor {
    tiers: Vec<Box<dyn PredictionTier>>,
}

impl PricePredictor {
    /// Model, then formula, then last price
    pub fn new(chat: ChatAgent) -> Self {
        Self::with_tiers(vec![
            Box::new(ModelReasoned::new(chat)),
            Box::new(MomentumFormula),
            Box::new(LastPrice),
        ])
    }

    pub fn with_tiers(tiers: Vec<Box<dyn PredictionTier>>) -> Self {
        Self { tiers }
    }

    /// Predict the close seven trading days out
    ///
    /// Falls back to [`LastPrice`] if every configured tier declines.
    pub async fn predict(
        &self,
        series: &OhlcvSeries,
        sentiment: &str,
        ticker: &TickerSymbol,
        ctx: &Context,
    ) -> Prediction {
        let indicators = Indicators::from_closes(series.close());
        let input = PredictionInput {
            ticker,
            indicators: &indicators,
            sentiment,
        };

        for tier in &self.tiers {
            match tier.attempt(&input, ctx).await {
                Ok(prediction) => {
                    debug!(%ticker, tier = tier.name(), "Prediction produced");
                    return prediction;
                }
                Err(e) => {
                    debug!(%ticker, tier = tier.name(), error = %e, "Prediction tier declined");
                }
            }
        }

        LastPrice::prediction(&indicators)
    }
}
