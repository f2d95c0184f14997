//! User message templates
//!
//! Templates are minijinja sources rendered with a fresh `Environment` per
//! call. Numbers are formatted by the caller so every template variable is
//! a plain string.

use crate::error::Result;
use minijinja::{Environment, UndefinedBehavior, context};

const TICKER_EXTRACTION: &str = r#"Which stock ticker symbols does this question refer to?

Examples:
- "Tell me about Apple" -> ["AAPL"]
- "Compare Tesla and Microsoft" -> ["TSLA", "MSFT"]
- "What's happening with NVDA?" -> ["NVDA"]

Question: {{ query }}

Answer with a JSON list such as ["TICKER1", "TICKER2"], or [] when no company is mentioned."#;

const FINANCIAL_REPORT: &str = r"News Analysis:
{{ news }}

Price Analysis:
{{ price }}";

const PRICE_PREDICTION: &str = r#"Ticker: {{ ticker }}
Current price: ${{ current_price }}
7-day momentum: {{ momentum }}
30-day volatility: {{ volatility }}
Trading days observed: {{ days }}

News sentiment:
{{ sentiment }}

Reply with: {"predicted_price": <number>, "confidence": "low|medium|high", "reasoning": "<short explanation>"}"#;

fn render(source: &str, ctx: minijinja::Value) -> Result<String> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    Ok(env.render_str(source, ctx)?)
}

/// User message for ticker extraction
pub fn ticker_extraction(query: &str) -> Result<String> {
    render(TICKER_EXTRACTION, context! { query => query })
}

/// User message combining both analyses
pub fn financial_report(news: &str, price: &str) -> Result<String> {
    render(FINANCIAL_REPORT, context! { news => news, price => price })
}

/// Inputs to the prediction prompt, pre-formatted
#[derive(Debug, Clone)]
pub struct PredictionPrompt<'a> {
    pub ticker: &'a str,
    pub current_price: String,
    pub momentum: String,
    pub volatility: String,
    pub days: usize,
    pub sentiment: &'a str,
}

/// User message for the model-reasoned prediction
pub fn price_prediction(prompt: &PredictionPrompt<'_>) -> Result<String> {
    render(
        PRICE_PREDICTION,
        context! {
            ticker => prompt.ticker,
            current_price => prompt.current_price.as_str(),
            momentum => prompt.momentum.as_str(),
            volatility => prompt.volatility.as_str(),
            days => prompt.days,
            sentiment => prompt.sentiment,
        },
    )
}
