//! Terminal and JSON rendering of analysis runs

use crate::engine::{AnalysisRun, Report, Section, TickerOutcome};
use crate::error::{Result, StockError};
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt::Write;

/// Character caps for narrative sections
pub const NEWS_CAP: usize = 800;
pub const PRICE_CAP: usize = 600;
pub const REASONING_CAP: usize = 400;
pub const REPORT_CAP: usize = 500;
pub const ADVICE_CAP: usize = 500;

pub const DISCLAIMER: &str = "This analysis is for informational purposes only and is not \
financial advice. Predictions are derived from historical prices, recent news and automated \
analysis, and past performance does not guarantee future results. Do your own research and \
consult a licensed financial advisor before making investment decisions.";

/// Output encodings for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Outlook label derived from the expected seven-day change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outlook {
    Positive,
    Neutral,
    Cautious,
}

impl Outlook {
    /// Positive above +5 %, cautious below -5 %, neutral otherwise
    pub fn from_percent(percent: Option<f64>) -> Self {
        match percent {
            Some(p) if p > 5.0 => Self::Positive,
            Some(p) if p < -5.0 => Self::Cautious,
            _ => Self::Neutral,
        }
    }

    pub const fn headline(self) -> &'static str {
        match self {
            Self::Positive => "POSITIVE OUTLOOK - Consider buying for potential gains",
            Self::Neutral => "NEUTRAL OUTLOOK - Hold current positions",
            Self::Cautious => "CAUTIOUS OUTLOOK - Monitor closely before investing",
        }
    }
}

/// Cut `text` to at most `max` characters, marking the cut with "..."
pub fn truncate(text: &str, max: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max) {
        Some((end, _)) => Cow::Owned(format!("{}...", &text[..end])),
        None => Cow::Borrowed(text),
    }
}

pub trait Formatter: Send + Sync {
    fn output_format(&self) -> OutputFormat;
    fn format_run(&self, run: &AnalysisRun) -> Result<String>;
    fn format_error(&self, error: &StockError) -> String;
}

/// Tables and capped narrative for a terminal
pub struct TextFormatter;

impl TextFormatter {
    fn price_table(report: &Report) -> Table {
        let quote = &report.quote;
        let change = match quote.change_percent() {
            Some(pct) => format!("${:+.2} ({pct:+.2}%)", quote.change()),
            None => format!("${:+.2}", quote.change()),
        };

        let mut table = Table::new();
        table.load_preset(UTF8_FULL).set_header(vec!["Price", "Value"]);
        table.add_row(vec!["Current Price".to_string(), format!("${:.2}", quote.current)]);
        table.add_row(vec![
            "Previous Close".to_string(),
            format!("${:.2}", quote.previous_close),
        ]);
        table.add_row(vec!["Day High".to_string(), format!("${:.2}", quote.high)]);
        table.add_row(vec!["Day Low".to_string(), format!("${:.2}", quote.low)]);
        table.add_row(vec!["Opening Price".to_string(), format!("${:.2}", quote.open)]);
        table.add_row(vec!["Change".to_string(), change]);
        table
    }

    fn prediction_table(report: &Report, predicted: f64, confidence: &str) -> Table {
        let current = report.quote.current;
        let expected = match report.expected_change() {
            Some((change, Some(pct))) => format!("${change:+.2} ({pct:+.2}%)"),
            Some((change, None)) => format!("${change:+.2}"),
            None => "n/a".to_string(),
        };

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_header(vec!["7-Day Prediction", "Value"]);
        table.add_row(vec!["Predicted Price".to_string(), format!("${predicted:.2}")]);
        table.add_row(vec!["Current Price".to_string(), format!("${current:.2}")]);
        table.add_row(vec!["Expected Change".to_string(), expected]);
        table.add_row(vec![
            "Confidence Level".to_string(),
            confidence.to_ascii_uppercase(),
        ]);
        table
    }

    fn narrative(out: &mut String, title: &str, section: &Section<String>, cap: usize) {
        let _ = writeln!(out, "\n== {title} ==");
        match section {
            Section::Ready { value } => {
                let _ = writeln!(out, "{}", truncate(value, cap));
            }
            Section::Failed { kind, message } => {
                let _ = writeln!(out, "[unavailable: {kind}] {message}");
            }
        }
    }

    fn report(out: &mut String, report: &Report) {
        let _ = writeln!(out, "\n##### {} Stock Analysis #####", report.ticker);
        let _ = writeln!(
            out,
            "Generated: {}",
            report.generated_at.format("%B %d, %Y at %H:%M UTC")
        );
        match &report.history_source {
            Section::Ready { value } => {
                let _ = writeln!(out, "History: {} daily bars from {value}", report.history.len());
            }
            Section::Failed { message, .. } => {
                let _ = writeln!(out, "History: unavailable ({message})");
            }
        }

        let _ = writeln!(out, "\n{}", Self::price_table(report));

        let _ = writeln!(out, "\n== 7-Day Price Prediction ==");
        match &report.prediction {
            Section::Ready { value } => {
                let _ = writeln!(
                    out,
                    "{}",
                    Self::prediction_table(report, value.predicted_price, value.confidence.as_str())
                );
                let _ = writeln!(out, "{}", truncate(&value.reasoning, REASONING_CAP));
            }
            Section::Failed { kind, message } => {
                let _ = writeln!(out, "[unavailable: {kind}] {message}");
            }
        }

        Self::narrative(out, "News & Sentiment Analysis", &report.news_analysis, NEWS_CAP);

        let _ = writeln!(out, "\n== Price Trend Analysis ==");
        match &report.price_analysis {
            Section::Ready { value } => {
                let _ = writeln!(out, "{}", truncate(&value.to_string(), PRICE_CAP));
            }
            Section::Failed { kind, message } => {
                let _ = writeln!(out, "[unavailable: {kind}] {message}");
            }
        }

        Self::narrative(out, "Financial Summary", &report.financial_report, REPORT_CAP);
        Self::narrative(out, "Investment Advice", &report.advice, ADVICE_CAP);

        let outlook = Outlook::from_percent(report.expected_change().and_then(|(_, pct)| pct));
        let _ = writeln!(out, "\n>> {}", outlook.headline());
    }
}

impl Formatter for TextFormatter {
    fn output_format(&self) -> OutputFormat {
        OutputFormat::Text
    }

    fn format_run(&self, run: &AnalysisRun) -> Result<String> {
        let mut out = String::new();
        let tickers: Vec<&str> = run.tickers.iter().map(|t| t.as_str()).collect();
        let _ = writeln!(out, "Tickers: {}", tickers.join(", "));

        for outcome in &run.outcomes {
            match outcome {
                TickerOutcome::Analyzed { report } => Self::report(&mut out, report),
                TickerOutcome::Failed {
                    ticker,
                    kind,
                    message,
                } => {
                    let _ = writeln!(out, "\n##### {ticker} #####\nAnalysis failed ({kind}): {message}");
                }
            }
        }

        let _ = write!(out, "\nDisclaimer: {DISCLAIMER}");
        Ok(out)
    }

    fn format_error(&self, error: &StockError) -> String {
        format!("Error: {error}")
    }
}

/// The run serialized as pretty JSON
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn output_format(&self) -> OutputFormat {
        OutputFormat::Json
    }

    fn format_run(&self, run: &AnalysisRun) -> Result<String> {
        Ok(serde_json::to_string_pretty(run)?)
    }

    fn format_error(&self, error: &StockError) -> String {
        serde_json::json!({
            "error": error.kind(),
            "message": error.to_string(),
        })
        .to_string()
    }
}

pub struct FormatterFactory;

impl FormatterFactory {
    pub fn create(format: OutputFormat) -> Box<dyn Formatter> {
        match format {
            OutputFormat::Text => Box::new(TextFormatter),
            OutputFormat::Json => Box::new(JsonFormatter),
        }
    }
}
