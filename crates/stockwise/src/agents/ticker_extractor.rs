//! Free-text query to ticker symbols

use super::chat::ChatAgent;
use crate::error::{Result, StockError};
use crate::models::TickerSymbol;
use crate::prompts;
use regex::Regex;
use stockwise_core::Context;
use tracing::{debug, warn};

pub struct TickerExtractor {
    chat: ChatAgent,
}

impl TickerExtractor {
    pub fn new(chat: ChatAgent) -> Self {
        Self { chat }
    }

    /// Ticker symbols named in `query`, in first-mention order
    ///
    /// Never fails: a model error or an unparseable reply yields an empty
    /// list, which callers treat as "no ticker found".
    pub async fn extract(&self, query: &str, ctx: &Context) -> Vec<TickerSymbol> {
        let reply = match self.ask(query, ctx).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Ticker extraction call failed");
                return Vec::new();
            }
        };
        debug!(%reply, "Ticker extraction reply");

        match parse_tickers(&reply) {
            Ok(tickers) => tickers,
            Err(e) => {
                warn!(error = %e, "Could not parse ticker list");
                Vec::new()
            }
        }
    }

    async fn ask(&self, query: &str, ctx: &Context) -> Result<String> {
        let input = prompts::ticker_extraction(query)?;
        self.chat.ask(input, ctx).await
    }
}

/// Decode the first single-line `[...]` list in a model reply
///
/// Accepts JSON lists and Python-style single-quoted lists. Entries that
/// are not valid symbols are dropped, as are repeats.
pub fn parse_tickers(reply: &str) -> Result<Vec<TickerSymbol>> {
    let list_re = Regex::new(r"\[.*?\]").map_err(|e| StockError::ParseFailure(e.to_string()))?;

    let literal = list_re
        .find(reply)
        .ok_or_else(|| StockError::ParseFailure("no list found in reply".to_string()))?
        .as_str();

    let raw: Vec<String> = serde_json::from_str(literal)
        .or_else(|_| serde_json::from_str(&literal.replace('\'', "\"")))
        .map_err(|e| StockError::ParseFailure(format!("invalid ticker list {literal}: {e}")))?;

    let mut tickers: Vec<TickerSymbol> = Vec::with_capacity(raw.len());
    for candidate in raw {
        match TickerSymbol::parse(&candidate) {
            Ok(symbol) if !tickers.contains(&symbol) => tickers.push(symbol),
            Ok(_) => {}
            Err(e) => debug!(error = %e, "Skipping ticker candidate"),
        }
    }

    Ok(tickers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::chat::ChatConfig;
    use crate::agents::stubs::{FailingProvider, ScriptedProvider};
    use std::sync::Arc;
    use stockwise_llm::LLMProvider;

    fn extractor(provider: Arc<dyn LLMProvider>) -> TickerExtractor {
        let config = ChatConfig {
            model: "extract".to_string(),
            system_prompt: prompts::TICKER_EXTRACTOR.to_string(),
            max_tokens: 64,
            temperature: 0.4,
        };
        TickerExtractor::new(ChatAgent::new(provider, config, "ticker_extractor"))
    }

    fn symbols(tickers: &[TickerSymbol]) -> Vec<&str> {
        tickers.iter().map(TickerSymbol::as_str).collect()
    }

    #[test]
    fn test_parse_json_list() {
        let tickers = parse_tickers(r#"Here you go: ["TSLA", "MSFT"]"#).unwrap();
        assert_eq!(symbols(&tickers), ["TSLA", "MSFT"]);
    }

    #[test]
    fn test_parse_single_quoted_list() {
        let tickers = parse_tickers("['aapl', 'nvda']").unwrap();
        assert_eq!(symbols(&tickers), ["AAPL", "NVDA"]);
    }

    #[test]
    fn test_parse_empty_list() {
        assert!(parse_tickers("[]").unwrap().is_empty());
    }

    #[test]
    fn test_first_list_wins() {
        let tickers = parse_tickers(r#"["AMZN"] and later ["GOOG"]"#).unwrap();
        assert_eq!(symbols(&tickers), ["AMZN"]);
    }

    #[test]
    fn test_drops_invalid_and_duplicate_entries() {
        let tickers = parse_tickers(r#"["AAPL", "TOOLONGX", "aapl", "BRK B", "F"]"#).unwrap();
        assert_eq!(symbols(&tickers), ["AAPL", "F"]);
    }

    #[test]
    fn test_unparseable_replies() {
        assert!(parse_tickers("I could not find any tickers.").is_err());
        assert!(parse_tickers("[not, a, list]").is_err());
        assert!(parse_tickers("[\n\"AAPL\"\n]").is_err());
        assert!(parse_tickers("[1, 2]").is_err());
    }

    #[tokio::test]
    async fn test_extract_two_companies() {
        let provider = Arc::new(ScriptedProvider::always(r#"["TSLA", "MSFT"]"#));
        let tickers = extractor(provider.clone())
            .extract("Compare Tesla and Microsoft", &Context::new())
            .await;

        let mut found = symbols(&tickers);
        found.sort_unstable();
        assert_eq!(found, ["MSFT", "TSLA"]);

        let request = &provider.requests()[0];
        assert_eq!(request.model, "extract");
        assert!(request.messages[0].content.contains("Compare Tesla and Microsoft"));
    }

    #[tokio::test]
    async fn test_extract_nonsense_is_empty() {
        let provider = Arc::new(ScriptedProvider::always("[]"));
        let tickers = extractor(provider)
            .extract("asdf qwer", &Context::new())
            .await;
        assert!(tickers.is_empty());
    }

    #[tokio::test]
    async fn test_extract_model_failure_is_empty() {
        let tickers = extractor(Arc::new(FailingProvider))
            .extract("Tell me about Apple", &Context::new())
            .await;
        assert!(tickers.is_empty());
    }
}
