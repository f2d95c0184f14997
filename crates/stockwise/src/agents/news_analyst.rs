//! Sentiment summary of recent headlines

use super::chat::ChatAgent;
use crate::error::Result;
use crate::models::NewsItem;
use stockwise_core::Context;

/// Summary used when there are no headlines to analyze
pub const NO_NEWS_SUMMARY: &str =
    "No recent news was found for this stock, so there is no news sentiment to report.";

pub struct NewsAnalyst {
    chat: ChatAgent,
}

impl NewsAnalyst {
    pub fn new(chat: ChatAgent) -> Self {
        Self { chat }
    }

    /// One model call over the newline-joined headlines
    ///
    /// Long lists are sent as-is; an empty list returns [`NO_NEWS_SUMMARY`]
    /// without calling the model.
    pub async fn summarize(&self, headlines: &[NewsItem], ctx: &Context) -> Result<String> {
        if headlines.is_empty() {
            return Ok(NO_NEWS_SUMMARY.to_string());
        }

        let input = headlines
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");

        self.chat.ask(input, ctx).await
    }
}
