//! Combined narrative over the news and price analyses

use super::chat::ChatAgent;
use crate::error::Result;
use crate::prompts;
use stockwise_core::Context;

pub struct FinancialReporter {
    chat: ChatAgent,
}

impl FinancialReporter {
    pub fn new(chat: ChatAgent) -> Self {
        Self { chat }
    }

    /// One model call over both summaries, labelled; the reply is opaque
    pub async fn combine(&self, news: &str, price: &str, ctx: &Context) -> Result<String> {
        let input = prompts::financial_report(news, price)?;
        self.chat.ask(input, ctx).await
    }
}
