//! Buy/hold/sell guidance from the combined report

use super::chat::ChatAgent;
use crate::error::Result;
use stockwise_core::Context;

pub struct FinalAnswer {
    chat: ChatAgent,
}

impl FinalAnswer {
    pub fn new(chat: ChatAgent) -> Self {
        Self { chat }
    }

    /// Free-form advice, returned as the model wrote it
    pub async fn advise(&self, summary: &str, ctx: &Context) -> Result<String> {
        self.chat.ask(summary, ctx).await
    }
}
