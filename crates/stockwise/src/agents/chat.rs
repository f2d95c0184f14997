//! Single-shot chat stage shared by every model-backed agent

use crate::config::StockConfig;
use crate::error::Result;
use std::sync::Arc;
use stockwise_core::Context;
use stockwise_llm::{CompletionRequest, LLMProvider, Message};
use tracing::debug;

/// Configuration for a chat stage
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Model to use
    pub model: String,

    /// System prompt
    pub system_prompt: String,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Temperature for sampling
    pub temperature: f32,
}

impl ChatConfig {
    /// Analysis-model settings from `config` with the given system prompt
    pub fn analysis(config: &StockConfig, system_prompt: &str) -> Self {
        Self {
            model: config.analysis_model.clone(),
            system_prompt: system_prompt.to_string(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Extraction-model settings from `config` with the given system prompt
    pub fn extraction(config: &StockConfig, system_prompt: &str) -> Self {
        Self {
            model: config.extraction_model.clone(),
            ..Self::analysis(config, system_prompt)
        }
    }
}

/// System prompt plus one user message, one completion
///
/// The call runs under [`Context::guard`], so it honours the run's
/// timeout and cancellation.
pub struct ChatAgent {
    provider: Arc<dyn LLMProvider>,
    config: ChatConfig,
    name: String,
}

impl ChatAgent {
    pub fn new(provider: Arc<dyn LLMProvider>, config: ChatConfig, name: impl Into<String>) -> Self {
        Self {
            provider,
            config,
            name: name.into(),
        }
    }

    /// Get the agent's configuration
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Send `input` and return the reply text
    pub async fn ask(&self, input: impl Into<String>, context: &Context) -> Result<String> {
        let request = CompletionRequest::builder(&self.config.model)
            .messages(vec![Message::user(input)])
            .system(self.config.system_prompt.clone())
            .max_tokens(self.config.max_tokens)
            .temperature(self.config.temperature)
            .build();

        let response = context
            .guard(&self.name, self.provider.complete(request))
            .await??;

        debug!(
            agent = %self.name,
            provider = self.provider.name(),
            tokens = response.usage.total(),
            "Completion received"
        );

        Ok(response.text().to_string())
    }
}
