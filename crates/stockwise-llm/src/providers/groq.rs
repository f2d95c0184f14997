//! Groq provider implementation
//!
//! Groq serves an OpenAI-compatible chat-completions endpoint, so this
//! provider speaks that wire format.
//! See: https://console.groq.com/docs/api-reference#chat
//!
//! # Example
//!
//! ```no_run
//! use stockwise_llm::{CompletionRequest, Message, LLMProvider};
//! use stockwise_llm::providers::GroqProvider;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads GROQ_API_KEY (and optionally GROQ_API_BASE)
//!     let provider = GroqProvider::from_env()?;
//!
//!     let request = CompletionRequest::builder("llama-3.3-70b-versatile")
//!         .add_message(Message::user("Hello!"))
//!         .max_tokens(100)
//!         .build();
//!
//!     let response = provider.complete(request).await?;
//!     println!("{}", response.text());
//!
//!     Ok(())
//! }
//! ```

use crate::{
    CompletionRequest, CompletionResponse, LLMError, LLMProvider, Message, Result, StopReason,
    TokenUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for the Groq provider
#[derive(Debug, Clone)]
pub struct GroqConfig {
    /// API key for authentication
    pub api_key: String,

    /// Base URL of the OpenAI-compatible API
    pub api_base: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,

    /// Models accepted by this provider; `None` accepts any model
    pub supported_models: Option<Vec<String>>,
}

impl GroqConfig {
    /// Create a new config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_GROQ_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            supported_models: None,
        }
    }

    /// Create config from `GROQ_API_KEY` and, if set, `GROQ_API_BASE`
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GROQ_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                LLMError::ConfigurationError("GROQ_API_KEY environment variable not set".to_string())
            })?;

        let api_base =
            std::env::var("GROQ_API_BASE").unwrap_or_else(|_| DEFAULT_GROQ_API_BASE.to_string());

        Ok(Self::new(api_key).with_api_base(api_base))
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Restrict the provider to the given models
    pub fn with_supported_models(mut self, models: Vec<String>) -> Self {
        self.supported_models = Some(models);
        self
    }
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// Groq chat-completions provider
pub struct GroqProvider {
    client: Client,
    config: GroqConfig,
}

impl GroqProvider {
    /// Create a provider with custom configuration
    pub fn with_config(config: GroqConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a provider with an API key and default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(GroqConfig::new(api_key))
    }

    /// Create a provider from the environment
    pub fn from_env() -> Result<Self> {
        Self::with_config(GroqConfig::from_env()?)
    }

    /// Get the current configuration
    pub fn config(&self) -> &GroqConfig {
        &self.config
    }

    fn validate_model(&self, model: &str) -> Result<()> {
        if let Some(supported) = &self.config.supported_models {
            if !supported.iter().any(|m| m == model) {
                return Err(LLMError::InvalidRequest(format!(
                    "Model '{model}' is not in the supported models list: {supported:?}"
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl LLMProvider for GroqProvider {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.validate_model(&request.model)?;

        let body = ChatRequest {
            model: request.model.clone(),
            messages: build_wire_messages(request.system, &request.messages),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;

            return Err(match status.as_u16() {
                401 => LLMError::AuthenticationFailed,
                429 => LLMError::RateLimitExceeded(error_text),
                400 => LLMError::InvalidRequest(error_text),
                404 => LLMError::ModelNotFound(request.model),
                _ => LLMError::RequestFailed(format!("HTTP {status}: {error_text}")),
            });
        }

        let raw = response.text().await?;
        let completion = parse_chat_response(&raw)?;

        debug!(
            stop_reason = ?completion.stop_reason,
            input_tokens = completion.usage.input_tokens,
            output_tokens = completion.usage.output_tokens,
            "Received completion"
        );

        Ok(completion)
    }

    fn name(&self) -> &'static str {
        "groq"
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: ChatUsage,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

/// System prompt first, then the conversation in order
fn build_wire_messages(system: Option<String>, messages: &[Message]) -> Vec<WireMessage> {
    system
        .map(|content| WireMessage {
            role: "system",
            content,
        })
        .into_iter()
        .chain(messages.iter().map(|msg| WireMessage {
            role: msg.role.as_str(),
            content: msg.content.clone(),
        }))
        .collect()
}

fn parse_chat_response(raw: &str) -> Result<CompletionResponse> {
    let parsed: ChatResponse = serde_json::from_str(raw)
        .map_err(|e| LLMError::UnexpectedResponse(format!("Failed to parse response: {e}")))?;

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LLMError::UnexpectedResponse("No choices in response".to_string()))?;

    let text = choice
        .message
        .content
        .filter(|text| !text.trim().is_empty())
        .ok_or(LLMError::EmptyContent)?;

    Ok(CompletionResponse {
        message: Message::assistant(text),
        stop_reason: map_stop_reason(choice.finish_reason.as_deref()),
        usage: TokenUsage {
            input_tokens: parsed.usage.prompt_tokens,
            output_tokens: parsed.usage.completion_tokens,
        },
    })
}

fn map_stop_reason(reason: Option<&str>) -> StopReason {
    match reason {
        Some("length") => StopReason::MaxTokens,
        Some("stop") | None => StopReason::EndTurn,
        Some(other) => {
            debug!("Unknown stop reason: {}", other);
            StopReason::EndTurn
        }
    }
}
