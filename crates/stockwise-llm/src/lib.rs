//! Chat-completion abstraction layer for stockwise
//!
//! This crate provides provider-agnostic types for talking to a
//! chat-completion endpoint:
//!
//! - Message types for role-tagged conversations
//! - Completion request/response types
//! - The [`LLMProvider`] trait every backend implements
//! - A Groq provider speaking the OpenAI-compatible wire format (feature `groq`)
//!
//! A completion either yields a [`CompletionResponse`] or a typed
//! [`LLMError`]; callers never have to sniff reply text for error markers.

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;

// Provider implementations (feature-gated)
#[cfg(feature = "groq")]
pub mod providers;
