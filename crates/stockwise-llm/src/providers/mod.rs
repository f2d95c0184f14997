//! Concrete LLM provider implementations
//!
//! This module contains implementations of the LLMProvider trait for
//! hosted chat-completion services.

pub mod groq;

pub use groq::{GroqConfig, GroqProvider};
