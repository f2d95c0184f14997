//! Prompt text for the model-backed stages
//!
//! - `system`: one system prompt per stage
//! - `user`: minijinja templates for the user messages that need
//!   interpolation

mod system;
mod user;

pub use system::*;
pub use user::{PredictionPrompt, financial_report, price_prediction, ticker_extraction};
