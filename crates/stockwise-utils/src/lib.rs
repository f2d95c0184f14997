//! Shared utilities for stockwise
//!
//! This crate provides common functionality used across the stockwise
//! workspace: tracing setup and environment-variable helpers used when
//! loading configuration at process start.

pub mod env;
pub mod logging;

pub use env::{EnvError, env_or, env_parse, require_env};
pub use logging::{LogFormat, init_tracing, init_tracing_with};
