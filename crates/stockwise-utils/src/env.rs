//! Environment variable helpers

use std::str::FromStr;
use thiserror::Error;

/// Errors raised while reading configuration from the environment
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    /// A required variable is not set (or is blank)
    #[error("{0} environment variable not set")]
    Missing(String),

    /// A variable is set but cannot be parsed
    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        name: String,
        value: String,
        reason: String,
    },
}

/// Read a required, non-blank variable
pub fn require_env(name: &str) -> Result<String, EnvError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(EnvError::Missing(name.to_string())),
    }
}

/// Read a variable or fall back to `default`
pub fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Read and parse an optional variable
///
/// Unset or blank variables yield `Ok(None)`.
pub fn env_parse<T>(name: &str) -> Result<Option<T>, EnvError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Ok(raw) = std::env::var(name) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|e| EnvError::Invalid {
            name: name.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        })
}
