//! Error types for stockwise-core

use std::time::Duration;
use thiserror::Error;

/// Result type alias for stockwise-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error raised by a guarded call
#[derive(Error, Debug)]
pub enum Error {
    /// An outbound call exceeded the per-call timeout
    #[error("{operation} timed out after {}s", limit.as_secs_f64())]
    Timeout {
        /// Name of the guarded operation
        operation: String,
        /// Limit that was exceeded
        limit: Duration,
    },

    /// The run was cancelled before the call completed
    #[error("{0} was cancelled")]
    Cancelled(String),
}
