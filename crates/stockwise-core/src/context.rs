//! Execution context for pipeline stages
//!
//! The `Context` struct carries per-run state to every stage: a flexible
//! key-value store for identifiers used in logs, the run's cancellation
//! token, and the timeout applied to each outbound call.

use crate::{CancellationToken, Error, Result};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

/// Well-known context keys
pub mod keys {
    /// Request ID assigned to one user query
    pub const REQUEST_ID: &str = "request_id";
    /// Ticker currently being analyzed
    pub const TICKER: &str = "ticker";
    /// Raw user query
    pub const QUERY: &str = "query";
}

/// Context passed to stages during execution
///
/// # Example
///
/// ```
/// use stockwise_core::Context;
/// use std::time::Duration;
///
/// let ctx = Context::new()
///     .with_request_id("req-123")
///     .with_ticker("AAPL")
///     .with_call_timeout(Duration::from_secs(10));
///
/// assert_eq!(ctx.request_id(), Some("req-123"));
/// assert_eq!(ctx.ticker(), Some("AAPL"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Key-value storage for context data
    data: HashMap<String, serde_json::Value>,
    cancellation: CancellationToken,
    call_timeout: Option<Duration>,
}

impl Context {
    /// Create a new empty context with no timeout and no cancellation
    pub fn new() -> Self {
        Self::default()
    }

    // =========== Builder Methods ===========

    /// Set the request ID
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.insert(keys::REQUEST_ID, serde_json::json!(request_id.into()));
        self
    }

    /// Set the ticker being analyzed
    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.insert(keys::TICKER, serde_json::json!(ticker.into()));
        self
    }

    /// Set the raw user query
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.insert(keys::QUERY, serde_json::json!(query.into()));
        self
    }

    /// Attach a cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Bound every guarded call by `timeout`
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    // =========== Common Accessors ===========

    /// Get the request ID
    pub fn request_id(&self) -> Option<&str> {
        self.get(keys::REQUEST_ID).and_then(|v| v.as_str())
    }

    /// Get the ticker being analyzed
    pub fn ticker(&self) -> Option<&str> {
        self.get(keys::TICKER).and_then(|v| v.as_str())
    }

    /// Get the raw user query
    pub fn query(&self) -> Option<&str> {
        self.get(keys::QUERY).and_then(|v| v.as_str())
    }

    /// Get the cancellation token
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Get the per-call timeout
    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout
    }

    // =========== Generic Key-Value Operations ===========

    /// Insert a value into the context
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Get a value from the context
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    // =========== Guarded Execution ===========

    /// Run `future` under this context's timeout and cancellation
    ///
    /// Fails fast with [`Error::Cancelled`] when the run is already
    /// cancelled; otherwise races the future against cancellation and the
    /// per-call timeout. The future is dropped when it loses the race.
    pub async fn guard<F, T>(&self, operation: &str, future: F) -> Result<T>
    where
        F: Future<Output = T>,
    {
        if self.cancellation.is_cancelled() {
            return Err(Error::Cancelled(operation.to_string()));
        }

        let bounded = async {
            match self.call_timeout {
                Some(limit) => tokio::time::timeout(limit, future)
                    .await
                    .map_err(|_| Error::Timeout {
                        operation: operation.to_string(),
                        limit,
                    }),
                None => Ok(future.await),
            }
        };

        tokio::select! {
            biased;
            () = self.cancellation.cancelled() => {
                tracing::debug!(operation, "Call cancelled");
                Err(Error::Cancelled(operation.to_string()))
            }
            result = bounded => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CancellationSource;

    #[test]
    fn test_insert_get() {
        let mut ctx = Context::new();
        assert_eq!(ctx.get("key"), None);

        ctx.insert("key", serde_json::json!("value"));
        assert_eq!(ctx.get("key"), Some(&serde_json::json!("value")));
    }

    #[test]
    fn test_builder_chain() {
        let ctx = Context::new()
            .with_request_id("req-1")
            .with_ticker("MSFT")
            .with_query("how is microsoft doing")
            .with_call_timeout(Duration::from_secs(5));

        assert_eq!(ctx.request_id(), Some("req-1"));
        assert_eq!(ctx.ticker(), Some("MSFT"));
        assert_eq!(ctx.query(), Some("how is microsoft doing"));
        assert_eq!(ctx.call_timeout(), Some(Duration::from_secs(5)));
        assert!(!ctx.cancellation().is_cancelled());
    }

    #[tokio::test]
    async fn test_guard_passes_through_value() {
        let ctx = Context::new().with_call_timeout(Duration::from_secs(1));
        let value = ctx.guard("add", async { 2 + 2 }).await;
        let value = tokio_test::assert_ok!(value);
        assert_eq!(value, 4);
    }

    #[tokio::test]
    async fn test_guard_times_out() {
        let ctx = Context::new().with_call_timeout(Duration::from_millis(10));
        let result = ctx
            .guard("slow", tokio::time::sleep(Duration::from_secs(5)))
            .await;

        match result {
            Err(Error::Timeout { operation, limit }) => {
                assert_eq!(operation, "slow");
                assert_eq!(limit, Duration::from_millis(10));
            }
            other => panic!("Expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_guard_fails_fast_when_cancelled() {
        let source = CancellationSource::new();
        let ctx = Context::new().with_cancellation(source.token());
        source.cancel();

        let result = ctx.guard("quote", async { 1 }).await;
        assert!(matches!(result, Err(Error::Cancelled(op)) if op == "quote"));
    }

    #[tokio::test]
    async fn test_guard_aborts_in_flight_call() {
        let source = CancellationSource::new();
        let ctx = Context::new().with_cancellation(source.token());

        let cancel = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            source.cancel();
        };
        let call = ctx.guard("history", tokio::time::sleep(Duration::from_secs(5)));

        let ((), result) = tokio::join!(cancel, call);
        assert!(matches!(result, Err(Error::Cancelled(_))));
    }
}
