//! Recent headlines for one ticker

use crate::api::NewsApiClient;
use crate::error::Result;
use crate::models::{NewsItem, TickerSymbol};
use async_trait::async_trait;
use std::sync::Arc;
use stockwise_core::Context;
use tracing::debug;

/// Anything that can list recent headlines for a symbol
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Up to `page_size` English headlines, newest first
    async fn headlines(&self, symbol: &TickerSymbol, page_size: u32) -> Result<Vec<NewsItem>>;
}

#[async_trait]
impl NewsSource for NewsApiClient {
    async fn headlines(&self, symbol: &TickerSymbol, page_size: u32) -> Result<Vec<NewsItem>> {
        self.everything(symbol.as_str(), page_size).await
    }
}

/// Fetches headlines under the run's timeout and cancellation
pub struct NewsRetriever {
    source: Arc<dyn NewsSource>,
    page_size: u32,
}

impl NewsRetriever {
    pub fn new(source: Arc<dyn NewsSource>, page_size: u32) -> Self {
        Self { source, page_size }
    }

    /// Headlines for `ticker`
    ///
    /// An empty list means the provider had nothing recent; a fetch
    /// failure is an error, never a placeholder headline.
    pub async fn fetch_news(&self, ticker: &TickerSymbol, ctx: &Context) -> Result<Vec<NewsItem>> {
        let items = ctx
            .guard("news", self.source.headlines(ticker, self.page_size))
            .await??;
        debug!(%ticker, count = items.len(), "Fetched headlines");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::stubs::StubNews;
    use crate::error::FailureKind;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fetch_news() {
        let retriever = NewsRetriever::new(
            Arc::new(StubNews::items(&[("Apple rallies", "Reuters")])),
            5,
        );
        let ticker = TickerSymbol::parse("AAPL").unwrap();

        let items = retriever.fetch_news(&ticker, &Context::new()).await.unwrap();
        assert_eq!(items, vec![NewsItem::new("Apple rallies", "Reuters")]);
    }

    #[tokio::test]
    async fn test_failure_is_an_error_not_a_headline() {
        let retriever = NewsRetriever::new(Arc::new(StubNews::failing()), 5);
        let ticker = TickerSymbol::parse("AAPL").unwrap();

        let err = retriever
            .fetch_news(&ticker, &Context::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
    }

    #[tokio::test]
    async fn test_slow_source_times_out() {
        let retriever = NewsRetriever::new(Arc::new(StubNews::hanging()), 5);
        let ticker = TickerSymbol::parse("AAPL").unwrap();
        let ctx = Context::new().with_call_timeout(Duration::from_millis(10));

        let err = retriever.fetch_news(&ticker, &ctx).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Timeout);
    }
}
