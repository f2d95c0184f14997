//! NewsAPI client for recent headlines

use crate::error::{Result, StockError};
use crate::models::NewsItem;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Raw `/everything` payload
#[derive(Debug, Clone, Deserialize)]
pub struct EverythingResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Article {
    pub title: Option<String>,
    #[serde(default)]
    pub source: ArticleSource,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleSource {
    pub name: Option<String>,
}

impl EverythingResponse {
    /// Headlines in provider order; untitled articles are skipped
    pub fn into_items(self) -> Result<Vec<NewsItem>> {
        if self.status != "ok" {
            return Err(StockError::ApiError(format!(
                "NewsAPI status '{}': {}",
                self.status,
                self.message.unwrap_or_default()
            )));
        }

        Ok(self
            .articles
            .into_iter()
            .filter_map(|article| {
                let title = article.title.filter(|t| !t.trim().is_empty())?;
                let source = article.source.name.unwrap_or_else(|| "Unknown".to_string());
                Some(NewsItem::new(title, source))
            })
            .collect())
    }
}

/// NewsAPI REST client
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl NewsApiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: crate::config::DEFAULT_NEWS_API_BASE.to_string(),
        }
    }

    /// Point the client at another base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Bound each HTTP request at the transport level
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    /// Latest English articles matching `query`, newest first
    pub async fn everything(&self, query: &str, page_size: u32) -> Result<Vec<NewsItem>> {
        let url = format!("{}/everything", self.base_url);
        debug!(%url, query, page_size, "NewsAPI request");

        let page_size = page_size.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("sortBy", "publishedAt"),
                ("language", "en"),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| StockError::ApiError(format!("NewsAPI request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(StockError::RateLimitExceeded {
                provider: "newsapi".to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StockError::ApiError(format!(
                "NewsAPI error {status}: {body}"
            )));
        }

        let payload: EverythingResponse = response.json().await.map_err(|e| {
            StockError::MalformedResponse(format!("Failed to parse NewsAPI response: {e}"))
        })?;
        payload.into_items()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_from_payload() {
        let payload: EverythingResponse = serde_json::from_str(
            r#"{
                "status": "ok",
                "totalResults": 3,
                "articles": [
                    {"title": "Apple beats estimates", "source": {"id": null, "name": "Reuters"}},
                    {"title": null, "source": {"name": "Nowhere"}},
                    {"title": "Apple shares climb", "source": {"id": "x"}}
                ]
            }"#,
        )
        .unwrap();

        let items = payload.into_items().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].to_string(), "Apple beats estimates - Reuters");
        assert_eq!(items[1].source, "Unknown");
    }

    #[test]
    fn test_error_status() {
        let payload: EverythingResponse = serde_json::from_str(
            r#"{"status": "error", "code": "apiKeyInvalid", "message": "Your API key is invalid"}"#,
        )
        .unwrap();

        match payload.into_items() {
            Err(StockError::ApiError(msg)) => assert!(msg.contains("invalid")),
            other => panic!("Expected ApiError, got {other:?}"),
        }
    }

    #[test]
    fn test_base_url_trimmed() {
        let client = NewsApiClient::new("key").with_base_url("http://localhost:8080/v2/");
        assert_eq!(client.base_url, "http://localhost:8080/v2");
    }
}
