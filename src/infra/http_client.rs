use crate::app::ports::FeedPort;
use crate::error::Result;
use crate::types::{FeedResponse, LogRecord};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Shared HTTP client for the feed and the bot API, with a per-request timeout.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Fetches the JSON log feed over HTTP.
pub struct ReqwestFeed {
    client: reqwest::Client,
    url: String,
}

impl ReqwestFeed {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl FeedPort for ReqwestFeed {
    async fn fetch(&self) -> Result<Vec<LogRecord>> {
        let body = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let feed: FeedResponse = serde_json::from_str(&body)?;
        debug!("Fetched {} feed entries from {}", feed.logs.len(), self.url);
        Ok(feed.logs)
    }
}
