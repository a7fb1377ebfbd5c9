use crate::error::Result;
use crate::types::LogRecord;
use async_trait::async_trait;

/// Source of feed entries, ordered oldest to newest.
#[async_trait]
pub trait FeedPort: Send + Sync {
    async fn fetch(&self) -> Result<Vec<LogRecord>>;
}

/// Destination chat. Returns `false` when the message was not delivered; failures
/// are logged by the implementation and never propagate.
#[async_trait]
pub trait NotifierPort: Send + Sync {
    async fn send(&self, message: &str) -> bool;
}
