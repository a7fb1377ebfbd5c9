use crate::app::ports::{FeedPort, NotifierPort};
use crate::error::Result;
use crate::formatter::MessageFormatter;
use crate::types::LogRecord;
use crate::watermark::WatermarkStore;
use tracing::{error, info, warn};

/// Use case for forwarding new feed entries to the chat.
///
/// One batch fetches the feed, keeps the entries newer than the watermark, sends them
/// in feed order and advances the watermark past every delivered entry. Delivery stops
/// at the first failure; the remaining entries are picked up again next cycle because
/// the watermark only covers what was delivered.
pub struct RelayUseCase {
    feed: Box<dyn FeedPort>,
    notifier: Box<dyn NotifierPort>,
    formatter: MessageFormatter,
    store: WatermarkStore,
}

impl RelayUseCase {
    pub fn new(
        feed: Box<dyn FeedPort>,
        notifier: Box<dyn NotifierPort>,
        formatter: MessageFormatter,
        store: WatermarkStore,
    ) -> Self {
        Self {
            feed,
            notifier,
            formatter,
            store,
        }
    }

    /// Run one batch and return the number of entries delivered.
    pub async fn handle_batch(&mut self) -> usize {
        let records = match self.feed.fetch().await {
            Ok(records) => records,
            Err(e) => {
                error!("Error while fetching the log feed: {}", e);
                crate::metrics::fetch_failed();
                return 0;
            }
        };
        if records.is_empty() {
            info!("No feed entries currently present");
            return 0;
        }

        let watermark = self.store.load();
        if watermark.is_none() {
            info!("No watermark found, sending the most recent entry only");
        }
        let pending = select(records, watermark);
        info!("{} new entries to send", pending.len());
        if pending.is_empty() {
            return 0;
        }

        let mut sent = 0;
        let mut delivered_up_to: Option<f64> = None;
        for record in &pending {
            info!(timestamp = record.timestamp, "Sending entry");
            let message = self.formatter.format(record);
            if !self.notifier.send(&message).await {
                warn!(
                    timestamp = record.timestamp,
                    remaining = pending.len() - sent,
                    "Delivery failed, stopping batch"
                );
                crate::metrics::send_failed();
                break;
            }
            crate::metrics::message_sent();
            sent += 1;
            delivered_up_to = Some(delivered_up_to.map_or(record.timestamp, |ts| ts.max(record.timestamp)));
        }

        if let Some(ts) = delivered_up_to {
            self.store.save(ts);
        }
        sent
    }

    /// Format the entries the next batch would send, without sending them or
    /// touching the watermark file.
    pub async fn preview(&mut self) -> Result<Vec<String>> {
        let records = self.feed.fetch().await?;
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let watermark = self.store.load();
        Ok(select(records, watermark)
            .iter()
            .map(|record| self.formatter.format(record))
            .collect())
    }
}

/// Entries newer than `watermark` in feed order, or only the newest entry when no
/// watermark exists yet.
pub fn select(records: Vec<LogRecord>, watermark: Option<f64>) -> Vec<LogRecord> {
    match watermark {
        Some(watermark) => records
            .into_iter()
            .filter(|record| record.timestamp > watermark)
            .collect(),
        None => records.into_iter().last().into_iter().collect(),
    }
}
