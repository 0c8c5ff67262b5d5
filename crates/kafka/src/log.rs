//! The event log contract.

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// A message fetched from the log, owned so it can outlive the client's
/// internal buffers while it is decoded and applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    /// Topic name
    pub topic: String,
    /// Partition number
    pub partition: i32,
    /// Offset within the partition
    pub offset: i64,
    /// Message key (if any)
    pub key: Option<Vec<u8>>,
    /// Raw payload; empty for tombstones
    pub payload: Vec<u8>,
    /// Message timestamp in milliseconds since epoch (if available)
    pub timestamp: Option<i64>,
}

/// Per-topic consumer with consumer-group offset tracking.
///
/// Each stream processor owns exactly one `EventLog`.
#[async_trait]
pub trait EventLog: Send + Sync {
    /// Wait for the next message of the assigned partitions.
    ///
    /// Must be cancel safe: dropping the returned future before it completes
    /// must not lose a message.
    async fn fetch(&self) -> Result<LogMessage>;

    /// Mark `message` (and everything before it on its partition) as processed.
    async fn commit(&self, message: &LogMessage) -> Result<()>;

    /// Leave the consumer group and release the client.
    async fn close(&self) -> Result<()>;
}

#[async_trait]
impl<T: EventLog + ?Sized> EventLog for Arc<T> {
    async fn fetch(&self) -> Result<LogMessage> {
        (**self).fetch().await
    }

    async fn commit(&self, message: &LogMessage) -> Result<()> {
        (**self).commit(message).await
    }

    async fn close(&self) -> Result<()> {
        (**self).close().await
    }
}
