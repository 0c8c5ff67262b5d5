use crate::error::{Error, Result};
use crate::log::{EventLog, LogMessage};
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer as RdkafkaConsumer, StreamConsumer};
use rdkafka::message::Message as RdkafkaMessage;
use rdkafka::{Offset, TopicPartitionList};
use std::time::Duration;

/// Configuration for one Kafka consumer
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Kafka brokers (comma-separated list)
    pub brokers: String,
    /// Consumer group ID
    ///
    /// Offsets are tracked per group, so every topic gets its own group.
    pub group_id: String,
    /// Topic to consume from
    ///
    /// One consumer per topic: SMS events and user status events are
    /// independent pipelines.
    pub topic: String,
    /// Auto offset reset strategy ("earliest" or "latest")
    ///
    /// "earliest" means the consumer will start from the beginning of the topic
    /// if no committed offsets are found for the consumer group.
    pub auto_offset_reset: String,
    /// Session timeout in milliseconds
    pub session_timeout_ms: String,
    /// Minimum bytes the broker accumulates before answering a fetch
    pub fetch_min_bytes: usize,
    /// Maximum bytes returned by one fetch
    pub fetch_max_bytes: usize,
    /// Maximum time the broker waits for `fetch_min_bytes`
    pub fetch_max_wait: Duration,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            brokers: "kafka:9092".to_string(),
            group_id: "".to_string(),
            topic: "".to_string(),
            auto_offset_reset: "earliest".to_string(),
            session_timeout_ms: "6000".to_string(),
            fetch_min_bytes: 1,
            fetch_max_bytes: 10_000_000,
            fetch_max_wait: Duration::from_secs(1),
        }
    }
}

impl ConsumerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.brokers.trim().is_empty() {
            return Err(Error::InvalidConfig("no brokers configured".to_string()));
        }
        if self.topic.is_empty() {
            return Err(Error::InvalidConfig("topic must not be empty".to_string()));
        }
        if self.group_id.is_empty() {
            return Err(Error::InvalidConfig(
                "group id must not be empty".to_string(),
            ));
        }
        if self.fetch_min_bytes == 0 || self.fetch_min_bytes > self.fetch_max_bytes {
            return Err(Error::InvalidConfig(format!(
                "fetch size bounds must satisfy 0 < min ({}) <= max ({})",
                self.fetch_min_bytes, self.fetch_max_bytes
            )));
        }
        Ok(())
    }

    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", &self.brokers)
            .set("group.id", &self.group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", &self.auto_offset_reset)
            .set("session.timeout.ms", &self.session_timeout_ms)
            .set("fetch.min.bytes", self.fetch_min_bytes.to_string())
            .set("fetch.max.bytes", self.fetch_max_bytes.to_string())
            .set(
                "fetch.wait.max.ms",
                self.fetch_max_wait.as_millis().to_string(),
            )
            .set("enable.partition.eof", "false");
        config
    }
}

/// Kafka consumer with manual offset management
pub struct KafkaConsumer {
    consumer: StreamConsumer,
    topic: String,
}

impl KafkaConsumer {
    /// Create the consumer and subscribe it to the configured topic
    pub fn new(config: &ConsumerConfig) -> Result<Self> {
        config.validate()?;

        let consumer: StreamConsumer = config
            .client_config()
            .create()
            .map_err(|e| Error::Consumer(format!("Failed to create consumer: {e}")))?;

        consumer
            .subscribe(&[&config.topic])
            .map_err(|e| Error::Consumer(format!("Failed to subscribe to topic: {e}")))?;

        tracing::info!(
            topic = %config.topic,
            group_id = %config.group_id,
            "Kafka consumer subscribed"
        );

        Ok(Self {
            consumer,
            topic: config.topic.clone(),
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

#[async_trait]
impl EventLog for KafkaConsumer {
    async fn fetch(&self) -> Result<LogMessage> {
        // recv() is cancel safe
        let msg = self.consumer.recv().await?;
        Ok(LogMessage {
            topic: msg.topic().to_string(),
            partition: msg.partition(),
            offset: msg.offset(),
            key: msg.key().map(|k| k.to_vec()),
            payload: msg.payload().map(|p| p.to_vec()).unwrap_or_default(),
            timestamp: msg.timestamp().to_millis(),
        })
    }

    async fn commit(&self, message: &LogMessage) -> Result<()> {
        let mut tpl = TopicPartitionList::new();
        // Committed offset is the next one to read
        tpl.add_partition_offset(
            &message.topic,
            message.partition,
            Offset::Offset(message.offset + 1),
        )
        .map_err(|e| Error::Commit(format!("Failed to add partition offset: {e}")))?;

        self.consumer
            .commit(&tpl, CommitMode::Sync)
            .map_err(|e| Error::Commit(format!("Failed to commit offset: {e}")))
    }

    async fn close(&self) -> Result<()> {
        self.consumer.unsubscribe();
        tracing::info!(topic = %self.topic, "Kafka consumer closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ConsumerConfig {
        ConsumerConfig {
            group_id: "sms-store-group-v2".to_string(),
            topic: "sms-topic".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config_starts_from_beginning() {
        let config = ConsumerConfig::default();
        assert_eq!(config.auto_offset_reset, "earliest");
        assert_eq!(config.fetch_min_bytes, 1);
        assert_eq!(config.fetch_max_bytes, 10_000_000);
        assert_eq!(config.fetch_max_wait, Duration::from_secs(1));
    }

    #[test]
    fn test_validate() {
        assert!(config().validate().is_ok());

        let missing_topic = ConsumerConfig {
            topic: String::new(),
            ..config()
        };
        assert!(matches!(
            missing_topic.validate(),
            Err(Error::InvalidConfig(_))
        ));

        let inverted = ConsumerConfig {
            fetch_min_bytes: 100,
            fetch_max_bytes: 10,
            ..config()
        };
        assert!(matches!(inverted.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_client_config_disables_auto_commit() {
        let client_config = config().client_config();
        assert_eq!(client_config.get("enable.auto.commit"), Some("false"));
        assert_eq!(client_config.get("fetch.wait.max.ms"), Some("1000"));
        assert_eq!(client_config.get("group.id"), Some("sms-store-group-v2"));
    }
}
