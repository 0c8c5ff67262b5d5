//! Kafka producer library for sms-store
//!
//! Publishes JSON-encoded SMS and user status events, the same wire format the
//! stream processors decode. Used by the `sms-producer` binary and by the
//! end-to-end tests.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sms_store_kafka_producer::EventProducer;
//! use sms_types::UserStatus;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let producer = EventProducer::new("localhost:9092")?;
//!     producer.create_topic_if_not_exists("sms-topic", 3).await?;
//!
//!     producer.send_sms("sms-topic", "9876543210", "hi", "SUCCESS").await?;
//!     producer
//!         .send_user_status("user-topic", "9876543210", UserStatus::Blocked)
//!         .await?;
//!     Ok(())
//! }
//! ```

use anyhow::{bail, Context, Result};
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::ClientConfig;
use sms_types::{is_valid_mobile_number, Keyed, SmsEvent, UserStatus, UserStatusEvent};
use std::time::Duration;

/// Longest accepted SMS body, in characters.
pub const MAX_MESSAGE_LEN: usize = 200;

/// Check an SMS before it is published.
pub fn validate_sms(mobile_number: &str, message: &str) -> Result<()> {
    validate_mobile_number(mobile_number)?;
    if message.trim().is_empty() {
        bail!("Message content is required.");
    }
    if message.chars().count() > MAX_MESSAGE_LEN {
        bail!("Message is too long (max {MAX_MESSAGE_LEN} chars).");
    }
    Ok(())
}

pub fn validate_mobile_number(mobile_number: &str) -> Result<()> {
    if mobile_number.trim().is_empty() {
        bail!("Mobile number cannot be empty.");
    }
    if !is_valid_mobile_number(mobile_number) {
        bail!("Mobile number must be exactly 10 digits.");
    }
    Ok(())
}

/// Kafka producer wrapper publishing sms-store events
pub struct EventProducer {
    producer: FutureProducer,
    broker: String,
}

impl EventProducer {
    /// Create a new producer for the given broker list
    pub fn new(broker: &str) -> Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", broker)
            .set("message.timeout.ms", "5000")
            .create()
            .context("Failed to create Kafka producer")?;

        Ok(Self {
            producer,
            broker: broker.to_string(),
        })
    }

    /// Create Kafka topic if it doesn't exist
    pub async fn create_topic_if_not_exists(&self, topic: &str, partitions: i32) -> Result<()> {
        let admin_client: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", &self.broker)
            .create()
            .context("Failed to create admin client")?;

        let new_topic = NewTopic::new(topic, partitions, TopicReplication::Fixed(1));
        let opts = AdminOptions::new().operation_timeout(Some(Duration::from_secs(5)));

        let results = admin_client
            .create_topics(&[new_topic], &opts)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create topics: {e}"))?;
        for result in results {
            match result {
                Ok(topic_name) => tracing::info!("Topic '{topic_name}' created successfully"),
                Err((topic_name, err)) if err.to_string().contains("already exists") => {
                    tracing::info!("Topic '{topic_name}' already exists")
                }
                Err((_, err)) => bail!("Failed to create topic: {err}"),
            }
        }

        Ok(())
    }

    /// Validate and publish an SMS event
    pub async fn send_sms(
        &self,
        topic: &str,
        mobile_number: &str,
        message: &str,
        status: &str,
    ) -> Result<()> {
        validate_sms(mobile_number, message)?;
        self.publish_sms(
            topic,
            &SmsEvent {
                mobile_number: mobile_number.to_string(),
                message: message.to_string(),
                status: status.to_string(),
            },
        )
        .await
    }

    /// Validate and publish a user status event
    pub async fn send_user_status(
        &self,
        topic: &str,
        mobile_number: &str,
        status: UserStatus,
    ) -> Result<()> {
        validate_mobile_number(mobile_number)?;
        self.publish_user_status(
            topic,
            &UserStatusEvent {
                mobile_number: mobile_number.to_string(),
                status,
            },
        )
        .await
    }

    /// Publish an SMS event as-is, keyed by mobile number
    pub async fn publish_sms(&self, topic: &str, event: &SmsEvent) -> Result<()> {
        let payload = serde_json::to_vec(event).context("Failed to encode SMS event")?;
        self.publish_raw(topic, Some(event.key()), &payload).await
    }

    /// Publish a user status event as-is, keyed by mobile number
    pub async fn publish_user_status(&self, topic: &str, event: &UserStatusEvent) -> Result<()> {
        let payload = serde_json::to_vec(event).context("Failed to encode user status event")?;
        self.publish_raw(topic, Some(event.key()), &payload).await
    }

    /// Publish arbitrary bytes, e.g. a malformed payload
    pub async fn publish_raw(&self, topic: &str, key: Option<&str>, payload: &[u8]) -> Result<()> {
        let mut record = FutureRecord::<str, [u8]>::to(topic).payload(payload);
        if let Some(key) = key {
            record = record.key(key);
        }

        let delivery = self
            .producer
            .send(record, Duration::from_secs(5))
            .await
            .map_err(|(err, _)| err)
            .context("Failed to send message to Kafka")?;

        tracing::debug!("Published to {topic}: {delivery:?}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sms() {
        assert!(validate_sms("9876543210", "hello").is_ok());
        assert!(validate_sms("9876543210", &"x".repeat(MAX_MESSAGE_LEN)).is_ok());

        let err = validate_sms("", "hello").unwrap_err();
        assert_eq!(err.to_string(), "Mobile number cannot be empty.");
        let err = validate_sms("98765", "hello").unwrap_err();
        assert_eq!(err.to_string(), "Mobile number must be exactly 10 digits.");
        let err = validate_sms("98765abcde", "hello").unwrap_err();
        assert_eq!(err.to_string(), "Mobile number must be exactly 10 digits.");
        let err = validate_sms("9876543210", "   ").unwrap_err();
        assert_eq!(err.to_string(), "Message content is required.");
        assert!(validate_sms("9876543210", &"x".repeat(MAX_MESSAGE_LEN + 1)).is_err());
    }

    #[test]
    fn test_wire_format_round_trips_through_decoder() {
        use sms_types::Decode;

        let event = UserStatusEvent {
            mobile_number: "9876543210".to_string(),
            status: UserStatus::Blocked,
        };
        let payload = serde_json::to_vec(&event).unwrap();
        assert_eq!(
            std::str::from_utf8(&payload).unwrap(),
            r#"{"mobileNumber":"9876543210","status":"BLOCKED"}"#
        );
        assert_eq!(UserStatusEvent::decode(&payload).unwrap(), event);
    }
}
