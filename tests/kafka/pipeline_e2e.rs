//! Publish events with the producer library and read them back through the
//! running service.
//!
//! Test flow:
//! 1. Create both topics
//! 2. Start the service against Kafka and a fresh MongoDB database
//! 3. Publish SMS events, user status changes and one malformed payload
//! 4. Wait until the documents appear, then verify them through the store

use sms_store::{KafkaOpts, ServerOpts, Service};
use sms_store_kafka::KafkaConsumer;
use sms_store_kafka_producer::EventProducer;
use sms_store_mongodb::{
    DocumentStore, MongoStore, MongoStoreOpts, SmsRepository, UserRepository,
};
use sms_types::UserStatus;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Kafka broker address for testing
const KAFKA_BROKER: &str = "kafka:9092";
const MONGO_URI: &str = "mongodb://mongodb:27017";

fn unique_suffix() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}

#[tokio::test]
#[ignore = "Requires Kafka and MongoDB"]
async fn test_pipeline_end_to_end() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    let suffix = unique_suffix();
    let kafka = KafkaOpts {
        kafka_brokers: vec![KAFKA_BROKER.to_string()],
        sms_topic: format!("sms-topic-{suffix}"),
        sms_group_id: format!("sms-group-{suffix}"),
        user_topic: format!("user-topic-{suffix}"),
        user_group_id: format!("user-group-{suffix}"),
        fetch_min_bytes: 1,
        fetch_max_bytes: 10_000_000,
        fetch_max_wait: Duration::from_millis(500),
        session_timeout_ms: "6000".to_string(),
    };

    let producer = EventProducer::new(KAFKA_BROKER)?;
    producer.create_topic_if_not_exists(&kafka.sms_topic, 3).await?;
    producer.create_topic_if_not_exists(&kafka.user_topic, 3).await?;

    let mongo_opts = MongoStoreOpts {
        uri: MONGO_URI.to_string(),
        database: format!("smsdb_e2e_{suffix}"),
        ..Default::default()
    };
    let store: Arc<dyn DocumentStore> = Arc::new(MongoStore::connect(&mongo_opts).await?);

    let server = ServerOpts {
        http_bind: "127.0.0.1:0".parse()?,
        retry_backoff: Duration::from_millis(200),
        shutdown_timeout: Duration::from_secs(15),
    };
    let service = Service::start(
        store.clone(),
        KafkaConsumer::new(&kafka.sms_consumer())?,
        KafkaConsumer::new(&kafka.user_consumer())?,
        &server,
    )
    .await?;

    producer
        .send_sms(&kafka.sms_topic, "9876543210", "hello", "SUCCESS")
        .await?;
    producer
        .send_sms(&kafka.sms_topic, "9876543210", "again", "FAILED")
        .await?;
    producer
        .publish_raw(&kafka.sms_topic, Some("9876543210"), b"{not json")
        .await?;
    producer
        .send_user_status(&kafka.user_topic, "9876543210", UserStatus::Blocked)
        .await?;
    producer
        .send_user_status(&kafka.user_topic, "9876543210", UserStatus::Unblocked)
        .await?;

    let sms = SmsRepository::new(store.clone());
    let users = UserRepository::new(store.clone());

    let mut settled = false;
    for _ in 0..60 {
        let messages = sms.get_by_mobile_number("9876543210").await?;
        let unblocked = users.get_by_status(UserStatus::Unblocked).await?;
        if messages.len() == 2 && unblocked.len() == 1 {
            settled = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    assert!(settled, "events were not applied within 30s");

    let messages = sms.get_by_mobile_number("9876543210").await?;
    let bodies: Vec<&str> = messages.iter().map(|r| r.message.as_str()).collect();
    assert_eq!(bodies, vec!["hello", "again"]);
    assert!(users.get_by_status(UserStatus::Blocked).await?.is_empty());

    service.shutdown(Duration::from_secs(15)).await?;
    Ok(())
}
