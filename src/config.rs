//! Process configuration.
//!
//! Every option can be given as a flag or through the environment.

pub mod duration;

use clap::Parser;
use duration::parse_duration;
use sms_store_kafka::ConsumerConfig;
use sms_store_mongodb::MongoStoreOpts;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Parser, Clone, Debug)]
pub struct StoreOpts {
    /// MongoDB connection string
    #[arg(long, default_value = "mongodb://localhost:27017", env = "MONGO_URI")]
    pub mongo_uri: String,

    /// MongoDB database name
    #[arg(long, default_value = "smsdb", env = "MONGO_DATABASE")]
    pub mongo_database: String,
}

impl From<&StoreOpts> for MongoStoreOpts {
    fn from(opts: &StoreOpts) -> Self {
        Self {
            uri: opts.mongo_uri.clone(),
            database: opts.mongo_database.clone(),
            ..Default::default()
        }
    }
}

#[derive(Parser, Clone, Debug)]
pub struct KafkaOpts {
    /// Kafka brokers (comma-separated or multiple --kafka-brokers)
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "kafka:9092",
        env = "KAFKA_BROKERS"
    )]
    pub kafka_brokers: Vec<String>,

    /// Topic carrying SMS events
    #[arg(long, default_value = "sms-topic", env = "SMS_TOPIC")]
    pub sms_topic: String,

    /// Consumer group for the SMS topic
    #[arg(long, default_value = "sms-store-group-v2", env = "SMS_GROUP_ID")]
    pub sms_group_id: String,

    /// Topic carrying user status events
    #[arg(long, default_value = "user-topic", env = "USER_TOPIC")]
    pub user_topic: String,

    /// Consumer group for the user status topic
    #[arg(long, default_value = "user-store-group-v2", env = "USER_GROUP_ID")]
    pub user_group_id: String,

    /// Minimum bytes per fetch
    #[arg(long, default_value_t = 1, env = "KAFKA_FETCH_MIN_BYTES")]
    pub fetch_min_bytes: usize,

    /// Maximum bytes per fetch
    #[arg(long, default_value_t = 10_000_000, env = "KAFKA_FETCH_MAX_BYTES")]
    pub fetch_max_bytes: usize,

    /// Maximum time the broker holds a fetch open (e.g. "500ms", "1s")
    #[arg(long, default_value = "1s", env = "KAFKA_FETCH_MAX_WAIT", value_parser = parse_duration)]
    pub fetch_max_wait: Duration,

    /// Session timeout in milliseconds
    #[arg(long, default_value = "6000", env = "KAFKA_SESSION_TIMEOUT_MS")]
    pub session_timeout_ms: String,
}

impl KafkaOpts {
    pub fn sms_consumer(&self) -> ConsumerConfig {
        self.consumer(&self.sms_topic, &self.sms_group_id)
    }

    pub fn user_consumer(&self) -> ConsumerConfig {
        self.consumer(&self.user_topic, &self.user_group_id)
    }

    fn consumer(&self, topic: &str, group_id: &str) -> ConsumerConfig {
        ConsumerConfig {
            brokers: self.kafka_brokers.join(","),
            group_id: group_id.to_string(),
            topic: topic.to_string(),
            session_timeout_ms: self.session_timeout_ms.clone(),
            fetch_min_bytes: self.fetch_min_bytes,
            fetch_max_bytes: self.fetch_max_bytes,
            fetch_max_wait: self.fetch_max_wait,
            ..Default::default()
        }
    }
}

#[derive(Parser, Clone, Debug)]
pub struct ServerOpts {
    /// Address of the HTTP read API
    #[arg(long, default_value = "0.0.0.0:8081", env = "HTTP_BIND")]
    pub http_bind: SocketAddr,

    /// Pause after a failed fetch or store write
    #[arg(long, default_value = "1s", env = "RETRY_BACKOFF", value_parser = parse_duration)]
    pub retry_backoff: Duration,

    /// Upper bound on graceful shutdown
    #[arg(long, default_value = "15s", env = "SHUTDOWN_TIMEOUT", value_parser = parse_duration)]
    pub shutdown_timeout: Duration,
}

/// Everything `sms-store serve` needs.
#[derive(Parser, Clone, Debug)]
pub struct ServeOpts {
    #[command(flatten)]
    pub store: StoreOpts,

    #[command(flatten)]
    pub kafka: KafkaOpts,

    #[command(flatten)]
    pub server: ServerOpts,
}
