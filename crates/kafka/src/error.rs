use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    #[error("Consumer error: {0}")]
    Consumer(String),

    #[error("Commit error: {0}")]
    Commit(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Log closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, Error>;
