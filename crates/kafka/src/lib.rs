//! Event log consumption for sms-store.
//!
//! Features:
//!
//! - [`EventLog`]: the fetch / commit / close contract a stream processor consumes
//! - [`KafkaConsumer`]: one consumer-group member subscribed to one topic, with
//!   manual offset commits
//! - [`MemoryLog`]: an in-process log with the same contract, for local runs and tests

/// Low-level Kafka consumer with manual offsets
///
/// Created from a [`ConsumerConfig`], one per topic. Consumers are not shared
/// between processors.
pub mod consumer;
pub mod error;
pub mod log;
pub mod memory;

pub use consumer::{ConsumerConfig, KafkaConsumer};
pub use error::{Error, Result};
pub use log::{EventLog, LogMessage};
pub use memory::MemoryLog;
