//! sms-store
//!
//! Consumes SMS and user status events from Kafka, persists them into MongoDB
//! and serves the stored state over a small HTTP read API.
//!
//! The consume/decode/apply/commit pipeline lives in
//! [`sms_store_kafka_source`]; this crate wires it to configuration, the
//! query API and process lifecycle.

pub mod app;
pub mod config;
pub mod http;
pub mod query;

pub use app::{serve, Service};
pub use config::{KafkaOpts, ServeOpts, ServerOpts, StoreOpts};
pub use query::QueryService;
