//! Kafka + MongoDB end-to-end tests
//!
//! These need a broker at `kafka:9092` and MongoDB at `mongodb://mongodb:27017`
//! and are ignored by default. Run with `cargo test --test kafka -- --ignored`.

mod pipeline_e2e;
