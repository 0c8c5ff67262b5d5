//! Kafka to document store pipeline for sms-store.
//!
//! This crate provides:
//! - [`StreamProcessor`]: the per-topic fetch → decode → apply → commit loop
//! - [`Applier`]: the persistence adapter turning a decoded event into one
//!   storage call ([`SmsApplier`], [`UserStatusApplier`])
//! - [`Supervisor`]: runs processors as tasks and stops them within a deadline
//!
//! # Delivery guarantees
//!
//! An offset is committed only after its event was applied, or after the
//! payload was judged undecodable and dropped. Apply failures are retried
//! with a fixed backoff, forever, until cancellation. Because a commit can
//! fail, or an apply can succeed without the processor learning about it,
//! every event may be applied more than once. User status upserts tolerate
//! that; SMS inserts do not, and a retried insert can store a duplicate record.

mod apply;
mod processor;
mod supervisor;

pub use apply::{Applier, SmsApplier, UserStatusApplier};
pub use processor::{ProcessorState, ProcessorStats, StreamProcessor, DEFAULT_BACKOFF};
pub use supervisor::Supervisor;

// Re-exported so callers share the same token type
pub use tokio_util::sync::CancellationToken;
