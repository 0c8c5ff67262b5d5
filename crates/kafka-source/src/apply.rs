//! Persistence adapter: one storage call per decoded event.

use async_trait::async_trait;
use sms_store_mongodb::{SmsRepository, UserRepository};
use sms_types::{Decode, Keyed, SmsEvent, SmsRecord, UserStatusEvent};
use std::fmt::Debug;

/// Applies a decoded event to the document store.
///
/// Storage errors are returned unchanged so the processor can decide to
/// retry; appliers never retry on their own.
#[async_trait]
pub trait Applier: Send + Sync {
    type Event: Decode + Keyed + Debug + Send + Sync;

    async fn apply(&self, event: &Self::Event) -> sms_store_mongodb::Result<()>;
}

/// Appends every SMS event as a new record.
pub struct SmsApplier {
    repository: SmsRepository,
}

impl SmsApplier {
    pub fn new(repository: SmsRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl Applier for SmsApplier {
    type Event = SmsEvent;

    async fn apply(&self, event: &SmsEvent) -> sms_store_mongodb::Result<()> {
        let id = self.repository.insert(&SmsRecord::from(event.clone())).await?;
        tracing::debug!(id = %id, mobile_number = %event.mobile_number, "Inserted SMS record");
        Ok(())
    }
}

/// Upserts the user's status, keyed by mobile number.
pub struct UserStatusApplier {
    repository: UserRepository,
}

impl UserStatusApplier {
    pub fn new(repository: UserRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl Applier for UserStatusApplier {
    type Event = UserStatusEvent;

    async fn apply(&self, event: &UserStatusEvent) -> sms_store_mongodb::Result<()> {
        self.repository
            .update_status(&event.mobile_number, event.status)
            .await
    }
}
