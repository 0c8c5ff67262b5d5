//! Typed access to the `messages` and `users` collections.

use crate::error::{Error, Result};
use crate::store::DocumentStore;
use bson::{doc, oid::ObjectId, Bson};
use sms_types::{SmsRecord, UserStatus, UserStatusRecord};
use std::sync::Arc;

pub const MESSAGES_COLLECTION: &str = "messages";
pub const USERS_COLLECTION: &str = "users";

/// Append-only SMS history.
#[derive(Clone)]
pub struct SmsRepository {
    store: Arc<dyn DocumentStore>,
}

impl SmsRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Insert a new record. Not idempotent: inserting the same record twice
    /// stores two documents.
    pub async fn insert(&self, record: &SmsRecord) -> Result<ObjectId> {
        let document = bson::to_document(record)?;
        match self.store.insert(MESSAGES_COLLECTION, document).await? {
            Bson::ObjectId(id) => Ok(id),
            other => Err(Error::UnexpectedId(other)),
        }
    }

    /// Every record stored for `mobile_number`, in store order.
    pub async fn get_by_mobile_number(&self, mobile_number: &str) -> Result<Vec<SmsRecord>> {
        self.store
            .find_many(MESSAGES_COLLECTION, doc! { "mobile_number": mobile_number })
            .await?
            .into_iter()
            .map(|d| bson::from_document(d).map_err(Error::from))
            .collect()
    }
}

/// Current block state per mobile number.
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn DocumentStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Last write wins; there is no versioning.
    pub async fn update_status(&self, mobile_number: &str, status: UserStatus) -> Result<()> {
        self.store
            .upsert_one(
                USERS_COLLECTION,
                doc! { "mobile_number": mobile_number },
                doc! { "status": status.as_str() },
            )
            .await
    }

    pub async fn get_by_status(&self, status: UserStatus) -> Result<Vec<UserStatusRecord>> {
        self.store
            .find_many(USERS_COLLECTION, doc! { "status": status.as_str() })
            .await?
            .into_iter()
            .map(|d| bson::from_document(d).map_err(Error::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    fn sms(mobile: &str, message: &str) -> SmsRecord {
        SmsRecord {
            id: None,
            mobile_number: mobile.to_string(),
            message: message.to_string(),
            status: "PENDING".to_string(),
        }
    }

    #[tokio::test]
    async fn test_sms_history_is_append_only() {
        let repo = SmsRepository::new(Arc::new(MemoryStore::new()));
        let first = repo.insert(&sms("9876543210", "one")).await.unwrap();
        let second = repo.insert(&sms("9876543210", "two")).await.unwrap();
        repo.insert(&sms("1111111111", "other")).await.unwrap();

        let records = repo.get_by_mobile_number("9876543210").await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, Some(first));
        assert_eq!(records[0].message, "one");
        assert_eq!(records[1].id, Some(second));
        assert_eq!(records[1].message, "two");
    }

    #[tokio::test]
    async fn test_unknown_mobile_number_yields_empty() {
        let repo = SmsRepository::new(Arc::new(MemoryStore::new()));
        assert!(repo
            .get_by_mobile_number("0000000000")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_user_status_last_write_wins() {
        let store = Arc::new(MemoryStore::new());
        let repo = UserRepository::new(store.clone());
        repo.update_status("9876543210", UserStatus::Blocked)
            .await
            .unwrap();
        repo.update_status("9876543210", UserStatus::Unblocked)
            .await
            .unwrap();
        repo.update_status("1234567890", UserStatus::Blocked)
            .await
            .unwrap();

        assert_eq!(store.len(USERS_COLLECTION), 2);
        let unblocked = repo.get_by_status(UserStatus::Unblocked).await.unwrap();
        assert_eq!(
            unblocked,
            vec![UserStatusRecord {
                mobile_number: "9876543210".to_string(),
                status: UserStatus::Unblocked,
            }]
        );
        let blocked = repo.get_by_status(UserStatus::Blocked).await.unwrap();
        assert_eq!(blocked.len(), 1);
        assert_eq!(blocked[0].mobile_number, "1234567890");
    }
}
