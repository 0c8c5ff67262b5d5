//! Read-only lookups over the persisted state.

use sms_store_mongodb::{DocumentStore, SmsRepository, UserRepository};
use sms_types::{SmsRecord, UserStatus, UserStatusRecord};
use std::sync::Arc;

/// Lookups served by the HTTP read API.
///
/// Inputs are expected to be validated already: the mobile number is 10
/// digits and the status went through [`UserStatus::parse`].
#[derive(Clone)]
pub struct QueryService {
    sms: SmsRepository,
    users: UserRepository,
}

impl QueryService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            sms: SmsRepository::new(store.clone()),
            users: UserRepository::new(store),
        }
    }

    pub async fn get_by_mobile_number(
        &self,
        mobile_number: &str,
    ) -> sms_store_mongodb::Result<Vec<SmsRecord>> {
        self.sms.get_by_mobile_number(mobile_number).await
    }

    pub async fn get_by_status(
        &self,
        status: UserStatus,
    ) -> sms_store_mongodb::Result<Vec<UserStatusRecord>> {
        self.users.get_by_status(status).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sms_store_mongodb::MemoryStore;

    #[tokio::test]
    async fn test_lookups_see_processor_writes() {
        let store = Arc::new(MemoryStore::new());
        let query = QueryService::new(store.clone());

        let sms = SmsRepository::new(store.clone());
        for (mobile, message) in [("9876543210", "a"), ("1234567890", "b"), ("9876543210", "c")] {
            sms.insert(&SmsRecord {
                id: None,
                mobile_number: mobile.to_string(),
                message: message.to_string(),
                status: "SUCCESS".to_string(),
            })
            .await
            .unwrap();
        }
        let users = UserRepository::new(store);
        users
            .update_status("9876543210", UserStatus::Blocked)
            .await
            .unwrap();
        users
            .update_status("1234567890", UserStatus::Unblocked)
            .await
            .unwrap();

        let messages = query.get_by_mobile_number("9876543210").await.unwrap();
        let bodies: Vec<&str> = messages.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(bodies, vec!["a", "c"]);
        assert!(messages.iter().all(|r| r.id.is_some()));

        let blocked = query.get_by_status(UserStatus::Blocked).await.unwrap();
        assert_eq!(blocked.len(), 1);
        assert_eq!(blocked[0].mobile_number, "9876543210");

        assert!(query
            .get_by_mobile_number("5555555555")
            .await
            .unwrap()
            .is_empty());
    }
}
