//! Documents persisted in the store.
//!
//! Field names are the stored (snake case) names; `_id` is assigned by the
//! store on insert.

use crate::event::SmsEvent;
use crate::status::UserStatus;
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One received SMS. Append-only: never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub mobile_number: String,
    pub message: String,
    pub status: String,
}

impl From<SmsEvent> for SmsRecord {
    fn from(event: SmsEvent) -> Self {
        Self {
            id: None,
            mobile_number: event.mobile_number,
            message: event.message,
            status: event.status,
        }
    }
}

/// Current block state of one user, keyed by mobile number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatusRecord {
    pub mobile_number: String,
    pub status: UserStatus,
}

/// Exactly 10 ASCII digits.
pub fn is_valid_mobile_number(s: &str) -> bool {
    s.len() == 10 && s.bytes().all(|b| b.is_ascii_digit())
}
