//! Wire events and the record decoder.
//!
//! Both topics carry JSON objects:
//!
//! ```text
//! sms-topic:  {"mobileNumber": "9876543210", "message": "hi", "status": "PENDING"}
//! user-topic: {"mobileNumber": "9876543210", "status": "blocked"}
//! ```
//!
//! Decoding is all-or-nothing. Unknown fields are ignored, missing or
//! mistyped fields reject the whole payload.

use crate::error::DecodeError;
use crate::status::UserStatus;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Turns raw log payload bytes into a typed event.
pub trait Decode: Sized {
    fn decode(payload: &[u8]) -> Result<Self, DecodeError>;
}

fn decode_json<T: DeserializeOwned>(payload: &[u8]) -> Result<T, DecodeError> {
    if payload.is_empty() {
        return Err(DecodeError::new("empty payload", payload));
    }
    serde_json::from_slice(payload).map_err(|e| DecodeError::new(e.to_string(), payload))
}

/// Events are partitioned and logged by the mobile number they concern.
pub trait Keyed {
    fn key(&self) -> &str;
}

/// An inbound SMS, appended to the message history as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsEvent {
    pub mobile_number: String,
    pub message: String,
    /// Free-form delivery/processing tag
    pub status: String,
}

impl Keyed for SmsEvent {
    fn key(&self) -> &str {
        &self.mobile_number
    }
}

impl Decode for SmsEvent {
    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        decode_json(payload)
    }
}

/// A block/unblock change for one mobile number.
///
/// The status accepts any ASCII case on the wire and is held in its
/// canonical form from then on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatusEvent {
    pub mobile_number: String,
    pub status: UserStatus,
}

impl Keyed for UserStatusEvent {
    fn key(&self) -> &str {
        &self.mobile_number
    }
}

impl Decode for UserStatusEvent {
    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        decode_json(payload)
    }
}
