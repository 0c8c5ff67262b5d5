//! Error types for sms-types crate.

use thiserror::Error;

/// A payload that can never be turned into an event.
///
/// There is exactly one decode failure kind: the payload is malformed.
/// The raw payload is kept (lossy UTF-8) so it can be logged for recovery.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed payload: {reason}")]
pub struct DecodeError {
    /// Why decoding failed
    pub reason: String,
    /// The payload as received
    pub raw: String,
}

impl DecodeError {
    pub fn new(reason: impl Into<String>, payload: &[u8]) -> Self {
        Self {
            reason: reason.into(),
            raw: String::from_utf8_lossy(payload).into_owned(),
        }
    }
}

/// A status string that is neither `BLOCKED` nor `UNBLOCKED`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid status '{0}': must be either blocked or unblocked")]
pub struct StatusParseError(pub String);
