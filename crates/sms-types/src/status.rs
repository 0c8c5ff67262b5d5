//! User block status.

use crate::error::StatusParseError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Block state of a user, stored in canonical upper case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserStatus {
    Blocked,
    Unblocked,
}

impl UserStatus {
    /// Parse a status string, ignoring ASCII case.
    ///
    /// This is the only way a status string enters the system, both on the
    /// event path and on the query path.
    pub fn parse(s: &str) -> Result<Self, StatusParseError> {
        if s.eq_ignore_ascii_case("blocked") {
            Ok(UserStatus::Blocked)
        } else if s.eq_ignore_ascii_case("unblocked") {
            Ok(UserStatus::Unblocked)
        } else {
            Err(StatusParseError(s.to_string()))
        }
    }

    /// Canonical tag as stored in the document store.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Blocked => "BLOCKED",
            UserStatus::Unblocked => "UNBLOCKED",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for UserStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UserStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        UserStatus::parse(&s).map_err(serde::de::Error::custom)
    }
}
