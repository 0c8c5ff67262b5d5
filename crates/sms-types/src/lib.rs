//! Domain types shared by every sms-store crate.
//!
//! # Architecture
//!
//! ```text
//! Kafka payload bytes ──Decode──> SmsEvent        ──> SmsRecord          (messages collection)
//!                     ──Decode──> UserStatusEvent ──> UserStatusRecord   (users collection)
//! ```
//!
//! # Modules
//!
//! - [`event`] - Wire events and the [`Decode`] trait (the record decoder)
//! - [`record`] - Persisted documents
//! - [`status`] - The closed [`UserStatus`] enumeration
//! - [`error`] - Decode and parse errors
//!
//! Nothing in this crate performs I/O.

pub mod error;
pub mod event;
pub mod record;
pub mod status;

pub use error::{DecodeError, StatusParseError};
pub use event::{Decode, Keyed, SmsEvent, UserStatusEvent};
pub use record::{is_valid_mobile_number, SmsRecord, UserStatusRecord};
pub use status::UserStatus;
