//! Document store access for sms-store
//!
//! The [`DocumentStore`] trait is the narrow storage contract the rest of the
//! service is written against. Two backends implement it:
//!
//! - [`MongoStore`] - MongoDB via the official driver
//! - [`MemoryStore`] - an in-process store for local runs and tests
//!
//! [`SmsRepository`] and [`UserRepository`] translate domain records to and
//! from documents on top of any backend.

mod error;
mod memory;
mod mongo;
mod repository;
mod store;

pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use mongo::{MongoStore, MongoStoreOpts};
pub use repository::{SmsRepository, UserRepository, MESSAGES_COLLECTION, USERS_COLLECTION};
pub use store::DocumentStore;

// Re-export so callers build filters with the same bson version
pub use bson::{doc, oid::ObjectId, Bson, Document};
