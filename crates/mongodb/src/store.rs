//! Document store contract.

use crate::error::Result;
use async_trait::async_trait;
use bson::{Bson, Document};

/// Collection-oriented storage operations used by sms-store.
///
/// Implementations are shared between both stream processors and the query
/// service, so they must be safe for concurrent use. The store itself is the
/// only arbiter of concurrent-write consistency.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document unconditionally and return its store-assigned `_id`.
    async fn insert(&self, collection: &str, document: Document) -> Result<Bson>;

    /// All documents whose fields equal every field in `filter`.
    async fn find_many(&self, collection: &str, filter: Document) -> Result<Vec<Document>>;

    /// Set `fields` on the first document matching `filter`, inserting
    /// `filter + fields` when nothing matches.
    async fn upsert_one(&self, collection: &str, filter: Document, fields: Document)
        -> Result<()>;

    /// Release the underlying client. Further calls may fail.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
