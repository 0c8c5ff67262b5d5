//! MongoDB backend.

use crate::error::Result;
use crate::store::DocumentStore;
use async_trait::async_trait;
use bson::{doc, Bson, Document};
use mongodb::{options::ClientOptions, Client, Database};
use std::time::Duration;

/// Connection settings for [`MongoStore`].
#[derive(Debug, Clone)]
pub struct MongoStoreOpts {
    /// MongoDB connection string
    pub uri: String,
    /// Database holding the `messages` and `users` collections
    pub database: String,
    /// Applied to both connect and server selection
    pub connect_timeout: Duration,
}

impl Default for MongoStoreOpts {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "smsdb".to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// [`DocumentStore`] backed by a MongoDB database.
///
/// Cheap to clone; clones share the driver's connection pool.
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    database: Database,
}

impl MongoStore {
    /// Connect and ping the server, so an unreachable store fails here and
    /// not on the first event.
    pub async fn connect(opts: &MongoStoreOpts) -> Result<Self> {
        tracing::debug!("Parsing MongoDB connection options");
        let mut mongo_options = ClientOptions::parse(&opts.uri).await?;
        mongo_options.connect_timeout = Some(opts.connect_timeout);
        mongo_options.server_selection_timeout = Some(opts.connect_timeout);
        mongo_options.app_name = Some("sms-store".to_string());

        let client = Client::with_options(mongo_options)?;
        let database = client.database(&opts.database);
        database.run_command(doc! { "ping": 1 }).await?;
        tracing::info!("Connected to MongoDB database '{}'", opts.database);

        Ok(Self { client, database })
    }

    fn collection(&self, name: &str) -> mongodb::Collection<Document> {
        self.database.collection::<Document>(name)
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert(&self, collection: &str, document: Document) -> Result<Bson> {
        let result = self.collection(collection).insert_one(document).await?;
        Ok(result.inserted_id)
    }

    async fn find_many(&self, collection: &str, filter: Document) -> Result<Vec<Document>> {
        let mut cursor = self.collection(collection).find(filter).await?;
        let mut documents = Vec::new();
        while cursor.advance().await? {
            documents.push(cursor.deserialize_current()?);
        }
        Ok(documents)
    }

    async fn upsert_one(
        &self,
        collection: &str,
        filter: Document,
        fields: Document,
    ) -> Result<()> {
        self.collection(collection)
            .update_one(filter, doc! { "$set": fields })
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.client.clone().shutdown().await;
        tracing::info!("MongoDB client shut down");
        Ok(())
    }
}
