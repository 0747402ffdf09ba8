//! MongoDB-backed [`BlogStore`].
//!
//! Each blog is one document `{_id, author_id, content, title}` in a single
//! collection. The `_id` is left out on insert so the driver assigns a fresh
//! `ObjectId`, which is then reported back as the record's identifier.
//!
//! Filters are only ever built here, always on `_id`; the service layer never
//! sees a query document.

use crate::server::store::{BlogFields, BlogStore, ReplaceOutcome, StoreResult};
use async_trait::async_trait;
use blog_tonic_core::{StoreError, types::BlogId};
use mongodb::{
    Client, Collection,
    bson::doc,
    error::{Error as MongoError, ErrorKind},
    options::ClientOptions,
};
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "blog-tonic-server";

/// Stored shape of a blog record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct BlogDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<BlogId>,
    author_id: String,
    content: String,
    title: String,
}

impl BlogDocument {
    fn new(id: Option<BlogId>, fields: BlogFields) -> Self {
        Self {
            id,
            author_id: fields.author_id,
            content: fields.content,
            title: fields.title,
        }
    }
}

impl From<BlogDocument> for BlogFields {
    fn from(doc: BlogDocument) -> Self {
        Self {
            author_id: doc.author_id,
            title: doc.title,
            content: doc.content,
        }
    }
}

/// A [`BlogStore`] over one MongoDB collection.
///
/// Cloning is cheap: the underlying [`Client`] is a handle to a shared,
/// internally pooled connection set that is safe to use concurrently.
#[derive(Clone, Debug)]
pub struct MongoBlogStore {
    client: Client,
    collection: Collection<BlogDocument>,
}

impl MongoBlogStore {
    /// Connects to `uri` and verifies the deployment answers a `ping`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the deployment cannot be
    /// reached, or [`StoreError::Internal`] if the URI is rejected.
    pub async fn connect(uri: &str, database: &str, collection: &str) -> StoreResult<Self> {
        let mut options = ClientOptions::parse(uri).await.map_err(classify)?;
        options.app_name = Some(APP_NAME.to_string());
        let client = Client::with_options(options).map_err(classify)?;

        let store = Self::with_client(client, database, collection);
        store.ping().await?;
        Ok(store)
    }

    /// Wraps an existing client. No connection is attempted.
    pub fn with_client(client: Client, database: &str, collection: &str) -> Self {
        let collection = client.database(database).collection(collection);
        Self { client, collection }
    }
}

#[async_trait]
impl BlogStore for MongoBlogStore {
    async fn insert(&self, fields: BlogFields) -> StoreResult<BlogId> {
        let result = self
            .collection
            .insert_one(BlogDocument::new(None, fields))
            .await
            .map_err(classify)?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StoreError::Internal {
                context: format!(
                    "inserted id is not an ObjectId: {:?}",
                    result.inserted_id
                ),
            })
    }

    /// A stored document that fails to decode, for example one missing a
    /// field, is reported as [`StoreError::Internal`] rather than as absent.
    async fn find_by_id(&self, id: BlogId) -> StoreResult<Option<BlogFields>> {
        let found = self
            .collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(classify)?;
        Ok(found.map(BlogFields::from))
    }

    async fn replace_by_id(&self, id: BlogId, fields: BlogFields) -> StoreResult<ReplaceOutcome> {
        let result = self
            .collection
            .replace_one(doc! { "_id": id }, BlogDocument::new(Some(id), fields))
            .await
            .map_err(classify)?;

        if result.matched_count == 0 {
            Ok(ReplaceOutcome::NotFound)
        } else {
            Ok(ReplaceOutcome::Replaced)
        }
    }

    async fn delete_by_id(&self, id: BlogId) -> StoreResult<u64> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id })
            .await
            .map_err(classify)?;
        Ok(result.deleted_count)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn shutdown(&self) -> StoreResult<()> {
        self.client.clone().shutdown().await;
        Ok(())
    }
}

/// Splits driver errors into "could not reach the store" and everything
/// else.
fn classify(err: MongoError) -> StoreError {
    let context = err.to_string();
    match err.kind.as_ref() {
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io(_)
        | ErrorKind::ConnectionPoolCleared { .. }
        | ErrorKind::DnsResolve { .. } => StoreError::Unavailable { context },
        _ => StoreError::Internal { context },
    }
}
