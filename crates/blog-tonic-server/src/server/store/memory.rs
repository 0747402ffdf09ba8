//! In-process [`BlogStore`] backed by a hash map.
//!
//! Identifiers are freshly generated `ObjectId`s, so ids produced here have
//! the same shape as ids minted by MongoDB. Each operation takes the lock
//! once, which gives the same per-document atomicity a real store provides.

use crate::server::store::{BlogFields, BlogStore, ReplaceOutcome, StoreResult};
use async_trait::async_trait;
use blog_tonic_core::types::BlogId;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct MemoryBlogStore {
    docs: RwLock<HashMap<BlogId, BlogFields>>,
}

impl MemoryBlogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }
}

#[async_trait]
impl BlogStore for MemoryBlogStore {
    async fn insert(&self, fields: BlogFields) -> StoreResult<BlogId> {
        let id = BlogId::new();
        self.docs.write().insert(id, fields);
        Ok(id)
    }

    async fn find_by_id(&self, id: BlogId) -> StoreResult<Option<BlogFields>> {
        Ok(self.docs.read().get(&id).cloned())
    }

    async fn replace_by_id(&self, id: BlogId, fields: BlogFields) -> StoreResult<ReplaceOutcome> {
        match self.docs.write().get_mut(&id) {
            Some(doc) => {
                *doc = fields;
                Ok(ReplaceOutcome::Replaced)
            }
            None => Ok(ReplaceOutcome::NotFound),
        }
    }

    async fn delete_by_id(&self, id: BlogId) -> StoreResult<u64> {
        Ok(self.docs.write().remove(&id).map_or(0, |_| 1))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
