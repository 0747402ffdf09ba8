//! Document store adapters.
//!
//! The blog service talks to storage exclusively through the [`BlogStore`]
//! trait: four single-document primitives keyed by the native [`BlogId`].
//! Adapters carry no business logic. Any store that keeps each of these
//! operations atomic per document satisfies the contract.
//!
//! ## Implementations
//!
//! - [`MongoBlogStore`] - a MongoDB collection via the official driver.
//! - [`MemoryBlogStore`] - an in-process map, used for tests, benches and
//!   `--store memory`.

pub mod memory;
pub mod mongo;

pub use memory::MemoryBlogStore;
pub use mongo::MongoBlogStore;

use async_trait::async_trait;
use blog_tonic_core::{
    StoreError,
    proto::Blog,
    types::{BlogId, render_blog_id},
};

pub type StoreResult<T> = core::result::Result<T, StoreError>;

/// The caller-owned fields of a blog record. The identifier is kept apart
/// because only the store may assign it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogFields {
    pub author_id: String,
    pub title: String,
    pub content: String,
}

impl BlogFields {
    /// Builds the wire representation of this record under `id`.
    pub fn into_blog(self, id: &BlogId) -> Blog {
        Blog {
            id: render_blog_id(id),
            author_id: self.author_id,
            title: self.title,
            content: self.content,
        }
    }
}

/// Drops the wire `id`; callers never choose a stored identifier.
impl From<Blog> for BlogFields {
    fn from(blog: Blog) -> Self {
        Self {
            author_id: blog.author_id,
            title: blog.title,
            content: blog.content,
        }
    }
}

/// Result of [`BlogStore::replace_by_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    Replaced,
    /// No document matched; it may have been deleted since it was last seen.
    NotFound,
}

/// Single-collection, single-document storage operations.
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Stores a new document and returns the identifier the store assigned.
    async fn insert(&self, fields: BlogFields) -> StoreResult<BlogId>;

    /// Fetches the document with `id`, or `None` if there is none.
    async fn find_by_id(&self, id: BlogId) -> StoreResult<Option<BlogFields>>;

    /// Overwrites every field of the document with `id`.
    async fn replace_by_id(&self, id: BlogId, fields: BlogFields) -> StoreResult<ReplaceOutcome>;

    /// Removes the document with `id` and returns how many were removed (0 or
    /// 1).
    async fn delete_by_id(&self, id: BlogId) -> StoreResult<u64>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> StoreResult<()>;

    /// Releases connections held by the adapter.
    async fn shutdown(&self) -> StoreResult<()> {
        Ok(())
    }
}
