//! gRPC service implementation for blog CRUD.
//!
//! This module defines [`BlogHandler`], the concrete implementation of the
//! [`BlogService`] gRPC service defined in `proto/blog.proto`. Each
//! RPC parses the caller's identifier, performs one or two single-document
//! store calls, and maps the outcome onto the blog [`Error`] taxonomy.
//!
//! ## Responsibilities
//!
//! - Translate wire ids to native [`BlogId`]s, rejecting malformed ids before
//!   the store is touched.
//! - Bound every store call by the configured store timeout.
//! - Fold store failures into `INTERNAL` and report missing records as
//!   `NOT_FOUND`.
//! - Record per-method request and error telemetry.

use crate::server::{
    config::ServerConfig,
    store::{BlogFields, BlogStore, ReplaceOutcome, StoreResult},
    telemetry::{increment_errors, record_request},
};
use blog_tonic_core::{
    Error, StoreError,
    proto::{
        Blog, CreateBlogRequest, CreateBlogResponse, DeleteBlogRequest, DeleteBlogResponse,
        ReadBlogRequest, ReadBlogResponse, UpdateBlogRequest, UpdateBlogResponse,
        blog_service_server::BlogService,
    },
    types::{BlogId, parse_blog_id, render_blog_id},
};
use core::time::Duration;
use std::{sync::Arc, time::Instant};
use tonic::{Request, Response, Status};

const CREATE_BLOG: &str = "CreateBlog";
const READ_BLOG: &str = "ReadBlog";
const UPDATE_BLOG: &str = "UpdateBlog";
const DELETE_BLOG: &str = "DeleteBlog";

/// gRPC service for blog records.
///
/// The store is injected at construction and shared by every request; the
/// handler itself holds no mutable state, so concurrent RPCs never contend
/// on it. Ordering between concurrent calls on the same record is whatever
/// the store guarantees for single-document operations.
#[derive(Clone)]
pub struct BlogHandler {
    store: Arc<dyn BlogStore>,
    store_timeout: Duration,
    legacy_delete_status: bool,
}

impl BlogHandler {
    /// Creates a handler over `store`. The caller keeps ownership of the
    /// store's lifecycle.
    pub fn new(store: Arc<dyn BlogStore>, config: &ServerConfig) -> Self {
        Self {
            store,
            store_timeout: config.store_timeout,
            legacy_delete_status: config.legacy_delete_status,
        }
    }

    /// Stores a new record and returns it with the store-assigned id. Any id
    /// on the input is ignored.
    ///
    /// # Errors
    ///
    /// [`Error::Store`] if the insert fails or times out.
    pub async fn create(&self, blog: Blog) -> Result<Blog, Error> {
        let fields = BlogFields::from(blog);
        let id = self.with_timeout(self.store.insert(fields.clone())).await?;

        #[cfg(feature = "tracing")]
        tracing::debug!(blog_id = %id, "created blog");

        Ok(fields.into_blog(&id))
    }

    /// Fetches the record with `blog_id`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidId`] if `blog_id` is malformed.
    /// - [`Error::NotFound`] if there is no such record.
    /// - [`Error::Store`] if the lookup fails.
    pub async fn read(&self, blog_id: &str) -> Result<Blog, Error> {
        let id = parse_blog_id(blog_id)?;
        match self.with_timeout(self.store.find_by_id(id)).await? {
            Some(fields) => Ok(fields.into_blog(&id)),
            None => Err(not_found(&id)),
        }
    }

    /// Replaces every field of an existing record.
    ///
    /// Existence is checked with a read before the replace is issued. The two
    /// calls are not atomic as a pair: a delete landing between them makes
    /// the replace match nothing, which is reported as [`Error::NotFound`],
    /// and a concurrent update simply loses to whichever replace lands last.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidId`] if `blog.id` is malformed.
    /// - [`Error::NotFound`] if the record does not exist, or vanished before
    ///   the replace.
    /// - [`Error::Store`] if either store call fails.
    pub async fn update(&self, blog: Blog) -> Result<Blog, Error> {
        let id = parse_blog_id(&blog.id)?;

        if self.with_timeout(self.store.find_by_id(id)).await?.is_none() {
            return Err(not_found(&id));
        }

        let fields = BlogFields::from(blog);
        match self
            .with_timeout(self.store.replace_by_id(id, fields.clone()))
            .await?
        {
            ReplaceOutcome::Replaced => Ok(fields.into_blog(&id)),
            ReplaceOutcome::NotFound => {
                #[cfg(feature = "tracing")]
                tracing::warn!(blog_id = %id, "blog deleted between existence check and replace");
                Err(not_found(&id))
            }
        }
    }

    /// Removes the record with `blog_id` and echoes its id.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidId`] if `blog_id` is malformed, or
    ///   [`Error::Internal`] when legacy delete statuses are enabled.
    /// - [`Error::NotFound`] if nothing was deleted.
    /// - [`Error::Store`] if the delete fails.
    pub async fn delete(&self, blog_id: &str) -> Result<String, Error> {
        let id = parse_blog_id(blog_id).map_err(|e| self.delete_parse_error(e))?;

        let deleted = self.with_timeout(self.store.delete_by_id(id)).await?;
        if deleted == 0 {
            return Err(not_found(&id));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(blog_id = %id, "deleted blog");

        Ok(render_blog_id(&id))
    }

    /// Releases the store's connections.
    pub async fn shutdown(&self) -> Result<(), Error> {
        self.store.shutdown().await.map_err(Error::from)
    }

    fn delete_parse_error(&self, err: Error) -> Error {
        if self.legacy_delete_status {
            Error::Internal {
                context: err.to_string(),
            }
        } else {
            err
        }
    }

    async fn with_timeout<T, F>(&self, fut: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        tokio::time::timeout(self.store_timeout, fut)
            .await
            .map_err(|_| StoreError::Unavailable {
                context: format!("store call exceeded {:?}", self.store_timeout),
            })?
    }
}

fn not_found(id: &BlogId) -> Error {
    Error::NotFound {
        id: render_blog_id(id),
    }
}

/// Records telemetry for a finished call and converts its error into a
/// `Status`.
fn finish<T>(method: &'static str, start: Instant, result: Result<T, Error>) -> Result<T, Status> {
    record_request(method, start.elapsed().as_secs_f64() * 1000.0);
    result.map_err(|err| {
        #[cfg(feature = "tracing")]
        tracing::warn!(method, error = %err, "request failed");
        let status = Status::from(err);
        increment_errors(method, status.code());
        status
    })
}

#[tonic::async_trait]
impl BlogService for BlogHandler {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    async fn create_blog(
        &self,
        req: Request<CreateBlogRequest>,
    ) -> Result<Response<CreateBlogResponse>, Status> {
        let start = Instant::now();
        let blog = req.into_inner().blog.unwrap_or_default();
        let blog = finish(CREATE_BLOG, start, self.create(blog).await)?;
        Ok(Response::new(CreateBlogResponse { blog: Some(blog) }))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(blog_id = %req.get_ref().blog_id)))]
    async fn read_blog(
        &self,
        req: Request<ReadBlogRequest>,
    ) -> Result<Response<ReadBlogResponse>, Status> {
        let start = Instant::now();
        let blog = finish(READ_BLOG, start, self.read(&req.get_ref().blog_id).await)?;
        Ok(Response::new(ReadBlogResponse { blog: Some(blog) }))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    async fn update_blog(
        &self,
        req: Request<UpdateBlogRequest>,
    ) -> Result<Response<UpdateBlogResponse>, Status> {
        let start = Instant::now();
        let blog = req.into_inner().blog.unwrap_or_default();
        let blog = finish(UPDATE_BLOG, start, self.update(blog).await)?;
        Ok(Response::new(UpdateBlogResponse { blog: Some(blog) }))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(blog_id = %req.get_ref().blog_id)))]
    async fn delete_blog(
        &self,
        req: Request<DeleteBlogRequest>,
    ) -> Result<Response<DeleteBlogResponse>, Status> {
        let start = Instant::now();
        let blog_id = finish(DELETE_BLOG, start, self.delete(&req.get_ref().blog_id).await)?;
        Ok(Response::new(DeleteBlogResponse { blog_id }))
    }
}
