//! Shared protocol, identifier and error definitions.
//!
//! - [`error`] - Caller-visible error taxonomy and its `tonic::Status`
//!   mapping.
//! - [`types`] - The native blog identifier and its wire rendering.
//! - [`proto`] - Generated Protobuf messages, client and server stubs.

pub mod error;
pub mod types;

pub use error::{Error, Result, StoreError};

/// gRPC service and message definitions generated from `proto/blog.proto`.
///
/// ## Service
///
/// - `BlogService` - `CreateBlog`, `ReadBlog`, `UpdateBlog`, `DeleteBlog`.
///
/// ## Message Format
///
/// - `Blog` - `id`, `author_id`, `title`, `content`. The `id`
///   is the 24 character hex rendering of a BSON `ObjectId`.
/// - Read and delete requests carry a bare `blog_id` string.
pub mod proto {
    tonic::include_proto!("blog");

    /// Encoded descriptor set used to serve gRPC reflection.
    pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("blog_descriptor");
}
