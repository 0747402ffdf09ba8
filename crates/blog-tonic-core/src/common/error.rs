//! Error types for the blog service.
//!
//! This module defines the caller-visible [`Error`] taxonomy and the
//! store-level [`StoreError`] that adapters report. It implements
//! `From<Error>` for `tonic::Status` so handlers can propagate failures with
//! `?` and have them surface with the right gRPC status code.
//!
//! ## Error Cases
//! - `InvalidId`: the caller supplied an identifier that is not well formed.
//!   Maps to `INVALID_ARGUMENT`.
//! - `NotFound`: the targeted record does not exist. Maps to `NOT_FOUND`.
//! - `Internal`: the service could not complete the operation for a reason
//!   outside the caller's control. Maps to `INTERNAL`.
//! - `Store`: a store adapter failure. Whether the store was unreachable or
//!   failed internally, callers only ever see `INTERNAL`.

use tonic::Status;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the blog service.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// The identifier could not be parsed into a native store key.
    #[error("Invalid blog id {id:?}: {reason}")]
    InvalidId { id: String, reason: String },

    /// No record matches the identifier.
    #[error("Blog not found: {id}")]
    NotFound { id: String },

    /// The operation failed for a reason the caller cannot fix.
    #[error("Internal error: {context}")]
    Internal { context: String },

    /// The document store rejected or could not perform the operation.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Failure reported by a document store adapter.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached (connectivity, selection, timeout).
    #[error("store unavailable: {context}")]
    Unavailable { context: String },

    /// The store was reached but the operation failed (serialization, server
    /// error, unexpected response).
    #[error("store internal error: {context}")]
    Internal { context: String },
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidId { id, reason } => {
                Status::invalid_argument(format!("Cannot parse ID {id:?}: {reason}"))
            }
            Error::NotFound { id } => {
                Status::not_found(format!("Cannot find blog with specified ID: {id}"))
            }
            Error::Internal { context } => Status::internal(context),
            Error::Store(e) => Status::internal(format!("Database error: {e}")),
        }
    }
}
