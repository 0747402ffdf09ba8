//! gRPC service implementation.
//!
//! - [`handler`] - gRPC service entry point ([`BlogHandler`]).

pub mod handler;

pub use handler::BlogHandler;
