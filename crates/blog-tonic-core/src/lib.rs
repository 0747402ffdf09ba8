#![doc = include_str!("../README.md")]

mod common;
pub use common::*;
// Public re-export so downstream crates name the same `ObjectId` type as the
// one used in `types::BlogId`.
pub use bson;
