//! # Blog Identifier Types
//!
//! Records are keyed by the document store's native primary key, a 12-byte
//! BSON [`ObjectId`]. On the wire the same identifier travels as a 24
//! character hex string. This module owns the translation between the two so
//! that client and server agree on one encoding.
//!
//! Parsing is strict: anything that is not exactly 24 hex digits is rejected
//! with [`Error::InvalidId`] before the store is ever consulted.

use crate::common::error::{Error, Result};
use bson::oid::ObjectId;

/// The native identifier of a stored blog record.
pub type BlogId = ObjectId;

/// Length of a rendered [`BlogId`] on the wire.
pub const BLOG_ID_HEX_LEN: usize = 24;

/// Parses a wire identifier into a [`BlogId`].
///
/// # Errors
///
/// Returns [`Error::InvalidId`] if `raw` is not a 24 character hex string.
pub fn parse_blog_id(raw: &str) -> Result<BlogId> {
    ObjectId::parse_str(raw).map_err(|e| Error::InvalidId {
        id: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Renders a [`BlogId`] in its lowercase hex wire form.
pub fn render_blog_id(id: &BlogId) -> String {
    id.to_hex()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_rendered_ids() {
        let id = ObjectId::new();
        let rendered = render_blog_id(&id);
        assert_eq!(rendered.len(), BLOG_ID_HEX_LEN);
        assert_eq!(parse_blog_id(&rendered).unwrap(), id);
    }

    #[test]
    fn parse_accepts_uppercase_hex() {
        let id = parse_blog_id("5F8F8C44B54764421B7156C5").unwrap();
        assert_eq!(render_blog_id(&id), "5f8f8c44b54764421b7156c5");
    }

    #[test]
    fn parse_rejects_malformed_ids() {
        for raw in [
            "",
            "sdnflsdnfkl",
            "5f8f8c44b54764421b7156c",
            "5f8f8c44b54764421b7156c5a",
            "zzzzzzzzzzzzzzzzzzzzzzzz",
            " 5f8f8c44b54764421b7156c5",
        ] {
            match parse_blog_id(raw) {
                Err(Error::InvalidId { id, .. }) => assert_eq!(id, raw),
                other => panic!("expected InvalidId for {raw:?}, got {other:?}"),
            }
        }
    }
}
