//! Tag algebra for the weft convergent views.
//!
//! This crate defines the identifier types every view kernel builds on:
//! - Identity tags and site identifiers (opaque, application-supplied,
//!   totally ordered)
//! - Logoot positional tags with dense `between` allocation and a canonical
//!   order-preserving byte encoding
//!
//! View semantics (registers, sets, lists, text) live in `weft-crdt`;
//! nothing here knows about tombstones or operation messages.

mod ids;
mod position;

pub use ids::{SiteId, Tag};
pub use position::{Position, PositionalTag};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tag operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid positional tag encoding: {0}")]
    InvalidEncoding(String),
}
