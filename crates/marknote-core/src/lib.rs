//! # marknote-core
//!
//! Core types, traits, and editing helpers for the marknote client.
//!
//! This crate provides the data model shared with the remote note API, the
//! error taxonomy every other crate reports through, the [`NoteGateway`]
//! abstraction the note store is written against, and the small pure
//! helpers (content fingerprints, tag handling, text splicing) that the
//! editor surface builds on.

pub mod defaults;
pub mod error;
pub mod events;
pub mod hash;
pub mod logging;
pub mod models;
pub mod tags;
pub mod text;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, ErrorKind, Result};
pub use events::{EventBus, StoreEvent, StoreEventEnvelope};
pub use hash::content_hash;
pub use models::*;
pub use tags::{
    clean_tags, filter_by_tag, format_tag_input, group_by_tag, parse_tag_input, untagged,
    unique_tags, TagGroup,
};
pub use text::{auto_close, closing_pair, insert_snippet, Snippet, Splice};
pub use traits::*;
