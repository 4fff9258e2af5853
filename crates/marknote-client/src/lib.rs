//! # marknote-client
//!
//! HTTP implementation of [`marknote_core::NoteGateway`].
//!
//! Every response from the note API is wrapped in an envelope
//! (`{success, content, code?, message?}`). This crate decodes the envelope
//! and its content into typed models at the boundary, so callers only ever
//! see a well-formed [`marknote_core::Note`] or a classified
//! [`marknote_core::Error`].

pub mod config;
pub mod envelope;
pub mod http;

pub use config::ClientConfig;
pub use http::HttpNoteGateway;
