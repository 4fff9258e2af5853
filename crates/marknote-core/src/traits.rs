//! Core traits for marknote abstractions.
//!
//! The note store is written against [`NoteGateway`] so the HTTP client can
//! be swapped for an in-memory double in tests.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// NOTE GATEWAY
// =============================================================================

/// Remote note CRUD.
///
/// Implementations decode responses into typed entities at this boundary and
/// report `success: false` envelopes as [`crate::Error`] values; callers never
/// see a malformed shape.
#[async_trait]
pub trait NoteGateway: Send + Sync {
    /// `GET /notes`
    async fn list_notes(&self) -> Result<Vec<NoteSummary>>;

    /// `GET /note/{id}`
    async fn get_note(&self, note_id: &str) -> Result<Note>;

    /// `POST /note`
    async fn create_note(&self, req: &CreateNoteRequest) -> Result<Note>;

    /// `PUT /note/{id}`
    async fn update_note(&self, note_id: &str, req: &UpdateNoteRequest) -> Result<Note>;

    /// `DELETE /note/{id}`
    async fn delete_note(&self, note_id: &str) -> Result<()>;
}
