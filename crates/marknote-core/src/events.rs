//! Store events and the broadcast bus that carries them.
//!
//! The note store reports every completed or failed operation here so a UI
//! can show failure messages (and "saved" indicators) without polling. Each
//! event is wrapped in a [`StoreEventEnvelope`] carrying a time-ordered id and
//! timestamp.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

// ============================================================================
// Events
// ============================================================================

/// Something the note store did, or failed to do.
///
/// Serialized with a `type` tag, e.g. `{"type":"NoteSaved","note_id":"..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum StoreEvent {
    /// The summary list was replaced.
    SummariesLoaded { count: usize },
    /// Listing failed; the summary list was cleared.
    SummariesLoadFailed { error: String },
    /// A note became the open note.
    NoteOpened { note_id: String },
    /// Opening a note failed; the previous session is untouched.
    OpenFailed { note_id: String, error: String },
    /// A note was created and opened.
    NoteCreated { note_id: String, title: String },
    /// A save completed.
    NoteSaved {
        note_id: String,
        saved_at: DateTime<Utc>,
        autosave: bool,
    },
    /// A save failed; local edits are kept.
    SaveFailed {
        note_id: String,
        error: String,
        autosave: bool,
    },
    /// A note was deleted.
    NoteDeleted { note_id: String },
    /// Deleting a note failed; nothing was changed.
    DeleteFailed { note_id: String, error: String },
    /// The open note was closed.
    NoteClosed { note_id: String },
}

impl StoreEvent {
    /// Namespaced event type (e.g. `"note.saved"`).
    pub fn event_type(&self) -> &'static str {
        match self {
            StoreEvent::SummariesLoaded { .. } => "summaries.loaded",
            StoreEvent::SummariesLoadFailed { .. } => "summaries.load_failed",
            StoreEvent::NoteOpened { .. } => "note.opened",
            StoreEvent::OpenFailed { .. } => "note.open_failed",
            StoreEvent::NoteCreated { .. } => "note.created",
            StoreEvent::NoteSaved { .. } => "note.saved",
            StoreEvent::SaveFailed { .. } => "note.save_failed",
            StoreEvent::NoteDeleted { .. } => "note.deleted",
            StoreEvent::DeleteFailed { .. } => "note.delete_failed",
            StoreEvent::NoteClosed { .. } => "note.closed",
        }
    }

    /// Note the event relates to, if any.
    pub fn note_id(&self) -> Option<&str> {
        match self {
            StoreEvent::SummariesLoaded { .. } | StoreEvent::SummariesLoadFailed { .. } => None,
            StoreEvent::NoteOpened { note_id }
            | StoreEvent::OpenFailed { note_id, .. }
            | StoreEvent::NoteCreated { note_id, .. }
            | StoreEvent::NoteSaved { note_id, .. }
            | StoreEvent::SaveFailed { note_id, .. }
            | StoreEvent::NoteDeleted { note_id }
            | StoreEvent::DeleteFailed { note_id, .. }
            | StoreEvent::NoteClosed { note_id } => Some(note_id),
        }
    }

    /// Whether this event reports a failure the UI should display.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            StoreEvent::SummariesLoadFailed { .. }
                | StoreEvent::OpenFailed { .. }
                | StoreEvent::SaveFailed { .. }
                | StoreEvent::DeleteFailed { .. }
        )
    }
}

/// Envelope around a [`StoreEvent`].
#[derive(Debug, Clone, Serialize)]
pub struct StoreEventEnvelope {
    /// UUIDv7, so ids sort by emission time.
    pub event_id: Uuid,
    pub event_type: String,
    pub occurred_at: DateTime<Utc>,
    pub payload: StoreEvent,
}

impl StoreEventEnvelope {
    pub fn new(event: StoreEvent) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            event_type: event.event_type().to_string(),
            occurred_at: Utc::now(),
            payload: event,
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Broadcast-based bus distributing store events to any number of observers.
///
/// Slow receivers that fall behind get a `Lagged` error and miss events.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<StoreEventEnvelope>,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all subscribers. Dropped silently when nobody listens.
    pub fn emit(&self, event: StoreEvent) {
        let envelope = StoreEventEnvelope::new(event);
        tracing::debug!(
            event_type = %envelope.event_type,
            event_id = %envelope.event_id,
            subscriber_count = self.tx.receiver_count(),
            "EventBus emit"
        );
        let _ = self.tx.send(envelope);
    }

    /// Subscribe to enveloped events. Each subscriber gets its own stream.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEventEnvelope> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(crate::defaults::EVENT_BUS_CAPACITY)
    }
}
