//! In-memory note gateway for deterministic testing.
//!
//! Behaves like a well-behaved note API: ids are assigned on create, updates
//! echo the stored note back, deletes remove it from the listing. Every call
//! is logged so tests can assert on what reached the "server".
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use marknote_core::Allowance;
//! use marknote_editor::mock::MockNoteGateway;
//! use marknote_editor::NoteStore;
//!
//! # async fn demo() {
//! let gateway = Arc::new(MockNoteGateway::new().with_note("n1", "Groceries", Allowance::Owner));
//! let store = NoteStore::new(gateway.clone());
//! store.load_summaries().await;
//! assert_eq!(gateway.call_count("list_notes"), 1);
//! # }
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use marknote_core::{
    Allowance, CreateNoteRequest, Error, Note, NoteBody, NoteGateway, NoteSummary, Result,
    UpdateNoteRequest,
};

/// Owner id stamped on notes created through the mock.
pub const MOCK_OWNER_ID: &str = "mock-user";

/// One recorded gateway call.
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    /// Gateway method name, e.g. `"update_note"`.
    pub operation: String,
    /// Note id the call targeted, if any.
    pub note_id: Option<String>,
    /// Update payload, for `update_note` calls.
    pub update: Option<UpdateNoteRequest>,
}

#[derive(Debug, Default)]
struct MockState {
    notes: Vec<Note>,
    failures: HashMap<String, FailureMode>,
    latency: HashMap<String, Duration>,
}

#[derive(Debug, Clone)]
enum FailureMode {
    Transport(String),
    NotFound,
}

impl FailureMode {
    fn to_error(&self, note_id: Option<&str>) -> Error {
        match self {
            FailureMode::Transport(message) => Error::Transport {
                code: Some("MOCK_FAILURE".to_string()),
                message: message.clone(),
            },
            FailureMode::NotFound => {
                Error::NotFound(format!("note {}", note_id.unwrap_or_default()))
            }
        }
    }
}

/// Mock note gateway.
#[derive(Clone, Default)]
pub struct MockNoteGateway {
    state: Arc<Mutex<MockState>>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
    next_id: Arc<AtomicU64>,
}

impl MockNoteGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a note with empty content, owned by [`MOCK_OWNER_ID`].
    pub fn with_note(self, note_id: &str, title: &str, allowance: Allowance) -> Self {
        self.insert(Note {
            note_id: note_id.to_string(),
            body: NoteBody {
                title: title.to_string(),
                content: String::new(),
                owner_id: MOCK_OWNER_ID.to_string(),
                tags: Vec::new(),
            },
            allowance,
        });
        self
    }

    /// Seed a fully specified note.
    pub fn with_full_note(self, note: Note) -> Self {
        self.insert(note);
        self
    }

    /// Make every call to `operation` fail with a transport error.
    pub fn with_failure(self, operation: &str, message: &str) -> Self {
        self.fail(operation, message);
        self
    }

    /// Delay every call to `operation`.
    pub fn with_latency(self, operation: &str, latency: Duration) -> Self {
        self.set_latency(operation, latency);
        self
    }

    /// Change the delay of `operation`. Calls already waiting keep theirs.
    pub fn set_latency(&self, operation: &str, latency: Duration) {
        self.lock_state()
            .latency
            .insert(operation.to_string(), latency);
    }

    /// Start failing `operation` with a transport error.
    pub fn fail(&self, operation: &str, message: &str) {
        self.lock_state().failures.insert(
            operation.to_string(),
            FailureMode::Transport(message.to_string()),
        );
    }

    /// Start failing `operation` with a not-found error.
    pub fn fail_not_found(&self, operation: &str) {
        self.lock_state()
            .failures
            .insert(operation.to_string(), FailureMode::NotFound);
    }

    /// Stop failing `operation`.
    pub fn recover(&self, operation: &str) {
        self.lock_state().failures.remove(operation);
    }

    /// Insert or replace a note, as another client would.
    pub fn insert(&self, note: Note) {
        let mut state = self.lock_state();
        match state.notes.iter_mut().find(|n| n.note_id == note.note_id) {
            Some(existing) => *existing = note,
            None => state.notes.push(note),
        }
    }

    /// Remove a note behind the store's back, as another client would.
    pub fn delete_externally(&self, note_id: &str) {
        self.lock_state().notes.retain(|n| n.note_id != note_id);
    }

    /// Current server-side copy of a note.
    pub fn stored(&self, note_id: &str) -> Option<Note> {
        self.lock_state()
            .notes
            .iter()
            .find(|n| n.note_id == note_id)
            .cloned()
    }

    pub fn get_calls(&self) -> Vec<MockCall> {
        self.lock_log().clone()
    }

    pub fn clear_calls(&self) {
        self.lock_log().clear()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.lock_log()
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    /// Number of calls that would have changed server state.
    pub fn mutation_count(&self) -> usize {
        self.lock_log()
            .iter()
            .filter(|c| {
                matches!(
                    c.operation.as_str(),
                    "create_note" | "update_note" | "delete_note"
                )
            })
            .count()
    }

    /// Payload of the most recent `update_note` call.
    pub fn last_update(&self) -> Option<UpdateNoteRequest> {
        self.lock_log()
            .iter()
            .rev()
            .find_map(|c| c.update.clone())
    }

    fn lock_state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_log(&self) -> MutexGuard<'_, Vec<MockCall>> {
        self.call_log.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Log the call, wait out any latency, then apply failure injection.
    async fn enter(
        &self,
        operation: &str,
        note_id: Option<&str>,
        update: Option<&UpdateNoteRequest>,
    ) -> Result<()> {
        self.lock_log().push(MockCall {
            operation: operation.to_string(),
            note_id: note_id.map(str::to_string),
            update: update.cloned(),
        });

        let latency = self.lock_state().latency.get(operation).copied();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let failure = self.lock_state().failures.get(operation).cloned();
        match failure {
            Some(mode) => Err(mode.to_error(note_id)),
            None => Ok(()),
        }
    }

    fn missing(note_id: &str) -> Error {
        Error::NotFound(format!("note {}", note_id))
    }
}

#[async_trait]
impl NoteGateway for MockNoteGateway {
    async fn list_notes(&self) -> Result<Vec<NoteSummary>> {
        self.enter("list_notes", None, None).await?;
        Ok(self.lock_state().notes.iter().map(Note::summary).collect())
    }

    async fn get_note(&self, note_id: &str) -> Result<Note> {
        self.enter("get_note", Some(note_id), None).await?;
        self.stored(note_id).ok_or_else(|| Self::missing(note_id))
    }

    async fn create_note(&self, req: &CreateNoteRequest) -> Result<Note> {
        self.enter("create_note", None, None).await?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let note = Note {
            note_id: format!("mock-{}", id),
            body: NoteBody {
                title: req.title.clone(),
                content: req.content.clone(),
                owner_id: MOCK_OWNER_ID.to_string(),
                tags: req.tags.clone(),
            },
            allowance: Allowance::Owner,
        };
        self.insert(note.clone());
        Ok(note)
    }

    async fn update_note(&self, note_id: &str, req: &UpdateNoteRequest) -> Result<Note> {
        self.enter("update_note", Some(note_id), Some(req)).await?;
        let mut state = self.lock_state();
        let note = state
            .notes
            .iter_mut()
            .find(|n| n.note_id == note_id)
            .ok_or_else(|| Self::missing(note_id))?;
        note.body = NoteBody {
            title: req.title.clone(),
            content: req.content.clone(),
            owner_id: req.owner_id.clone(),
            tags: req.tags.clone(),
        };
        Ok(note.clone())
    }

    async fn delete_note(&self, note_id: &str) -> Result<()> {
        self.enter("delete_note", Some(note_id), None).await?;
        let mut state = self.lock_state();
        let before = state.notes.len();
        state.notes.retain(|n| n.note_id != note_id);
        if state.notes.len() == before {
            return Err(Self::missing(note_id));
        }
        Ok(())
    }
}
