//! The note store: summaries, the open note, and every remote note operation.
//!
//! State lives in a `tokio::sync::watch` channel. Operations read what they
//! need, release the borrow, await the gateway, and only then write their
//! result back, so nothing is mutated before a remote call succeeds and a
//! slow response can never block other operations. Overlapping operations
//! resolve last-writer-wins.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use marknote_core::{
    clean_tags, content_hash, parse_tag_input, Allowance, CreateNoteRequest, Error, EventBus,
    Note, NoteGateway, NoteSummary, Result, Splice, StoreEvent,
};

use crate::last_opened::LastOpened;
use crate::session::EditorSession;

/// Snapshot of everything the store owns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
    /// Note list, in server order.
    pub summaries: Vec<NoteSummary>,
    /// The open note, if any.
    pub session: Option<EditorSession>,
    /// Bumped on every edit and every change of session (open, close,
    /// delete). Saves do not bump it.
    pub revision: u64,
    /// Bumped only when the session is replaced or dropped (open, create,
    /// close, delete). Edits and saves leave it alone.
    pub generation: u64,
    /// Completion time of the last successful save of the open note.
    pub last_saved_at: Option<DateTime<Utc>>,
}

impl StoreState {
    pub fn open_note_id(&self) -> Option<&str> {
        self.session.as_ref().map(EditorSession::note_id)
    }

    fn allowance_of(&self, note_id: &str) -> Option<Allowance> {
        match &self.session {
            Some(session) if session.note_id() == note_id => Some(session.allowance()),
            _ => self
                .summaries
                .iter()
                .find(|s| s.note_id == note_id)
                .map(|s| s.allowance),
        }
    }
}

/// Single source of truth for which notes exist and which one is open.
///
/// The store is the only component that talks to the [`NoteGateway`]. Share
/// it as `Arc<NoteStore<G>>` between the UI and the autosave task.
pub struct NoteStore<G> {
    gateway: Arc<G>,
    state: watch::Sender<StoreState>,
    events: EventBus,
    last_opened: Option<LastOpened>,
}

impl<G: NoteGateway> NoteStore<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self {
            gateway,
            state,
            events: EventBus::default(),
            last_opened: None,
        }
    }

    /// Persist the last opened note id in `slot`.
    pub fn with_last_opened(mut self, slot: LastOpened) -> Self {
        self.last_opened = Some(slot);
        self
    }

    /// Publish store events on an existing bus.
    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Observe state changes.
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> StoreState {
        self.state.borrow().clone()
    }

    pub fn summaries(&self) -> Vec<NoteSummary> {
        self.state.borrow().summaries.clone()
    }

    pub fn open_note(&self) -> Option<Note> {
        self.state
            .borrow()
            .session
            .as_ref()
            .map(|s| s.note().clone())
    }

    pub fn open_note_id(&self) -> Option<String> {
        self.state.borrow().open_note_id().map(str::to_string)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.state
            .borrow()
            .session
            .as_ref()
            .is_some_and(EditorSession::has_unsaved_changes)
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.state.borrow().last_saved_at
    }

    // =========================================================================
    // Remote operations
    // =========================================================================

    /// Fetch the note list and replace the summaries with it.
    ///
    /// A listing failure is logged and leaves an empty list; it is never
    /// returned to the caller.
    #[instrument(
        skip(self),
        fields(subsystem = "store", component = "note_store", op = "load_summaries")
    )]
    pub async fn load_summaries(&self) {
        match self.gateway.list_notes().await {
            Ok(summaries) => {
                let count = summaries.len();
                self.state.send_modify(|state| state.summaries = summaries);
                debug!(result_count = count, "Loaded note summaries");
                self.events.emit(StoreEvent::SummariesLoaded { count });
            }
            Err(e) => {
                warn!(error = %e, "Listing notes failed, showing an empty list");
                self.state.send_modify(|state| state.summaries.clear());
                self.events.emit(StoreEvent::SummariesLoadFailed {
                    error: e.to_string(),
                });
            }
        }
    }

    /// Fetch a note and make it the open note.
    ///
    /// Unsaved edits in the previously open note are discarded; call
    /// [`NoteStore::save`] first to keep them. On failure the previous
    /// session is left untouched.
    #[instrument(skip(self), fields(subsystem = "store", component = "note_store", op = "open"))]
    pub async fn open_by_id(&self, note_id: &str) -> Result<Note> {
        let note = match self.gateway.get_note(note_id).await {
            Ok(note) => note,
            Err(e) => {
                warn!(error = %e, "Opening note failed");
                self.events.emit(StoreEvent::OpenFailed {
                    note_id: note_id.to_string(),
                    error: e.to_string(),
                });
                return Err(e);
            }
        };

        self.state.send_modify(|state| {
            state.session = Some(EditorSession::open(note.clone()));
            state.revision += 1;
            state.generation += 1;
            state.last_saved_at = None;
        });
        self.remember(&note.note_id);
        debug!(allowance = %note.allowance, "Opened note");
        self.events.emit(StoreEvent::NoteOpened {
            note_id: note.note_id.clone(),
        });
        Ok(note)
    }

    /// Sidebar click: selecting the open note closes it, anything else opens.
    ///
    /// Returns the newly opened note, or `None` when the click closed one.
    pub async fn select(&self, note_id: &str) -> Result<Option<Note>> {
        if self.open_note_id().as_deref() == Some(note_id) {
            self.close();
            return Ok(None);
        }
        self.open_by_id(note_id).await.map(Some)
    }

    /// Create a note with empty content and no tags, list it and open it.
    #[instrument(skip(self), fields(subsystem = "store", component = "note_store", op = "create"))]
    pub async fn create(&self, title: &str) -> Result<Note> {
        if title.trim().is_empty() {
            return Err(Error::Validation("note title must not be empty".into()));
        }

        let note = self
            .gateway
            .create_note(&CreateNoteRequest::titled(title))
            .await
            .inspect_err(|e| warn!(error = %e, "Creating note failed"))?;

        self.state.send_modify(|state| {
            if !state.summaries.iter().any(|s| s.note_id == note.note_id) {
                state.summaries.push(note.summary());
            }
            state.session = Some(EditorSession::open(note.clone()));
            state.revision += 1;
            state.generation += 1;
            state.last_saved_at = None;
        });
        self.remember(&note.note_id);
        info!(note_id = %note.note_id, "Created note");
        self.events.emit(StoreEvent::NoteCreated {
            note_id: note.note_id.clone(),
            title: note.body.title.clone(),
        });
        Ok(note)
    }

    /// Send the open note to the server.
    ///
    /// Returns `Ok(None)` when no note is open and [`Error::Permission`] for a
    /// read-only note, without contacting the server in either case. Empty
    /// tags are dropped from the payload. A failed save keeps every local
    /// edit and is not retried.
    pub async fn save(&self) -> Result<Option<Note>> {
        self.save_inner(false).await
    }

    pub(crate) async fn save_from_autosave(&self) -> Result<Option<Note>> {
        self.save_inner(true).await
    }

    #[instrument(skip(self), fields(subsystem = "store", component = "note_store", op = "save"))]
    async fn save_inner(&self, autosave: bool) -> Result<Option<Note>> {
        let (note_id, request, revision, generation) = {
            let state = self.state.borrow();
            let Some(session) = state.session.as_ref() else {
                return Ok(None);
            };
            if !session.is_writable() {
                return Err(Error::Permission(format!(
                    "note {} is {}",
                    session.note_id(),
                    session.allowance()
                )));
            }
            (
                session.note_id().to_string(),
                session.note().to_update_request(),
                state.revision,
                state.generation,
            )
        };
        let sent_hash = content_hash(&request.content);

        let saved = match self.gateway.update_note(&note_id, &request).await {
            Ok(saved) => saved,
            Err(e) => {
                warn!(note_id = %note_id, error = %e, "Saving note failed, edits kept");
                self.events.emit(StoreEvent::SaveFailed {
                    note_id,
                    error: e.to_string(),
                    autosave,
                });
                return Err(e);
            }
        };

        let saved_at = Utc::now();
        self.state.send_modify(|state| {
            if let Some(summary) = state.summaries.iter_mut().find(|s| s.note_id == note_id) {
                summary.apply(&saved);
            }
            let same_session = state.generation == generation;
            let unedited = same_session && state.revision == revision;
            match state.session.as_mut() {
                Some(session) if session.note_id() != note_id => {
                    debug!(note_id = %note_id, "Another note was opened during save");
                }
                Some(session) if unedited => {
                    session.mark_saved(saved.clone());
                    state.last_saved_at = Some(saved_at);
                }
                Some(session) if same_session => {
                    session.mark_sent(sent_hash, saved.allowance);
                    state.last_saved_at = Some(saved_at);
                }
                // Reopened during the save; the fetched copy may predate it.
                Some(session) if !session.is_dirty() => {
                    session.mark_saved(saved.clone());
                    state.last_saved_at = Some(saved_at);
                }
                Some(_) => {
                    debug!(note_id = %note_id, "Reopened note was edited during save, kept as is");
                }
                None => debug!(note_id = %note_id, "Note was closed during save"),
            }
        });

        info!(note_id = %note_id, content_len = request.content.len(), autosave, "Saved note");
        self.events.emit(StoreEvent::NoteSaved {
            note_id,
            saved_at,
            autosave,
        });
        Ok(Some(saved))
    }

    /// Delete a note, then reload the note list.
    ///
    /// Read-only notes are refused locally. If the deleted note was open the
    /// session is cleared once the server confirms; on failure nothing changes.
    #[instrument(skip(self), fields(subsystem = "store", component = "note_store", op = "remove"))]
    pub async fn remove(&self, note_id: &str) -> Result<()> {
        let allowance = self.state.borrow().allowance_of(note_id);
        if let Some(allowance) = allowance {
            if !allowance.can_write() {
                return Err(Error::Permission(format!(
                    "note {} is {}",
                    note_id, allowance
                )));
            }
        }

        if let Err(e) = self.gateway.delete_note(note_id).await {
            warn!(error = %e, "Deleting note failed");
            self.events.emit(StoreEvent::DeleteFailed {
                note_id: note_id.to_string(),
                error: e.to_string(),
            });
            return Err(e);
        }

        let mut was_open = false;
        self.state.send_modify(|state| {
            if state.open_note_id() == Some(note_id) {
                state.session = None;
                state.revision += 1;
                state.generation += 1;
                state.last_saved_at = None;
                was_open = true;
            }
        });
        if was_open {
            self.forget();
        }
        info!(was_open, "Deleted note");
        self.events.emit(StoreEvent::NoteDeleted {
            note_id: note_id.to_string(),
        });

        self.load_summaries().await;
        Ok(())
    }

    /// Close the open note without saving. Returns the closed note's id.
    pub fn close(&self) -> Option<String> {
        let mut closed = None;
        self.state.send_if_modified(|state| match state.session.take() {
            Some(session) => {
                closed = Some(session.note_id().to_string());
                state.revision += 1;
                state.generation += 1;
                state.last_saved_at = None;
                true
            }
            None => false,
        });
        if let Some(note_id) = &closed {
            self.forget();
            debug!(note_id = %note_id, "Closed note");
            self.events.emit(StoreEvent::NoteClosed {
                note_id: note_id.clone(),
            });
        }
        closed
    }

    /// Reopen the note that was open when the client last ran.
    ///
    /// A note that no longer exists clears the stored id and yields `None`.
    pub async fn restore_last_opened(&self) -> Result<Option<Note>> {
        let Some(slot) = &self.last_opened else {
            return Ok(None);
        };
        let Some(note_id) = slot.load()? else {
            return Ok(None);
        };
        match self.open_by_id(&note_id).await {
            Ok(note) => Ok(Some(note)),
            Err(Error::NotFound(_)) => {
                debug!(note_id = %note_id, "Last opened note is gone");
                slot.clear()?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    // =========================================================================
    // Local edits
    // =========================================================================

    pub fn edit_title(&self, title: impl Into<String>) -> Result<()> {
        let title = title.into();
        self.edit(|note| note.body.title = title)
    }

    pub fn edit_content(&self, content: impl Into<String>) -> Result<()> {
        let content = content.into();
        self.edit(|note| note.body.content = content)
    }

    /// Replace the tags. Empty entries are kept until the next save.
    pub fn edit_tags(&self, tags: Vec<String>) -> Result<()> {
        self.edit(|note| note.body.tags = tags)
    }

    /// Replace the tags from the `;`-separated tag input field.
    pub fn edit_tags_input(&self, input: &str) -> Result<()> {
        self.edit_tags(parse_tag_input(input))
    }

    /// Write a text-splicing result into the open note's content and return
    /// the cursor the editor should move to.
    pub fn apply_splice(&self, splice: Splice) -> Result<usize> {
        let Splice { text, cursor } = splice;
        self.edit(|note| note.body.content = text)?;
        Ok(cursor)
    }

    /// Tags of the open note with empty entries removed.
    pub fn open_note_tags(&self) -> Vec<String> {
        self.state
            .borrow()
            .session
            .as_ref()
            .map(|s| clean_tags(&s.note().body.tags))
            .unwrap_or_default()
    }

    fn edit(&self, apply: impl FnOnce(&mut Note)) -> Result<()> {
        let mut outcome = Ok(());
        self.state.send_if_modified(|state| {
            let Some(session) = state.session.as_mut() else {
                outcome = Err(Error::Validation("no note is open".into()));
                return false;
            };
            if !session.is_writable() {
                outcome = Err(Error::Permission(format!(
                    "note {} is {}",
                    session.note_id(),
                    session.allowance()
                )));
                return false;
            }
            apply(session.note_mut());
            state.revision += 1;
            true
        });
        outcome
    }

    fn remember(&self, note_id: &str) {
        if let Some(slot) = &self.last_opened {
            if let Err(e) = slot.store(note_id) {
                warn!(note_id, error = %e, "Could not persist last opened note");
            }
        }
    }

    fn forget(&self) {
        if let Some(slot) = &self.last_opened {
            if let Err(e) = slot.clear() {
                warn!(error = %e, "Could not clear last opened note");
            }
        }
    }
}
