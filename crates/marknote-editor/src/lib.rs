//! # marknote-editor
//!
//! Client-side editing and synchronization state for marknote.
//!
//! - [`NoteStore`]: the note list, the open note, and every remote note
//!   operation, observable through a `watch` channel and a store event bus.
//! - [`AutosaveScheduler`]: debounced background saving of the open note.
//! - [`LastOpened`]: the id of the last opened note, kept on disk between runs.
//! - [`mock::MockNoteGateway`]: in-memory gateway for tests.

pub mod autosave;
pub mod last_opened;
pub mod mock;
pub mod session;
pub mod store;

pub use autosave::{
    AutosaveConfig, AutosaveHandle, AutosavePhase, AutosaveScheduler, AutosaveStatus,
};
pub use last_opened::LastOpened;
pub use session::EditorSession;
pub use store::{NoteStore, StoreState};
