//! The open-note editing session.

use marknote_core::{content_hash, Allowance, Note};

/// The single note currently loaded into the editor.
///
/// Created when a note is opened, replaced when another one is opened and
/// dropped on close or delete. Edits replace fields in place; the content
/// hash is only recomputed when someone asks ([`EditorSession::has_unsaved_changes`]),
/// never on every keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSession {
    note: Note,
    last_saved_hash: String,
    dirty: bool,
}

impl EditorSession {
    /// Start a session for a freshly loaded note. Its content counts as saved.
    pub fn open(note: Note) -> Self {
        let last_saved_hash = content_hash(&note.body.content);
        Self {
            note,
            last_saved_hash,
            dirty: false,
        }
    }

    pub fn note(&self) -> &Note {
        &self.note
    }

    pub fn note_id(&self) -> &str {
        &self.note.note_id
    }

    pub fn allowance(&self) -> Allowance {
        self.note.allowance
    }

    pub fn is_writable(&self) -> bool {
        self.note.is_writable()
    }

    /// Hash of the content last confirmed by the server.
    pub fn last_saved_hash(&self) -> &str {
        &self.last_saved_hash
    }

    /// Whether any field was edited since the last save or open.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the current content differs from the last saved content.
    pub fn has_unsaved_changes(&self) -> bool {
        content_hash(&self.note.body.content) != self.last_saved_hash
    }

    pub(crate) fn note_mut(&mut self) -> &mut Note {
        self.dirty = true;
        &mut self.note
    }

    /// Adopt the server's copy after a save with no edits in between.
    pub(crate) fn mark_saved(&mut self, saved: Note) {
        self.last_saved_hash = content_hash(&saved.body.content);
        self.note = saved;
        self.dirty = false;
    }

    /// Record a save that raced with further edits.
    ///
    /// Local fields are kept so nothing typed during the request is lost;
    /// only the allowance and the saved-content hash come from the response.
    pub(crate) fn mark_sent(&mut self, sent_hash: String, allowance: Allowance) {
        self.last_saved_hash = sent_hash;
        self.note.allowance = allowance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marknote_core::NoteBody;

    fn note(content: &str) -> Note {
        Note {
            note_id: "n1".to_string(),
            body: NoteBody {
                title: "T".to_string(),
                content: content.to_string(),
                owner_id: "u1".to_string(),
                tags: vec![],
            },
            allowance: Allowance::Owner,
        }
    }

    #[test]
    fn test_open_session_is_clean() {
        let session = EditorSession::open(note("hello"));
        assert!(!session.is_dirty());
        assert!(!session.has_unsaved_changes());
        assert_eq!(session.last_saved_hash(), content_hash("hello"));
    }

    #[test]
    fn test_edit_marks_dirty_and_unsaved() {
        let mut session = EditorSession::open(note("hello"));
        session.note_mut().body.content.push('!');
        assert!(session.is_dirty());
        assert!(session.has_unsaved_changes());
    }

    #[test]
    fn test_reverting_content_is_not_unsaved() {
        let mut session = EditorSession::open(note("hello"));
        session.note_mut().body.content = "changed".to_string();
        session.note_mut().body.content = "hello".to_string();
        assert!(session.is_dirty());
        assert!(!session.has_unsaved_changes());
    }

    #[test]
    fn test_mark_saved_adopts_server_copy() {
        let mut session = EditorSession::open(note("a"));
        session.note_mut().body.content = "b".to_string();
        let mut saved = note("b");
        saved.body.tags = vec!["server".to_string()];
        session.mark_saved(saved);
        assert!(!session.is_dirty());
        assert!(!session.has_unsaved_changes());
        assert_eq!(session.note().body.tags, vec!["server"]);
    }

    #[test]
    fn test_mark_sent_keeps_newer_edits() {
        let mut session = EditorSession::open(note("a"));
        session.note_mut().body.content = "ab".to_string();
        session.mark_sent(content_hash("a b"), Allowance::ReadWrite);
        assert_eq!(session.note().body.content, "ab");
        assert_eq!(session.allowance(), Allowance::ReadWrite);
        assert!(session.has_unsaved_changes());
    }
}
