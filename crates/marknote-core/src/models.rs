//! Data models shared with the remote note API.
//!
//! Field names follow the API's JSON exactly; the full note body travels
//! under the `note` key.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tags::clean_tags;

// =============================================================================
// ALLOWANCE
// =============================================================================

/// Note-level permission label returned by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Allowance {
    Owner,
    ReadWrite,
    Read,
    Forbidden,
}

impl Allowance {
    /// Whether update and delete may be attempted for a note with this allowance.
    ///
    /// `Forbidden` notes are never writable; the server would not hand out a
    /// body for them in the first place.
    pub fn can_write(&self) -> bool {
        matches!(self, Allowance::Owner | Allowance::ReadWrite)
    }
}

impl fmt::Display for Allowance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => write!(f, "Owner"),
            Self::ReadWrite => write!(f, "ReadWrite"),
            Self::Read => write!(f, "Read"),
            Self::Forbidden => write!(f, "Forbidden"),
        }
    }
}

// =============================================================================
// NOTES
// =============================================================================

/// Shallow note representation used in list views (no body content).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSummary {
    pub note_id: String,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub allowance: Allowance,
}

impl NoteSummary {
    /// Patch this entry in place from a full note returned by the server.
    /// Empty tags in the response are not listed.
    pub fn apply(&mut self, note: &Note) {
        self.title = note.body.title.clone();
        self.tags = clean_tags(&note.body.tags);
        self.allowance = note.allowance;
    }
}

/// Editable part of a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteBody {
    pub title: String,
    /// Raw markdown.
    #[serde(default)]
    pub content: String,
    pub owner_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A full editable document.
///
/// `note_id` is assigned by the server and never changes; the client never
/// constructs one itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub note_id: String,
    #[serde(rename = "note")]
    pub body: NoteBody,
    pub allowance: Allowance,
}

impl Note {
    /// List-view projection of this note.
    pub fn summary(&self) -> NoteSummary {
        NoteSummary {
            note_id: self.note_id.clone(),
            title: self.body.title.clone(),
            tags: self.body.tags.clone(),
            allowance: self.allowance,
        }
    }

    /// Build the update payload for this note, dropping empty tags.
    pub fn to_update_request(&self) -> UpdateNoteRequest {
        UpdateNoteRequest {
            title: self.body.title.clone(),
            content: self.body.content.clone(),
            owner_id: self.body.owner_id.clone(),
            tags: clean_tags(&self.body.tags),
        }
    }

    pub fn is_writable(&self) -> bool {
        self.allowance.can_write()
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

/// Body of `POST /note`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

impl CreateNoteRequest {
    /// A new note with empty content and no tags.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: String::new(),
            tags: Vec::new(),
        }
    }
}

/// Body of `PUT /note/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: String,
    pub content: String,
    pub owner_id: String,
    pub tags: Vec<String>,
}

// =============================================================================
// RESPONSE ENVELOPE
// =============================================================================

/// Envelope wrapping every API response.
///
/// `content` is absent or null on failure, and carries an arbitrary
/// confirmation value for deletes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub content: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Successful envelope around `content`.
    pub fn ok(content: T) -> Self {
        Self {
            success: true,
            content: Some(content),
            code: None,
            message: None,
        }
    }

    /// Failed envelope with a code and message.
    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            content: None,
            code: Some(code.into()),
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_note() -> Note {
        Note {
            note_id: "n1".to_string(),
            body: NoteBody {
                title: "Groceries".to_string(),
                content: "- [ ] milk".to_string(),
                owner_id: "u1".to_string(),
                tags: vec!["home".to_string(), "".to_string(), "todo".to_string()],
            },
            allowance: Allowance::Owner,
        }
    }

    #[test]
    fn test_allowance_can_write() {
        assert!(Allowance::Owner.can_write());
        assert!(Allowance::ReadWrite.can_write());
        assert!(!Allowance::Read.can_write());
        assert!(!Allowance::Forbidden.can_write());
    }

    #[test]
    fn test_allowance_wire_names() {
        assert_eq!(
            serde_json::to_string(&Allowance::ReadWrite).unwrap(),
            "\"ReadWrite\""
        );
        let parsed: Allowance = serde_json::from_str("\"Read\"").unwrap();
        assert_eq!(parsed, Allowance::Read);
        assert!(serde_json::from_str::<Allowance>("\"Admin\"").is_err());
    }

    #[test]
    fn test_note_body_uses_note_key() {
        let json = serde_json::to_value(sample_note()).unwrap();
        assert_eq!(json["note"]["title"], "Groceries");
        assert_eq!(json["note"]["owner_id"], "u1");
        assert!(json.get("body").is_none());
    }

    #[test]
    fn test_note_deserialize_from_api_shape() {
        let json = serde_json::json!({
            "note_id": "abc",
            "note": {"title": "T", "content": "# hi", "owner_id": "u9", "tags": ["x"]},
            "allowance": "ReadWrite"
        });
        let note: Note = serde_json::from_value(json).unwrap();
        assert_eq!(note.note_id, "abc");
        assert_eq!(note.body.content, "# hi");
        assert_eq!(note.allowance, Allowance::ReadWrite);
    }

    #[test]
    fn test_summary_missing_tags_defaults_empty() {
        let json = serde_json::json!({"note_id": "a", "title": "T", "allowance": "Owner"});
        let summary: NoteSummary = serde_json::from_value(json).unwrap();
        assert!(summary.tags.is_empty());
    }

    #[test]
    fn test_update_request_drops_empty_tags() {
        let req = sample_note().to_update_request();
        assert_eq!(req.tags, vec!["home", "todo"]);
        assert_eq!(req.owner_id, "u1");
    }

    #[test]
    fn test_summary_apply_patches_fields() {
        let mut summary = NoteSummary {
            note_id: "n1".to_string(),
            title: "Old".to_string(),
            tags: vec![],
            allowance: Allowance::ReadWrite,
        };
        summary.apply(&sample_note());
        assert_eq!(summary.title, "Groceries");
        assert_eq!(summary.tags, vec!["home", "todo"]);
        assert_eq!(summary.allowance, Allowance::Owner);
    }

    #[test]
    fn test_envelope_failure_without_content() {
        let json = r#"{"success": false, "code": "NOT_FOUND", "message": "gone"}"#;
        let env: ApiEnvelope<Note> = serde_json::from_str(json).unwrap();
        assert!(!env.success);
        assert!(env.content.is_none());
        assert_eq!(env.code.as_deref(), Some("NOT_FOUND"));
    }

    #[test]
    fn test_envelope_null_content() {
        let json = r#"{"success": true, "content": null}"#;
        let env: ApiEnvelope<serde_json::Value> = serde_json::from_str(json).unwrap();
        assert!(env.success);
        assert!(env.content.is_none());
    }
}
