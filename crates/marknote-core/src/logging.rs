//! Structured logging field names for the marknote client.
//!
//! All crates use these names for structured `tracing` fields so log output
//! from the gateway, the store, and the autosave task can be filtered by the
//! same keys.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Internal invariant broken, should never happen |
//! | WARN  | Recoverable failure surfaced to the caller or swallowed with fallback |
//! | INFO  | Completed mutations (created, saved, deleted), lifecycle |
//! | DEBUG | Decision points (autosave skipped, stale response discarded) |
//! | TRACE | Per-request payload sizes |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "gateway", "store", "autosave", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "http", "note_store", "scheduler", "last_opened"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "list_notes", "save", "remove", "tick"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Server-assigned note id being operated on.
pub const NOTE_ID: &str = "note_id";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of entries returned by a listing.
pub const RESULT_COUNT: &str = "result_count";

/// Byte length of a note body sent to the server.
pub const CONTENT_LEN: &str = "content_len";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// HTTP status code of a response.
pub const STATUS: &str = "status";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Server error code from a failed envelope.
pub const ERROR_CODE: &str = "code";
