//! Centralized default constants for the marknote client.
//!
//! **This module is the single source of truth** for shared default values.
//! Configuration loaders fall back to these when an environment variable is
//! unset or unparsable.

use std::time::Duration;

// =============================================================================
// REMOTE API
// =============================================================================

/// Default base URL of the note API.
pub const API_URL: &str = "http://localhost:8080/api";

/// Timeout for a single API request in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Name of the session cookie issued by the note API.
pub const SESSION_COOKIE_NAME: &str = "token";

// =============================================================================
// AUTOSAVE
// =============================================================================

/// Autosave debounce window in seconds.
pub const AUTOSAVE_PERIOD_SECS: u64 = 5;

/// Autosave debounce window.
pub const AUTOSAVE_PERIOD: Duration = Duration::from_secs(AUTOSAVE_PERIOD_SECS);

// =============================================================================
// STORE
// =============================================================================

/// Broadcast capacity of the store event bus.
pub const EVENT_BUS_CAPACITY: usize = 64;

/// Directory name used under the user's local data dir.
pub const STATE_DIR_NAME: &str = "marknote";

/// File holding the last opened note id.
pub const LAST_OPENED_FILE: &str = "last_opened.json";

// =============================================================================
// EDITOR
// =============================================================================

/// Separator used by the tag input field.
pub const TAG_SEPARATOR: char = ';';

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_autosave_period_matches_secs() {
        assert_eq!(AUTOSAVE_PERIOD.as_secs(), AUTOSAVE_PERIOD_SECS);
    }

    #[test]
    fn test_api_url_is_http() {
        assert!(API_URL.starts_with("http://") || API_URL.starts_with("https://"));
        assert!(!API_URL.ends_with('/'));
    }
}
