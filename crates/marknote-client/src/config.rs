//! Configuration for the HTTP note gateway.

use std::time::Duration;

use marknote_core::{defaults, Error, Result};
use reqwest::Url;

/// Connection settings for [`crate::HttpNoteGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, e.g. `http://localhost:8080/api`. A trailing slash is ignored.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Session token to preload into the cookie jar, if the caller already
    /// holds one. Cookies set by the server are kept either way.
    pub session_token: Option<String>,
    /// Name of the session cookie.
    pub session_cookie_name: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::API_URL.to_string(),
            timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
            session_token: None,
            session_cookie_name: defaults::SESSION_COOKIE_NAME.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load from environment variables, falling back to defaults.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `MARKNOTE_API_URL` | `http://localhost:8080/api` |
    /// | `MARKNOTE_TIMEOUT_SECS` | `30` |
    /// | `MARKNOTE_SESSION_TOKEN` | unset |
    /// | `MARKNOTE_SESSION_COOKIE` | `token` |
    pub fn from_env() -> Result<Self> {
        let config = ClientConfig {
            base_url: std::env::var("MARKNOTE_API_URL")
                .unwrap_or_else(|_| defaults::API_URL.to_string()),
            timeout_secs: std::env::var("MARKNOTE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults::REQUEST_TIMEOUT_SECS),
            session_token: std::env::var("MARKNOTE_SESSION_TOKEN")
                .ok()
                .filter(|v| !v.is_empty()),
            session_cookie_name: std::env::var("MARKNOTE_SESSION_COOKIE")
                .unwrap_or_else(|_| defaults::SESSION_COOKIE_NAME.to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check the settings before building a client.
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "API URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout must be at least 1 second".into()));
        }
        if self.session_cookie_name.trim().is_empty() {
            return Err(Error::Config("session cookie name must not be empty".into()));
        }
        Ok(())
    }

    /// `base_url` joined with `path`, tolerating a trailing slash on the base.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// URL of a single note. The id is percent-encoded as one path segment.
    pub fn note_endpoint(&self, note_id: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("invalid API URL '{}': {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("API URL '{}' cannot be a base", self.base_url)))?
            .pop_if_empty()
            .push("note")
            .push(note_id);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080/api");
        assert_eq!(config.session_cookie_name, "token");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_http_url() {
        let config = ClientConfig::default().with_base_url("ftp://notes");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = ClientConfig::default().with_timeout_secs(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = ClientConfig::default().with_base_url("https://example.com/api/");
        assert_eq!(config.endpoint("/notes"), "https://example.com/api/notes");
    }

    #[test]
    fn test_note_endpoint_encodes_id() {
        let config = ClientConfig::default().with_base_url("https://example.com/api/");
        let url = config.note_endpoint("a/b?c#d").unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/note/a%2Fb%3Fc%23d");

        let plain = ClientConfig::default().note_endpoint("n1").unwrap();
        assert_eq!(plain.as_str(), "http://localhost:8080/api/note/n1");
    }

    #[test]
    fn test_builders() {
        let config = ClientConfig::default()
            .with_session_token("abc")
            .with_timeout_secs(3);
        assert_eq!(config.session_token.as_deref(), Some("abc"));
        assert_eq!(config.timeout(), Duration::from_secs(3));
    }
}
