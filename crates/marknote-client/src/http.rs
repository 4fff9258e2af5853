//! reqwest-backed note gateway.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, trace, warn};

use marknote_core::{
    CreateNoteRequest, Error, Note, NoteGateway, NoteSummary, Result, UpdateNoteRequest,
};

use crate::config::ClientConfig;
use crate::envelope::{decode_ack, decode_content};

/// Note gateway talking to the remote API over HTTP/JSON.
///
/// The underlying client keeps a cookie jar, so a session cookie set by the
/// server (or preloaded from [`ClientConfig::session_token`]) is sent on every
/// request.
#[derive(Debug, Clone)]
pub struct HttpNoteGateway {
    client: Client,
    config: ClientConfig,
}

impl HttpNoteGateway {
    /// Build a gateway from validated settings.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let base = Url::parse(&config.base_url)
            .map_err(|e| Error::Config(format!("invalid API URL '{}': {}", config.base_url, e)))?;
        let jar = Jar::default();
        if let Some(token) = &config.session_token {
            jar.add_cookie_str(
                &format!("{}={}; Path=/", config.session_cookie_name, token),
                &base,
            );
        }

        let client = Client::builder()
            .cookie_provider(Arc::new(jar))
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        info!(
            subsystem = "gateway",
            component = "http",
            base_url = %config.base_url,
            timeout_secs = config.timeout_secs,
            session_preloaded = config.session_token.is_some(),
            "Initializing HTTP note gateway"
        );

        Ok(Self { client, config })
    }

    /// Build a gateway from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send a request and hand back the status and raw body.
    async fn send(&self, request: RequestBuilder) -> Result<(u16, String)> {
        let start = Instant::now();
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Note API request failed");
            Error::from(e)
        })?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(
            status,
            duration_ms = start.elapsed().as_millis() as u64,
            "Note API responded"
        );
        trace!(body_len = body.len(), "Note API response body");
        Ok((status, body))
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let (status, body) = self.send(request).await?;
        decode_content(status, &body)
    }
}

#[async_trait]
impl NoteGateway for HttpNoteGateway {
    #[instrument(skip(self), fields(subsystem = "gateway", component = "http", op = "list_notes"))]
    async fn list_notes(&self) -> Result<Vec<NoteSummary>> {
        let request = self.client.get(self.config.endpoint("/notes"));
        let notes: Vec<NoteSummary> = self.fetch(request).await?;
        debug!(result_count = notes.len(), "Listed notes");
        Ok(notes)
    }

    #[instrument(skip(self), fields(subsystem = "gateway", component = "http", op = "get_note"))]
    async fn get_note(&self, note_id: &str) -> Result<Note> {
        let request = self.client.get(self.config.note_endpoint(note_id)?);
        self.fetch(request).await
    }

    #[instrument(
        skip(self, req),
        fields(
            subsystem = "gateway",
            component = "http",
            op = "create_note",
            title_len = req.title.len()
        )
    )]
    async fn create_note(&self, req: &CreateNoteRequest) -> Result<Note> {
        let request = self.client.post(self.config.endpoint("/note")).json(req);
        self.fetch(request).await
    }

    #[instrument(
        skip(self, req),
        fields(
            subsystem = "gateway",
            component = "http",
            op = "update_note",
            content_len = req.content.len()
        )
    )]
    async fn update_note(&self, note_id: &str, req: &UpdateNoteRequest) -> Result<Note> {
        let request = self
            .client
            .put(self.config.note_endpoint(note_id)?)
            .json(req);
        self.fetch(request).await
    }

    #[instrument(skip(self), fields(subsystem = "gateway", component = "http", op = "delete_note"))]
    async fn delete_note(&self, note_id: &str) -> Result<()> {
        let request = self.client.delete(self.config.note_endpoint(note_id)?);
        let (status, body) = self.send(request).await?;
        decode_ack(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ClientConfig::default().with_base_url("localhost:8080");
        assert!(matches!(
            HttpNoteGateway::new(config),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_new_with_session_token() {
        let config = ClientConfig::default().with_session_token("abc");
        let gateway = HttpNoteGateway::new(config).unwrap();
        assert_eq!(gateway.config().session_token.as_deref(), Some("abc"));
    }
}
