//! Response decoding at the gateway boundary.
//!
//! The API answers with `{success, content, code?, message?}`. Auth and
//! internal failures from the server's middleware come back instead as a bare
//! `{"error": "..."}` body with a 401/403/500 status. Both shapes are mapped
//! onto [`Error`] here so nothing loosely typed escapes the client.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use marknote_core::{ApiEnvelope, Error, Result};

/// Bare error body emitted outside the envelope.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Decode a response whose envelope must carry `T` as content.
pub fn decode_content<T: DeserializeOwned>(status: u16, body: &str) -> Result<T> {
    let content = decode_envelope(status, body)?
        .ok_or_else(|| Error::Serialization("response envelope has no content".to_string()))?;
    serde_json::from_value(content).map_err(Error::from)
}

/// Decode a response where only success matters (e.g. deletes, whose content
/// is an arbitrary confirmation value).
pub fn decode_ack(status: u16, body: &str) -> Result<()> {
    decode_envelope(status, body).map(|_| ())
}

/// Unwrap the envelope, returning its raw content on success.
fn decode_envelope(status: u16, body: &str) -> Result<Option<Value>> {
    match serde_json::from_str::<ApiEnvelope<Value>>(body) {
        Ok(envelope) if envelope.success => Ok(envelope.content),
        Ok(envelope) => Err(classify(status, envelope.code, envelope.message)),
        Err(decode_err) => {
            if let Ok(bare) = serde_json::from_str::<ErrorBody>(body) {
                return Err(classify(status, None, Some(bare.error)));
            }
            if is_success(status) {
                Err(Error::Serialization(format!(
                    "malformed response envelope: {}",
                    decode_err
                )))
            } else {
                Err(classify(status, None, None))
            }
        }
    }
}

/// Map a failed response onto the error taxonomy.
///
/// The HTTP status decides first; a server `code` mentioning "not found" or
/// "permission" is honoured for envelopes delivered with a 200.
pub fn classify(status: u16, code: Option<String>, message: Option<String>) -> Error {
    let message = message
        .filter(|m| !m.is_empty())
        .or_else(|| code.clone())
        .unwrap_or_else(|| format!("HTTP {}", status));
    let normalized = code
        .as_deref()
        .map(|c| c.to_ascii_lowercase().replace(['_', '-', ' '], ""))
        .unwrap_or_default();

    match status {
        404 => Error::NotFound(message),
        401 | 403 => Error::Permission(message),
        _ if normalized.contains("notfound") => Error::NotFound(message),
        _ if normalized.contains("permission") || normalized.contains("forbidden") => {
            Error::Permission(message)
        }
        _ => Error::Transport {
            code: code.or_else(|| (!is_success(status)).then(|| status.to_string())),
            message,
        },
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}
