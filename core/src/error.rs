//! Error types for the Watson client.
//!
//! # Design
//! Every non-2xx response lands in `Remote` with the raw status and body,
//! whatever the status value. `Transport` is kept apart from `Remote`: the
//! former means the request may never have reached the server, the latter
//! means the server saw it and rejected it.

use thiserror::Error;

use crate::decode::DecodeError;

#[derive(Debug, Error)]
pub enum WatsonError {
    /// A required argument was missing or malformed. Raised before any I/O.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: String, reason: String },

    /// The service answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    /// The response body could not be mapped to the expected type.
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// The request never completed (connect failure, timeout, reset).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("configuration error: {0}")]
    Config(String),

    /// A bounded poll ran out of attempts before reaching a terminal state.
    #[error("gave up after {attempts} poll attempts")]
    PollExhausted { attempts: u32 },
}

pub type Result<T> = std::result::Result<T, WatsonError>;

impl WatsonError {
    pub(crate) fn invalid_argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
        WatsonError::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// HTTP status of a `Remote` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            WatsonError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether repeating the call may succeed without changing it.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WatsonError::Transport(_))
    }

    /// Human-readable message from a Watson error body.
    ///
    /// Watson services answer either `{"error": "...", "code": 404}` or
    /// `{"error": {"description": "..."}}`; anything else yields `None`.
    pub fn remote_message(&self) -> Option<String> {
        let WatsonError::Remote { body, .. } = self else {
            return None;
        };
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        let error = value.get("error");
        error
            .and_then(|e| e.as_str())
            .or_else(|| error.and_then(|e| e.get("description")).and_then(|d| d.as_str()))
            .or_else(|| value.get("description").and_then(|d| d.as_str()))
            .map(str::to_string)
    }
}
