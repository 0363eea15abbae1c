//! Error types for the remote client.
//!
//! Every backend call resolves to a single `ApiError` on failure. There is
//! no retry layer: one failed request surfaces immediately to the caller.

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure before a response was received.
    #[error("Request to backend failed: {0}")]
    Connection(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Backend returned {status}: {message}")]
    Backend {
        status: u16,
        /// Error code reported by the backend, when present
        /// (e.g. PostgREST `PGRST116`).
        code: Option<String>,
        message: String,
    },

    /// A success response whose body did not match the expected schema.
    #[error("Failed to decode backend response: {0}")]
    Decode(String),

    /// The operation requires an authenticated session and none is held.
    #[error("No active session")]
    NoSession,
}

/// Error body shapes returned by the backend. The auth and table surfaces
/// use different field names, so all known spellings are accepted.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
}

impl ApiError {
    /// Build a `Backend` error from a response status and raw body.
    pub(crate) fn from_parts(status: u16, body: &[u8]) -> Self {
        let raw = String::from_utf8_lossy(body);
        match serde_json::from_slice::<ErrorBody>(body) {
            Ok(parsed) => {
                let message = parsed
                    .message
                    .or(parsed.msg)
                    .or(parsed.error_description)
                    .unwrap_or_else(|| raw.trim().to_string());
                ApiError::Backend {
                    status,
                    code: parsed.code,
                    message,
                }
            }
            Err(_) => ApiError::Backend {
                status,
                code: None,
                message: raw.trim().to_string(),
            },
        }
    }

    /// Consume a non-success response into a `Backend` error.
    pub(crate) async fn from_response(resp: reqwest::Response) -> Self {
        let status = resp.status().as_u16();
        let body = resp.bytes().await.unwrap_or_default();
        Self::from_parts(status, &body)
    }

    /// The HTTP status of a `Backend` error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend rejected the request's credentials.
    pub fn is_auth_error(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}
