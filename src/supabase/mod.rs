//! Typed client for the backend-as-a-service.
//!
//! The backend exposes three surfaces consumed here unmodified: an
//! authentication API, a relational-table API with filter and ordering
//! clauses, and an object-storage API addressed by bucket name. This module
//! owns the shared HTTP client and the current session; the submodules add
//! the per-surface request/response mapping.

mod auth;
mod error;
mod storage;
mod table;

pub use auth::{AuthUser, Session, UserMetadata};
pub use error::ApiError;
pub use storage::content_type_for;
pub use table::TableQuery;

use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::config::{SecureString, Settings};

/// Client for one backend project.
///
/// Cloning is cheap and all clones observe the same session. There is no
/// request timeout: a hung call suspends its operation until the transport
/// gives up.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    anon_key: SecureString,
    session: Arc<RwLock<Option<Session>>>,
}

impl SupabaseClient {
    /// Build a client from resolved settings.
    pub fn new(settings: &Settings) -> Self {
        Self {
            http: Client::new(),
            base_url: settings.url.trim_end_matches('/').to_string(),
            anon_key: settings.anon_key.clone(),
            session: Arc::new(RwLock::new(None)),
        }
    }

    /// The project base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Snapshot of the current session, if any.
    pub fn session(&self) -> Option<Session> {
        self.session.read().clone()
    }

    /// Replace the current session.
    pub fn set_session(&self, session: Option<Session>) {
        *self.session.write() = session;
    }

    /// Start a table query against `/rest/v1/{table}`.
    pub fn from(&self, table: &str) -> TableQuery {
        TableQuery::new(self.clone(), table)
    }

    /// Build a request carrying the API key and bearer token.
    ///
    /// Authenticated requests use the session's access token; anonymous
    /// requests fall back to the anon key, as the backend expects.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let bearer = match self.session.read().as_ref() {
            Some(session) => session.access_token.clone(),
            None => self.anon_key.expose().to_string(),
        };

        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", self.anon_key.expose())
            .header(AUTHORIZATION, format!("Bearer {}", bearer))
    }
}

/// Decode a JSON response, mapping non-success statuses to `ApiError`.
pub(crate) async fn decode_json<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    if !resp.status().is_success() {
        return Err(ApiError::from_response(resp).await);
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Check a response for success, discarding its body.
pub(crate) async fn expect_success(resp: Response) -> Result<(), ApiError> {
    if !resp.status().is_success() {
        return Err(ApiError::from_response(resp).await);
    }
    Ok(())
}
