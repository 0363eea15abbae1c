//! Authentication surface.
//!
//! Wraps the backend's auth endpoints: sign-up, password sign-in, session
//! retrieval, user-metadata update and sign-out. Successful sign-in stores
//! the returned session on the client so subsequent requests carry its
//! access token.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{decode_json, expect_success, ApiError, SupabaseClient};

/// Free-form profile data attached to a user account.
///
/// Only fields that are `Some` are sent on update; the backend merges them
/// into the existing metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Storage object path of the current avatar, kept so a later upload
    /// can delete it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_path: Option<String>,
}

/// A user account as reported by the auth API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// An authenticated session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

impl SupabaseClient {
    /// Register a new account with profile metadata.
    ///
    /// Deployments with auto-confirm enabled answer with a full session;
    /// others answer with the bare user. Either way the user is returned and
    /// no session is stored — signing up does not sign in.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> Result<AuthUser, ApiError> {
        let body = json!({
            "email": email,
            "password": password,
            "data": metadata,
        });

        let resp = self
            .request(Method::POST, "/auth/v1/signup")
            .json(&body)
            .send()
            .await?;

        let value: serde_json::Value = decode_json(resp).await?;
        let user_value = value.get("user").cloned().unwrap_or(value);
        serde_json::from_value(user_value).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Exchange email/password credentials for a session.
    ///
    /// The session is stored on the client before it is returned.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ApiError> {
        let body = json!({
            "email": email,
            "password": password,
        });

        let resp = self
            .request(Method::POST, "/auth/v1/token?grant_type=password")
            .json(&body)
            .send()
            .await?;

        let session: Session = decode_json(resp).await?;
        self.set_session(Some(session.clone()));
        Ok(session)
    }

    /// Fetch the user behind the current session.
    pub async fn fetch_user(&self) -> Result<AuthUser, ApiError> {
        if self.session().is_none() {
            return Err(ApiError::NoSession);
        }

        let resp = self.request(Method::GET, "/auth/v1/user").send().await?;
        decode_json(resp).await
    }

    /// Merge the given metadata into the current user's profile.
    ///
    /// The session held by the client is refreshed with the updated user.
    pub async fn update_user_metadata(
        &self,
        metadata: &UserMetadata,
    ) -> Result<AuthUser, ApiError> {
        if self.session().is_none() {
            return Err(ApiError::NoSession);
        }

        let body = json!({ "data": metadata });
        let resp = self
            .request(Method::PUT, "/auth/v1/user")
            .json(&body)
            .send()
            .await?;

        let user: AuthUser = decode_json(resp).await?;

        let mut slot = self.session.write();
        if let Some(session) = slot.as_mut() {
            session.user = user.clone();
        }
        drop(slot);

        Ok(user)
    }

    /// Revoke the current session on the backend.
    ///
    /// The local session is cleared whether or not the request succeeds, so
    /// a failed revocation still signs the client out.
    pub async fn sign_out(&self) -> Result<(), ApiError> {
        if self.session().is_none() {
            return Ok(());
        }

        let result = self.request(Method::POST, "/auth/v1/logout").send().await;
        self.set_session(None);

        match result {
            Ok(resp) => expect_success(resp).await,
            Err(e) => Err(e.into()),
        }
    }
}
