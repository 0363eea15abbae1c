//! Session and identity state.
//!
//! Owns the signed-in flag and the current user profile. No other store
//! writes identity; the visitor store reads it through an injected handle.

use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

use crate::config::SessionCache;
use crate::supabase::{content_type_for, ApiError, AuthUser, SupabaseClient, UserMetadata};

/// Bucket holding profile images.
const AVATAR_BUCKET: &str = "avatars";

/// Flattened view of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub email: Option<String>,
    pub name: String,
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<AuthUser> for UserProfile {
    fn from(user: AuthUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.user_metadata.name.unwrap_or_default(),
            nickname: user.user_metadata.nickname,
            avatar_url: user.user_metadata.avatar_url,
        }
    }
}

struct AuthStateInner {
    is_logged_in: bool,
    user: Option<UserProfile>,
}

/// Identity container.
///
/// Clones share state. Locks are only held to read or patch the snapshot,
/// never across a remote call.
#[derive(Clone)]
pub struct AuthStore {
    client: SupabaseClient,
    cache: SessionCache,
    inner: Arc<RwLock<AuthStateInner>>,
}

impl AuthStore {
    pub fn new(client: SupabaseClient, cache: SessionCache) -> Self {
        Self {
            client,
            cache,
            inner: Arc::new(RwLock::new(AuthStateInner {
                is_logged_in: false,
                user: None,
            })),
        }
    }

    /// Whether a session is currently established.
    pub fn is_logged_in(&self) -> bool {
        self.inner.read().is_logged_in
    }

    /// Snapshot of the current user profile.
    pub fn user(&self) -> Option<UserProfile> {
        self.inner.read().user.clone()
    }

    /// Refresh identity state from the held session.
    ///
    /// Without a session this settles to logged-out without any remote call.
    /// With one, the user is fetched; a credential rejection clears the
    /// stale session and settles to logged-out rather than surfacing an
    /// error. Transport failures propagate and leave state untouched.
    pub async fn check_session(&self) -> Result<(), ApiError> {
        if self.client.session().is_none() {
            self.set_signed_out();
            return Ok(());
        }

        match self.client.fetch_user().await {
            Ok(user) => {
                self.set_signed_in(user);
                Ok(())
            }
            Err(e) if e.is_auth_error() => {
                tracing::info!("Cached session rejected by backend, signing out");
                self.client.set_session(None);
                self.cache.clear();
                self.set_signed_out();
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Sign in with email and password.
    ///
    /// On success the session is persisted and identity state updated. On
    /// failure the error is logged and returned for the caller to surface.
    pub async fn sign_in_with_email(&self, email: &str, password: &str) -> Result<(), ApiError> {
        match self.client.sign_in_with_password(email, password).await {
            Ok(session) => {
                self.set_signed_in(session.user.clone());
                self.persist_session();
                tracing::info!(email, "Signed in");
                Ok(())
            }
            Err(e) => {
                tracing::error!(email, error = %e, "Sign-in failed");
                Err(e)
            }
        }
    }

    /// Register a new account. Does not sign in or touch identity state.
    pub async fn sign_up_with_email(
        &self,
        email: &str,
        password: &str,
        name: &str,
        nickname: Option<&str>,
    ) -> Result<(), ApiError> {
        let metadata = UserMetadata {
            name: Some(name.to_string()),
            nickname: nickname.map(String::from),
            ..UserMetadata::default()
        };

        match self.client.sign_up(email, password, &metadata).await {
            Ok(_) => {
                tracing::info!(email, "Account registered");
                Ok(())
            }
            Err(e) => {
                tracing::error!(email, error = %e, "Sign-up failed");
                Err(e)
            }
        }
    }

    /// Change the profile nickname, then patch the local profile.
    pub async fn update_user_nickname(&self, new_nickname: &str) -> Result<(), ApiError> {
        let metadata = UserMetadata {
            nickname: Some(new_nickname.to_string()),
            ..UserMetadata::default()
        };

        match self.client.update_user_metadata(&metadata).await {
            Ok(_) => {
                let mut state = self.inner.write();
                if let Some(user) = state.user.as_mut() {
                    user.nickname = Some(new_nickname.to_string());
                }
                drop(state);
                self.persist_session();
                tracing::info!(nickname = new_nickname, "Nickname updated");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Nickname update failed");
                Err(e)
            }
        }
    }

    /// Upload a new profile image and point the user record at it.
    ///
    /// The previous image object is deleted first, best-effort: its absence
    /// or a failed delete does not block the upload. Returns the public URL
    /// of the new image.
    pub async fn upload_profile_image(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ApiError> {
        let session = self.client.session().ok_or(ApiError::NoSession)?;

        if let Some(old_path) = session.user.user_metadata.avatar_path.as_deref() {
            if let Err(e) = self.client.storage_remove(AVATAR_BUCKET, old_path).await {
                tracing::warn!(path = old_path, error = %e, "Failed to delete previous avatar");
            }
        }

        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_else(|| "bin".to_string());
        let object_path = format!("{}/{}.{}", session.user.id, Uuid::new_v4(), ext);

        self.client
            .storage_upload(
                AVATAR_BUCKET,
                &object_path,
                bytes,
                content_type_for(file_name),
            )
            .await?;

        let url = self.client.storage_public_url(AVATAR_BUCKET, &object_path);
        let metadata = UserMetadata {
            avatar_url: Some(url.clone()),
            avatar_path: Some(object_path),
            ..UserMetadata::default()
        };
        self.client.update_user_metadata(&metadata).await?;

        let mut state = self.inner.write();
        if let Some(user) = state.user.as_mut() {
            user.avatar_url = Some(url.clone());
        }
        drop(state);
        self.persist_session();

        tracing::info!(url = %url, "Profile image updated");
        Ok(url)
    }

    /// Sign out.
    ///
    /// The remote revocation is best-effort: a failure is logged and
    /// swallowed. Local identity state and the persisted session are always
    /// cleared.
    pub async fn logout(&self) {
        if let Err(e) = self.client.sign_out().await {
            tracing::warn!(error = %e, "Sign-out request failed, clearing local session anyway");
        }

        self.cache.clear();
        self.set_signed_out();
        tracing::info!("Signed out");
    }

    fn set_signed_in(&self, user: AuthUser) {
        let mut state = self.inner.write();
        state.is_logged_in = true;
        state.user = Some(user.into());
    }

    fn set_signed_out(&self) {
        let mut state = self.inner.write();
        state.is_logged_in = false;
        state.user = None;
    }

    fn persist_session(&self) {
        if let Some(session) = self.client.session() {
            if let Err(e) = self.cache.store(&session) {
                tracing::warn!(error = %e, "Failed to persist session");
            }
        }
    }
}
