//! Shared fixtures for the integration suites.

#![allow(dead_code)]

pub mod mock_backend;

use bookpost::config::{SessionCache, Settings};
use bookpost::supabase::{AuthUser, Session, SupabaseClient, UserMetadata};

/// Client pointed at the mock backend.
pub fn test_client(base_url: &str) -> SupabaseClient {
    SupabaseClient::new(&Settings::from_parts(base_url, "test-anon-key"))
}

/// Session cache backed by a fresh temp directory. Keep the directory
/// alive for the duration of the test.
pub fn temp_cache() -> (tempfile::TempDir, SessionCache) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let cache = SessionCache::new(dir.path().join("session.toml"));
    (dir, cache)
}

/// A session for `reader@example.com`.
pub fn test_session() -> Session {
    Session {
        access_token: "access-123".to_string(),
        refresh_token: "refresh-456".to_string(),
        expires_in: Some(3600),
        user: test_user(),
    }
}

pub fn test_user() -> AuthUser {
    AuthUser {
        id: "user-1".to_string(),
        email: Some("reader@example.com".to_string()),
        user_metadata: UserMetadata {
            name: Some("Reader".to_string()),
            nickname: Some("bookworm".to_string()),
            avatar_url: None,
            avatar_path: None,
        },
    }
}

/// JSON body of a password sign-in response.
pub fn session_body() -> String {
    serde_json::json!({
        "access_token": "access-123",
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "refresh-456",
        "user": user_value(),
    })
    .to_string()
}

/// JSON body of a user response.
pub fn user_body() -> String {
    user_value().to_string()
}

pub fn user_value() -> serde_json::Value {
    serde_json::json!({
        "id": "user-1",
        "aud": "authenticated",
        "email": "reader@example.com",
        "user_metadata": {
            "name": "Reader",
            "nickname": "bookworm",
        },
    })
}
