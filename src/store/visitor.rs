//! Daily visit recording.
//!
//! Records at most one visit per authenticated user per UTC calendar day.
//! The only inter-store dependency: identity is read from an injected
//! `AuthStore` handle.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::store::AuthStore;
use crate::supabase::{ApiError, SupabaseClient};

const VISITOR_TABLE: &str = "visitor";

/// One visit event. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub name: String,
    #[serde(default)]
    pub nickname: String,
    pub email: String,
    pub visited_at: DateTime<Utc>,
}

struct VisitorStateInner {
    loading: bool,
    last_error: Option<String>,
}

/// Visit container.
#[derive(Clone)]
pub struct VisitorStore {
    client: SupabaseClient,
    auth: AuthStore,
    inner: Arc<RwLock<VisitorStateInner>>,
}

impl VisitorStore {
    pub fn new(client: SupabaseClient, auth: AuthStore) -> Self {
        Self {
            client,
            auth,
            inner: Arc::new(RwLock::new(VisitorStateInner {
                loading: false,
                last_error: None,
            })),
        }
    }

    /// Whether an operation is in flight.
    pub fn is_loading(&self) -> bool {
        self.inner.read().loading
    }

    /// Message of the last failed operation, if the most recent one failed.
    pub fn last_error(&self) -> Option<String> {
        self.inner.read().last_error.clone()
    }

    /// Record today's visit for the signed-in user.
    ///
    /// Anonymous users produce no remote call and no visit. If a visit
    /// already exists on or after the start of the current UTC day for this
    /// email, nothing is inserted. Returns the recorded visit, or `None`
    /// when nothing was recorded.
    ///
    /// The check and the insert are two separate requests: concurrent calls
    /// can both pass the check and record duplicate visits. Known race,
    /// deliberately left as-is.
    pub async fn save_visitor(&self) -> Result<Option<Visit>, ApiError> {
        let Some(profile) = self.auth.user() else {
            return Ok(None);
        };
        let Some(email) = profile.email.clone() else {
            return Ok(None);
        };

        self.begin();

        let today = Utc::now().format("%Y-%m-%d").to_string();
        let existing: Vec<Visit> = match self
            .client
            .from(VISITOR_TABLE)
            .select("*")
            .eq("email", &email)
            .gte("visited_at", &today)
            .limit(1)
            .fetch()
            .await
        {
            Ok(rows) => rows,
            Err(e) => return Err(self.fail(e)),
        };

        if !existing.is_empty() {
            tracing::debug!(email = %email, "Visit already recorded today");
            self.finish();
            return Ok(None);
        }

        let visit = Visit {
            name: profile.name,
            nickname: profile.nickname.unwrap_or_default(),
            email,
            visited_at: Utc::now(),
        };

        match self.client.from(VISITOR_TABLE).insert_only(&visit).await {
            Ok(()) => {
                tracing::info!(email = %visit.email, "Visit recorded");
                self.finish();
                Ok(Some(visit))
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn begin(&self) {
        let mut state = self.inner.write();
        state.loading = true;
        state.last_error = None;
    }

    fn finish(&self) {
        self.inner.write().loading = false;
    }

    fn fail(&self, error: ApiError) -> ApiError {
        tracing::error!(error = %error, "Error recording visit");
        let mut state = self.inner.write();
        state.last_error = Some(error.to_string());
        state.loading = false;
        error
    }
}
