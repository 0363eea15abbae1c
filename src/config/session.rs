//! Persisted session tokens.
//!
//! The browser client kept its auth token in local storage; the CLI keeps
//! the equivalent in a TOML file next to the config so a sign-in survives
//! across invocations. The file holds bearer tokens, so it is written with
//! owner-only permissions where the platform supports them.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::supabase::Session;

/// File-backed store for the current session.
#[derive(Debug, Clone)]
pub struct SessionCache {
    path: PathBuf,
}

impl SessionCache {
    /// Create a cache backed by the given file path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default location: `session.toml` in the application config directory.
    pub fn default_path() -> PathBuf {
        Settings::config_dir().join("session.toml")
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted session, if any.
    ///
    /// A missing file means no session. An unreadable or unparsable file is
    /// treated the same way, with a warning, so a corrupt cache never blocks
    /// startup.
    pub fn load(&self) -> Option<Session> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read session cache");
                return None;
            }
        };

        match toml::from_str(&content) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring unparsable session cache");
                None
            }
        }
    }

    /// Persist the session, replacing any previous one.
    pub fn store(&self, session: &Session) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string(session)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Remove the persisted session. Absence is not an error.
    pub fn clear(&self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove session cache");
            }
        }
    }
}
