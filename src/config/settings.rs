use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable holding the backend project URL.
pub const URL_ENV_VAR: &str = "SUPABASE_URL";
/// Environment variable holding the anonymous API key.
pub const ANON_KEY_ENV_VAR: &str = "SUPABASE_ANON_KEY";

/// Errors that can occur when resolving settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Missing setting '{name}': set {env_var} or add it to {path}")]
    Missing {
        name: &'static str,
        env_var: &'static str,
        path: PathBuf,
    },
}

/// Wrapper for sensitive strings that prevents accidental logging.
///
/// The inner value is never exposed via Debug or Display traits.
/// Use `expose()` to access the actual value when needed for API calls.
#[derive(Clone)]
pub struct SecureString(String);

impl SecureString {
    /// Create a new secure string.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Expose the inner value.
    ///
    /// Use sparingly and only when actually sending to APIs.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecureString(••••••••)")
    }
}

impl std::fmt::Display for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "••••••••")
    }
}

/// Resolved backend settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the backend project, without a trailing slash.
    pub url: String,
    /// Anonymous API key sent with every request.
    pub anon_key: SecureString,
}

/// On-disk shape of the config file. Both keys are optional so that a file
/// may supply only the value missing from the environment.
#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    url: Option<String>,
    anon_key: Option<String>,
}

impl Settings {
    /// Returns the application config directory.
    ///
    /// Uses `~/.config/bookpost` on Unix/macOS, or equivalent on other
    /// platforms via `dirs::config_dir()`. Falls back to the current
    /// directory if the config dir is unavailable.
    pub fn config_dir() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("bookpost")
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Resolve settings from the environment, falling back to the config file.
    ///
    /// Returns an error if either value is still missing after both sources
    /// have been consulted.
    pub fn load() -> Result<Self, ConfigError> {
        let env_url = std::env::var(URL_ENV_VAR).ok().filter(|v| !v.is_empty());
        let env_key = std::env::var(ANON_KEY_ENV_VAR)
            .ok()
            .filter(|v| !v.is_empty());

        let path = Self::config_path();
        let file = if (env_url.is_none() || env_key.is_none()) && path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
                path: path.clone(),
                source: e,
            })?;
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })?
        } else {
            SettingsFile::default()
        };

        Self::resolve(env_url, env_key, file, path)
    }

    /// Build settings directly from known values. Used by tests and tools
    /// that already hold the two values.
    pub fn from_parts(url: &str, anon_key: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key: SecureString::new(anon_key.to_string()),
        }
    }

    fn resolve(
        env_url: Option<String>,
        env_key: Option<String>,
        file: SettingsFile,
        path: PathBuf,
    ) -> Result<Self, ConfigError> {
        let url = env_url
            .or(file.url)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::Missing {
                name: "url",
                env_var: URL_ENV_VAR,
                path: path.clone(),
            })?;

        let anon_key = env_key
            .or(file.anon_key)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing {
                name: "anon_key",
                env_var: ANON_KEY_ENV_VAR,
                path,
            })?;

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key: SecureString::new(anon_key),
        })
    }
}
