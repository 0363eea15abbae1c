//! Application settings and persisted session handling.
//!
//! The backend is addressed by two values: the project URL and the anonymous
//! API key. Both are resolved from the environment first, falling back to a
//! TOML config file under the platform config directory.

mod session;
mod settings;

pub use session::SessionCache;
pub use settings::{ConfigError, SecureString, Settings};
