//! Server configuration
//!
//! Loaded from `~/.animectl/config.toml` (or an explicit path). Every
//! field is optional; `DATABASE_URL` in the environment overrides the
//! file. Example:
//!
//! ```toml
//! store = "postgres"
//!
//! [server]
//! bind = "127.0.0.1:8080"
//! cors_permissive = false
//! request_timeout_secs = 30
//!
//! [database]
//! url = "postgres://localhost/animectl"
//! max_connections = 5
//! acquire_timeout_secs = 5
//! run_migrations = true
//!
//! [security]
//! enabled = true
//! realm = "animectl"
//!
//! [[security.users]]
//! username = "admin"
//! password = "{noop}1234"
//! roles = ["ADMIN", "USER"]
//! ```

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::db::pool::{DEFAULT_ACQUIRE_TIMEOUT_SECS, DEFAULT_MAX_CONNECTIONS};
use crate::models::{Role, User};

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Which store backs the repositories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Postgres,
    /// Process-local store, lost on shutdown
    Memory,
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreKind,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:8080)
    #[serde(rename = "bind")]
    pub bind_addr: SocketAddr,

    /// Allow permissive CORS (default: false = localhost only)
    pub cors_permissive: bool,

    /// Per-request timeout
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            cors_permissive: false,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    /// Seconds to wait for a free connection
    pub acquire_timeout_secs: u64,
    /// Create missing tables at startup
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
            run_migrations: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// When false every route is public (no authentication, no role checks)
    pub enabled: bool,
    pub realm: String,
    /// Accounts created at startup if their username is free
    pub users: Vec<SeedUser>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            realm: "animectl".to_owned(),
            users: Vec::new(),
        }
    }
}

/// Account declared in the config file.
///
/// `password` must already be encoded (`{sha256}...` or `{noop}...`).
#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    #[serde(default)]
    pub name: Option<String>,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl From<SeedUser> for User {
    fn from(seed: SeedUser) -> Self {
        User {
            id: None,
            name: seed.name.unwrap_or_else(|| seed.username.clone()),
            username: seed.username,
            password: seed.password,
            roles: seed.roles,
        }
    }
}

impl AppConfig {
    /// Default config file path: ~/.animectl/config.toml
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".animectl")
            .join("config.toml")
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the default path is read
    /// if present and built-in defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Self::default_path();
                if default.exists() {
                    Self::from_file(&default)?
                } else {
                    tracing::debug!(path = %default.display(), "no config file, using defaults");
                    Self::default()
                }
            }
        };

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database.url = Some(url);
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}
