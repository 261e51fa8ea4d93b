use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error as ThisError;
use tracing_subscriber::EnvFilter;

use crate::editor::RollbackPolicy;

/// A configuration that could not be loaded or makes no sense to run with.
#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid configuration value `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::Load(Box::new(e))
    }
}

fn invalid(key: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.into(),
    }
}

/// Process configuration.
///
/// Precedence (lowest to highest): built-in defaults, `config.toml`
/// (or the file named by `CMS_CONFIG`), then `CMS_*` environment variables
/// with `__` separating nested keys, e.g. `CMS_BASIC__ADMIN_KEY`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub database: DatabaseConfig,
    pub uploads: UploadsConfig,
    pub editor: EditorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub loglevel: String,
    /// Key required on every `/api/admin` request.
    pub admin_key: String,
    /// Opaque path segment the admin login page is published under.
    /// Link discovery only; never treated as authentication.
    pub admin_path: String,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
            admin_key: "change-me".to_string(),
            admin_path: "09806446909".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://data/practice.db".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadsConfig {
    pub dir: PathBuf,
    pub max_image_bytes: usize,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data/uploads"),
            max_image_bytes: 5 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub rollback: RollbackPolicy,
}

impl Config {
    /// Load and check the configuration. Any value that fails to parse or
    /// to validate is an error; nothing falls back to its default.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("CMS_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
        let cfg: Config = Self::figment(&path).extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let basic = &self.basic;
        basic
            .listen_addr
            .parse::<SocketAddr>()
            .map_err(|e| invalid("basic.listen_addr", e.to_string()))?;
        EnvFilter::try_new(&basic.loglevel).map_err(|e| invalid("basic.loglevel", e.to_string()))?;
        if basic.admin_key.trim().is_empty() {
            return Err(invalid("basic.admin_key", "must not be empty"));
        }
        let path = basic.admin_path.as_str();
        if path.is_empty()
            || !path
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(invalid(
                "basic.admin_path",
                "must be a single path segment of letters, digits, `-` or `_`",
            ));
        }
        if matches!(path, "api" | "uploads") {
            return Err(invalid("basic.admin_path", format!("`{path}` is reserved")));
        }
        if self.database.url.trim().is_empty() {
            return Err(invalid("database.url", "must not be empty"));
        }
        if self.database.max_connections == 0 {
            return Err(invalid("database.max_connections", "must be at least 1"));
        }
        if self.uploads.max_image_bytes == 0 {
            return Err(invalid("uploads.max_image_bytes", "must be at least 1"));
        }
        Ok(())
    }

    pub fn figment(path: &str) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("CMS_").ignore(&["config"]).split("__"))
    }
}
