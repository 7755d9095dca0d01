use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

pub const USERNAME_VAR: &str = "OBJFS_USERNAME";
pub const PASSWORD_VAR: &str = "OBJFS_PASSWORD";

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheStrategy {
    Ttl,
    Lru,
    None,
}

/// How much of the remote view a mutation invalidates.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InvalidationScope {
    /// After the first mutation every lookup bypasses the remote cache.
    Global,
    /// Only the mutated path, its parent and (for removals) its subtree are
    /// refetched, once each.
    Path,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub server_url: String,
    pub cache_strategy: CacheStrategy,
    pub cache_ttl_seconds: u64,
    pub cache_lru_capacity: usize,
    pub kernel_attr_timeout_seconds: u64,
    pub request_timeout_seconds: u64,
    pub invalidation: InvalidationScope,
    /// Show created-but-unwritten files and fresh folders in directory listings.
    pub list_pending_entries: bool,
    pub read_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8080".to_string(),
            cache_strategy: CacheStrategy::Ttl,
            cache_ttl_seconds: 60,
            cache_lru_capacity: 1000,
            kernel_attr_timeout_seconds: 1,
            request_timeout_seconds: 30,
            invalidation: InvalidationScope::Global,
            list_pending_entries: true,
            read_only: false,
        }
    }
}

/// Loads `path`, falling back to defaults when the file is missing or invalid.
pub fn load_config(path: &Path) -> Config {
    if !path.exists() {
        info!(path = %path.display(), "config file not found, using defaults");
        return Config::default();
    }

    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read config file, using defaults");
            return Config::default();
        }
    };

    match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot parse config file, using defaults");
            Config::default()
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),
}

/// Account credentials sent with every remote request.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        let var = |name: &'static str| env::var(name).map_err(|_| ConfigError::MissingVar(name));
        Ok(Self {
            username: var(USERNAME_VAR)?,
            password: var(PASSWORD_VAR)?,
        })
    }
}
