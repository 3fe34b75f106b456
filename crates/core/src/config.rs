//! Application configuration.
//!
//! Values are layered: built-in defaults, then the optional TOML file under the
//! user's config directory, then `ROUTEBOOK__*` environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Directory under `~/.config` holding the config file.
pub const CONFIG_DIR: &str = "routebook";
/// Name of the config file inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.toml";
/// Remote directory used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "https://692321e909df4a49232469c2.mockapi.io";
/// Transport timeout applied to every remote request.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# routebook configuration

# Base URL of the remote directory serving /users and /routes.
api_base_url = "https://692321e909df4a49232469c2.mockapi.io"

# Seconds before a remote request is abandoned.
request_timeout_secs = 15

# Directory for the durable key-value mirror. Defaults to the platform data dir.
# storage_root = "/home/me/.local/share/routebook/store"

[keys]
session = "user"
routes = "routes"
favorites = "favorites"
"#;

/// Keys used inside the durable store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageKeys {
    /// Mirror of the authenticated user record.
    pub session: String,
    /// Offline copy of the last fetched route collection.
    pub routes: String,
    /// Persisted favorites collection.
    pub favorites: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            session: "user".to_string(),
            routes: "routes".to_string(),
            favorites: "favorites".to_string(),
        }
    }
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL for the remote directory.
    pub api_base_url: String,
    /// Timeout for a single remote request, in seconds.
    pub request_timeout_secs: u64,
    /// Root directory of the file-backed durable store.
    pub storage_root: PathBuf,
    /// Durable store key names.
    #[serde(default)]
    pub keys: StorageKeys,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            storage_root: default_storage_root(),
            keys: StorageKeys::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file location and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load configuration using `path` as the (optional) config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default("api_base_url", defaults.api_base_url)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs)?
            .set_default(
                "storage_root",
                defaults.storage_root.to_string_lossy().into_owned(),
            )?
            .set_default("keys.session", defaults.keys.session)?
            .set_default("keys.routes", defaults.keys.routes)?
            .set_default("keys.favorites", defaults.keys.favorites)?
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("ROUTEBOOK").separator("__"))
            .build()
            .with_context(|| format!("failed to read configuration from {}", path.display()))?;

        let config: Self = settings
            .try_deserialize()
            .context("failed to deserialize configuration")?;
        Ok(config.normalized())
    }

    /// Transport timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn normalized(mut self) -> Self {
        let trimmed = self.api_base_url.trim().trim_end_matches('/');
        self.api_base_url = trimmed.to_string();
        self
    }
}

/// Location of the config file under the user's config directory.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

/// Default directory for the file-backed durable store.
pub fn default_storage_root() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join("store")
}

/// Write the commented default config file if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    ensure_default_config_at(&config_path())
}

fn ensure_default_config_at(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG_TEMPLATE)
        .with_context(|| format!("failed to write {}", path.display()))
}
