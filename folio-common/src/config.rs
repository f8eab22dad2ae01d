//! Configuration loading and resolution
//!
//! Every setting follows the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing TOML file is never fatal: a warning is logged and defaults apply.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the TOML config file
pub const ENV_CONFIG_PATH: &str = "FOLIO_CONFIG";
/// Environment variable for the admin bearer token
pub const ENV_ADMIN_TOKEN: &str = "FOLIO_ADMIN_TOKEN";
/// Environment variable for the keep-alive bearer secret
pub const ENV_CRON_SECRET: &str = "FOLIO_CRON_SECRET";
/// Environment variable for the object storage base URL
pub const ENV_STORAGE_URL: &str = "FOLIO_STORAGE_URL";
/// Environment variable for the object storage service key
pub const ENV_STORAGE_KEY: &str = "FOLIO_STORAGE_KEY";
/// Environment variable for the object storage bucket
pub const ENV_STORAGE_BUCKET: &str = "FOLIO_STORAGE_BUCKET";

/// Contents of `config.toml`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub database_path: Option<PathBuf>,
    pub port: Option<u16>,
    pub admin_token: Option<String>,
    pub cron_secret: Option<String>,
    pub lookup_concurrency: Option<usize>,
    #[serde(default)]
    pub storage: TomlStorageConfig,
}

/// `[storage]` table of `config.toml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlStorageConfig {
    pub base_url: Option<String>,
    pub service_key: Option<String>,
    pub bucket: Option<String>,
}

/// Compiled defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub database_path: PathBuf,
    pub port: u16,
    pub bucket: String,
    pub lookup_concurrency: usize,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            database_path: default_data_folder().join("folio.db"),
            port: 5780,
            bucket: "myart".to_string(),
            lookup_concurrency: 8,
        }
    }
}

/// Values supplied on the command line (clap already merges their env vars)
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub database_path: Option<PathBuf>,
    pub port: Option<u16>,
}

/// Object storage connection settings
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Base URL of the storage service; `None` leaves storage unconfigured
    pub base_url: Option<String>,
    pub service_key: Option<String>,
    pub bucket: String,
}

/// Fully resolved gallery configuration
#[derive(Debug, Clone)]
pub struct GalleryConfig {
    pub database_path: PathBuf,
    pub port: u16,
    /// Bearer token for the admin write path; empty disables the path
    pub admin_token: String,
    /// Bearer token for the keep-alive endpoint; empty disables it
    pub cron_secret: String,
    pub lookup_concurrency: usize,
    pub storage: StorageConfig,
}

impl GalleryConfig {
    /// Resolve every setting by priority: CLI > env > TOML > compiled default
    pub fn resolve(cli: &CliOverrides, toml: &TomlConfig) -> Self {
        let defaults = CompiledDefaults::for_current_platform();

        let database_path = cli
            .database_path
            .clone()
            .or_else(|| toml.database_path.clone())
            .unwrap_or(defaults.database_path);

        let port = cli.port.or(toml.port).unwrap_or(defaults.port);

        let lookup_concurrency = toml
            .lookup_concurrency
            .filter(|n| *n > 0)
            .unwrap_or(defaults.lookup_concurrency);

        let storage = StorageConfig {
            base_url: env_or(ENV_STORAGE_URL, toml.storage.base_url.clone())
                .map(|url| url.trim_end_matches('/').to_string()),
            service_key: env_or(ENV_STORAGE_KEY, toml.storage.service_key.clone()),
            bucket: env_or(ENV_STORAGE_BUCKET, toml.storage.bucket.clone())
                .unwrap_or(defaults.bucket),
        };

        Self {
            database_path,
            port,
            admin_token: env_or(ENV_ADMIN_TOKEN, toml.admin_token.clone()).unwrap_or_default(),
            cron_secret: env_or(ENV_CRON_SECRET, toml.cron_secret.clone()).unwrap_or_default(),
            lookup_concurrency,
            storage,
        }
    }
}

/// Non-empty environment variable, else the TOML value
fn env_or(var: &str, toml_value: Option<String>) -> Option<String> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or(toml_value)
        .filter(|v| !v.trim().is_empty())
}

/// Load `config.toml`
///
/// `explicit` is the path given on the command line or via `FOLIO_CONFIG`;
/// otherwise the per-user config location is tried. A missing file yields
/// defaults with a warning. A file that exists but does not parse is an error.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) => path,
            None => {
                warn!("Could not determine config directory, using defaults");
                return Ok(TomlConfig::default());
            }
        },
    };

    if !path.exists() {
        warn!("Config file not found: {} (using defaults)", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&path)?;
    let config = toml::from_str::<TomlConfig>(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

    info!("Loaded config file: {}", path.display());
    Ok(config)
}

/// Per-user config file location (`~/.config/folio/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("folio").join("config.toml"))
}

/// Get OS-dependent default data folder
fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("folio"))
        .unwrap_or_else(|| PathBuf::from("./folio_data"))
}
