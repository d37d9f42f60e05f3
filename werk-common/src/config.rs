//! Configuration loading and root folder resolution
//!
//! Settings come from four tiers, highest priority first:
//! 1. Command-line arguments
//! 2. Environment variables (`WERK_ROOT_FOLDER`, `WERK_ROOT`, `WERK_BIND`, `WERK_CATALOG_URL`)
//! 3. TOML config file (`~/.config/werk/<module>.toml`)
//! 4. Compiled defaults
//!
//! A missing or unreadable TOML file is never fatal: a warning is logged and
//! the remaining tiers apply.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Remote catalog used when nothing else is configured
pub const DEFAULT_CATALOG_BASE_URL: &str = "http://www.nokeynoshade.party/api";

/// HTTP listen address used when nothing else is configured
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5000";

/// SQLite file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "werk.db";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Folder holding the database
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// HTTP listen address, e.g. "127.0.0.1:5000"
    #[serde(default)]
    pub bind_address: Option<String>,

    /// Base URL of the remote catalog API (no trailing slash)
    #[serde(default)]
    pub catalog_base_url: Option<String>,

    /// Per-request timeout for catalog calls
    #[serde(default)]
    pub catalog_timeout_secs: Option<u64>,

    /// Lifetime of a login session
    #[serde(default)]
    pub session_ttl_hours: Option<i64>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Built-in defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
    pub bind_address: String,
    pub catalog_base_url: String,
    pub catalog_timeout_secs: u64,
    pub session_ttl_hours: i64,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let root_folder = dirs::data_local_dir()
            .map(|d| d.join("werk"))
            .unwrap_or_else(|| PathBuf::from("./werk_data"));

        Self {
            root_folder,
            log_level: default_log_level(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            catalog_base_url: DEFAULT_CATALOG_BASE_URL.to_string(),
            catalog_timeout_secs: 30,
            session_ttl_hours: 24 * 14,
        }
    }
}

/// Location of a module's TOML file, `None` if the platform has no config dir
pub fn config_file_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("werk").join(format!("{}.toml", module_name)))
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML {} failed: {}", path.display(), e)))
}

/// Where the effective TOML settings came from
///
/// Returned instead of logged so the file can be read before tracing starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Loaded(PathBuf),
    Missing(PathBuf),
    /// File exists but could not be read or parsed
    Ignored { path: PathBuf, reason: String },
    /// Platform has no config directory and no path was given
    NoConfigDir,
}

impl ConfigSource {
    /// Missing file is logged at info, a broken file at warn
    pub fn log(&self) {
        match self {
            ConfigSource::Loaded(path) => info!("Loaded config file {}", path.display()),
            ConfigSource::Missing(path) => {
                info!("No config file at {}, using defaults", path.display())
            }
            ConfigSource::Ignored { path, reason } => {
                warn!("Ignoring config file {}: {}", path.display(), reason)
            }
            ConfigSource::NoConfigDir => warn!("No config directory on this platform, using defaults"),
        }
    }
}

/// Read a TOML config file, falling back to an empty config
pub fn load_toml_config_or_default(path: Option<&Path>) -> (TomlConfig, ConfigSource) {
    let Some(path) = path else {
        return (TomlConfig::default(), ConfigSource::NoConfigDir);
    };
    if !path.exists() {
        return (TomlConfig::default(), ConfigSource::Missing(path.to_path_buf()));
    }
    match load_toml_config(path) {
        Ok(config) => (config, ConfigSource::Loaded(path.to_path_buf())),
        Err(e) => (
            TomlConfig::default(),
            ConfigSource::Ignored {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        ),
    }
}

/// Root folder resolution: CLI → ENV → TOML → compiled default
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
        }
    }

    /// Highest-priority override from the command line
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        // WERK_ROOT_FOLDER wins over the shorter alias
        for var in ["WERK_ROOT_FOLDER", "WERK_ROOT"] {
            if let Ok(path) = std::env::var(var) {
                if !path.trim().is_empty() {
                    return PathBuf::from(path);
                }
            }
        }

        if let Some(path) = config_file_path(&self.module_name) {
            if path.exists() {
                match load_toml_config(&path) {
                    Ok(TomlConfig {
                        root_folder: Some(root),
                        ..
                    }) => return root,
                    Ok(_) => {}
                    Err(e) => warn!("Config file {} unreadable: {}", path.display(), e),
                }
            }
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Creates the root folder and locates the database inside it
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder (and parents) if missing; idempotent
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }
}

/// Values the command line (or its env fallbacks) may override
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub root_folder: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub catalog_base_url: Option<String>,
    pub log_level: Option<String>,
}

/// Fully resolved service settings
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub root_folder: PathBuf,
    pub bind_address: String,
    pub catalog_base_url: String,
    pub catalog_timeout: Duration,
    pub session_ttl_hours: i64,
    pub log_level: String,
}

impl ServiceSettings {
    /// Merge overrides, TOML values and compiled defaults
    pub fn resolve(module_name: &str, overrides: SettingsOverrides, toml: &TomlConfig) -> Self {
        let defaults = CompiledDefaults::for_current_platform();

        let root_folder = match (&overrides.root_folder, &toml.root_folder) {
            (Some(cli), _) => cli.clone(),
            (None, toml_root) => {
                let resolved = RootFolderResolver::new(module_name).resolve();
                // The resolver re-reads the default TOML location; an explicit --config wins
                match toml_root {
                    Some(root) if resolved == defaults.root_folder => root.clone(),
                    _ => resolved,
                }
            }
        };

        let catalog_base_url = overrides
            .catalog_base_url
            .or_else(|| toml.catalog_base_url.clone())
            .unwrap_or(defaults.catalog_base_url)
            .trim_end_matches('/')
            .to_string();

        Self {
            root_folder,
            bind_address: overrides
                .bind_address
                .or_else(|| toml.bind_address.clone())
                .unwrap_or(defaults.bind_address),
            catalog_base_url,
            catalog_timeout: Duration::from_secs(
                toml.catalog_timeout_secs
                    .unwrap_or(defaults.catalog_timeout_secs),
            ),
            session_ttl_hours: toml
                .session_ttl_hours
                .filter(|h| *h > 0)
                .unwrap_or(defaults.session_ttl_hours),
            log_level: overrides
                .log_level
                .unwrap_or_else(|| toml.logging.level.clone()),
        }
    }
}
