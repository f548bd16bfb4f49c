//! Configuration loading and data folder resolution
//!
//! Data folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. `VIGIE_DATA_FOLDER` environment variable
//! 3. `data_folder` key of the TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable TOML file never aborts startup: the resolver reports
//! it as a [`ConfigSource`] and the next tier applies.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the data folder
pub const DATA_FOLDER_ENV: &str = "VIGIE_DATA_FOLDER";

/// Database file name inside the data folder
pub const DATABASE_FILE: &str = "vigie.db";

/// Built-in defaults for the current platform
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledDefaults {
    pub data_folder: PathBuf,
    pub log_level: String,
    pub admin_host: String,
    pub admin_port: u16,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let data_folder = if cfg!(target_os = "linux") {
            // ~/.local/share/vigie (or /var/lib/vigie for system-wide)
            dirs::data_local_dir()
                .map(|d| d.join("vigie"))
                .unwrap_or_else(|| PathBuf::from("/var/lib/vigie"))
        } else if cfg!(target_os = "macos") {
            // ~/Library/Application Support/vigie
            dirs::data_dir()
                .map(|d| d.join("vigie"))
                .unwrap_or_else(|| PathBuf::from("/Library/Application Support/vigie"))
        } else if cfg!(target_os = "windows") {
            // %LOCALAPPDATA%\vigie
            dirs::data_local_dir()
                .map(|d| d.join("vigie"))
                .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\vigie"))
        } else {
            PathBuf::from("./vigie_data")
        };

        Self {
            data_folder,
            log_level: "info".to_string(),
            admin_host: "127.0.0.1".to_string(),
            admin_port: 5780,
        }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
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

/// `[admin]` section
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Contents of `config.toml`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub data_folder: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Locate the default config file for the platform
///
/// Linux checks `~/.config/vigie/config.toml`, then `/etc/vigie/config.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("vigie").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/vigie/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Where the loaded [`TomlConfig`] came from
#[derive(Debug)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// No config file found
    Defaults,
    /// A file was found but could not be read or parsed
    Invalid(Error),
}

/// Resolves the data folder through the four configuration tiers
pub struct DataFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    config_file: Option<PathBuf>,
}

impl DataFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
            config_file: None,
        }
    }

    /// Command-line override (tier 1)
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    /// Explicit config file instead of the platform lookup (tier 3)
    pub fn with_config_file(mut self, path: Option<PathBuf>) -> Self {
        self.config_file = path;
        self
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Load the TOML config, or defaults when absent or invalid
    ///
    /// Nothing is logged here; callers load the config before the tracing
    /// subscriber exists and report the [`ConfigSource`] once it does.
    pub fn load_config(&self) -> (TomlConfig, ConfigSource) {
        let path = match self.config_file.clone().or_else(find_config_file) {
            Some(path) => path,
            None => return (TomlConfig::default(), ConfigSource::Defaults),
        };

        match load_toml_config(&path) {
            Ok(config) => (config, ConfigSource::File(path)),
            Err(e) => (TomlConfig::default(), ConfigSource::Invalid(e)),
        }
    }

    /// Resolve against an already-loaded config
    pub fn resolve_with(&self, config: &TomlConfig) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        if let Ok(path) = std::env::var(DATA_FOLDER_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &config.data_folder {
            return path.clone();
        }

        CompiledDefaults::for_current_platform().data_folder
    }
}

/// Prepares the data folder on disk
pub struct DataFolderInitializer {
    data_folder: PathBuf,
}

impl DataFolderInitializer {
    pub fn new(data_folder: PathBuf) -> Self {
        Self { data_folder }
    }

    /// Create the folder (and parents) if missing; idempotent
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_folder)?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_folder.join(DATABASE_FILE)
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }
}
