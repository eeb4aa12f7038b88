//! # noshm-config
//!
//! Configuration management for the noshm preload layer.
//!
//! Loads configuration from:
//! 1. `~/.noshm/config.toml` (global), or the file named by `NOSHM_CONFIG`
//! 2. Environment variables (highest priority)
//!
//! The layer is loaded into third-party processes, so [`config()`] never
//! fails: a broken file falls back to defaults and the error is kept for
//! [`load_error()`] to report once logging is up.

pub mod logging;

use once_cell::sync::{Lazy, OnceCell};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "NOSHM_CONFIG";
/// Environment override for [`LibraryConfig::real`].
pub const REAL_LIBRARY_ENV: &str = "NOSHM_REAL_LIBRARY";
/// Environment override for [`LoggingConfig::level`].
pub const LOG_LEVEL_ENV: &str = "NOSHM_LOG_LEVEL";
/// Environment override for [`LoggingConfig::file`].
pub const LOG_FILE_ENV: &str = "NOSHM_LOG_FILE";

/// Library searched for the authentic Xlib entry points.
///
/// libXext depends on libX11, so `dlsym` on its handle finds both the core
/// and the XShm symbols.
pub const DEFAULT_REAL_LIBRARY: &str = "libXext.so.6";

/// Global config instance
static CONFIG: Lazy<Config> = Lazy::new(|| match Config::load() {
    Ok(config) => config,
    Err(e) => {
        let _ = LOAD_ERROR.set(e.to_string());
        Config::from_env()
    }
});

static LOAD_ERROR: OnceCell<String> = OnceCell::new();

/// Get the process-wide config, loading it on first use.
///
/// Blocks while another thread is loading it.
pub fn config() -> &'static Config {
    &CONFIG
}

/// The process-wide config if loading has finished. Never blocks.
pub fn try_config() -> Option<&'static Config> {
    Lazy::get(&CONFIG)
}

/// Why the process-wide config fell back to defaults, if it did.
pub fn load_error() -> Option<&'static str> {
    LOAD_ERROR.get().map(String::as_str)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("log file path has no file name: {0}")]
    InvalidLogFile(PathBuf),
    #[error("cannot open log file: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub library: LibraryConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load config from standard locations
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => {
                debug!("Loading config from {:?}", path);
                Self::load_from(&path)?
            }
            _ => Config::default(),
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Defaults plus environment overrides. Touches no files.
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Parse a single config file, without environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// `NOSHM_CONFIG` if set, else the global path.
    pub fn config_path() -> Option<PathBuf> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
            _ => Self::global_config_path(),
        }
    }

    /// Global config path: ~/.noshm/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".noshm/config.toml"))
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(library) = get(REAL_LIBRARY_ENV) {
            self.library.real = library;
        }
        if let Some(level) = get(LOG_LEVEL_ENV) {
            self.logging.level = level;
        }
        if let Some(file) = get(LOG_FILE_ENV) {
            self.logging.file = Some(PathBuf::from(file));
        }
    }

    /// Generate default config TOML string
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Config::default()).unwrap_or_default()
    }
}

/// Where the authentic implementations live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Library name or path handed to `dlopen`
    pub real: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            real: DEFAULT_REAL_LIBRARY.to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive: error, warn, info, debug, trace or off
    pub level: String,
    /// Log file (None = stderr)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
        }
    }
}
