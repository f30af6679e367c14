//! Configuration loading
//!
//! Bootstrap settings come from a TOML file. Resolution order for the file:
//! 1. Explicit path (command-line argument)
//! 2. `BSA_CONFIG` environment variable
//! 3. `<config_dir>/bsa/<module>.toml`
//! 4. Compiled defaults
//!
//! A missing file is not fatal: a warning is logged and defaults are used.
//! A file that exists but does not parse is a configuration error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{Error, FallbackThresholds, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "BSA_CONFIG";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Interface to bind the HTTP server to
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the model artifacts (default: working directory)
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,

    /// Browser origins allowed to call the API
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Largest accepted upload, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Fallback classifier thresholds
    #[serde(default)]
    pub fallback: FallbackThresholds,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
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

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            model_dir: default_model_dir(),
            cors_origins: default_cors_origins(),
            max_upload_bytes: default_max_upload_bytes(),
            logging: LoggingConfig::default(),
            fallback: FallbackThresholds::default(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_model_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Resolve and load configuration for `module_name`
    ///
    /// An explicitly named file (argument or environment) that is missing is
    /// an error; the per-user default file is optional.
    pub fn load(explicit: Option<&Path>, module_name: &str) -> Result<Self> {
        if let Some(path) = explicit {
            info!("Loading configuration from {}", path.display());
            return Self::from_file(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                info!("Loading configuration from {} ({})", path, CONFIG_ENV_VAR);
                return Self::from_file(Path::new(&path));
            }
        }

        match default_config_path(module_name) {
            Some(path) if path.exists() => {
                info!("Loading configuration from {}", path.display());
                Self::from_file(&path)
            }
            Some(path) => {
                warn!(
                    "Config file {} not found, using built-in defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            None => {
                warn!("Could not determine config directory, using built-in defaults");
                Ok(Self::default())
            }
        }
    }
}

/// `<config_dir>/bsa/<module>.toml` for the current platform
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("bsa").join(format!("{}.toml", module_name)))
}
