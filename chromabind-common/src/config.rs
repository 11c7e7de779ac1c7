//! Configuration loading
//!
//! Configuration file resolution follows this priority order:
//! 1. `CHROMABIND_CONFIG` environment variable
//! 2. `<config_dir>/chromabind/config.toml` (platform config directory)
//!
//! A missing file is not an error: a warning is logged and defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "CHROMABIND_CONFIG";

/// Attribute name the encoded native handle is stored under by default
pub const DEFAULT_HANDLE_ATTRIBUTE: &str = "_handle";

/// Option key consumed by the algorithm resolver; never usable as a default
const ALGORITHM_KEY: &str = "algorithm";

/// Untyped scalar as it appears in a TOML `[binding.defaults]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Boolean(bool),
    Integer(i64),
    Text(String),
}

/// Top-level TOML configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub logging: LoggingConfig,
    pub binding: BindingConfig,
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset (e.g. "info", "chromabind=debug")
    pub level: String,
    /// Append log output to this file instead of stderr
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_file: None,
        }
    }
}

/// `[binding]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingConfig {
    /// Reserved attribute name holding the encoded native handle.
    /// Must start with an underscore.
    pub handle_attribute: String,
    /// Attributes written to every new object before caller options
    pub defaults: BTreeMap<String, ScalarValue>,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            handle_attribute: DEFAULT_HANDLE_ATTRIBUTE.to_string(),
            defaults: BTreeMap::new(),
        }
    }
}

impl BindingConfig {
    /// Validate the reserved attribute name and drop defaults that would
    /// shadow reserved keys.
    pub fn normalize(&mut self) -> Result<()> {
        validate_reserved_name(&self.handle_attribute)?;

        for key in [ALGORITHM_KEY, self.handle_attribute.as_str()] {
            if self.defaults.remove(key).is_some() {
                warn!(key, "Ignoring reserved key in [binding.defaults]");
            }
        }

        Ok(())
    }
}

/// Reserved attribute names start with `_` and carry at least one more
/// non-whitespace character.
pub fn validate_reserved_name(name: &str) -> Result<()> {
    let Some(rest) = name.strip_prefix('_') else {
        return Err(Error::Config(format!(
            "handle_attribute must start with '_': {:?}",
            name
        )));
    };

    if rest.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(Error::Config(format!(
            "handle_attribute is not a usable attribute name: {:?}",
            name
        )));
    }

    Ok(())
}

impl TomlConfig {
    /// Load configuration from `path`, falling back to defaults if the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let mut config: TomlConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.binding.normalize()?;

        info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Load configuration from the resolved default location
    pub fn load_default() -> Result<Self> {
        match config_file_path() {
            Some(path) => Self::load(&path),
            None => {
                warn!("Could not determine config directory, using defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Resolve the configuration file path (env var, then platform config dir)
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir().map(|d| d.join("chromabind").join("config.toml"))
}
