//! Parser configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$ADDRESSPARSER_CONFIG` (environment variable)
//! 2. `~/.config/addressparser/config.toml` (Linux/macOS)
//!    `%APPDATA%\addressparser\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AddressError, Result};
use crate::parser::ParseOptions;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Limits applied by [`crate::parse_with`].
    pub limits: LimitsConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// Input limits for untrusted header fields. `0` disables a limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum address field length in bytes (default: 65536 = 64 KB).
    pub max_input_len: usize,
    /// Maximum group nesting depth.
    pub max_group_depth: usize,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_input_len: 64 * 1024, // 64 KB
            max_group_depth: 8,
        }
    }
}

impl LimitsConfig {
    /// Convert to the options taken by [`crate::parse_with`].
    pub fn to_options(&self) -> ParseOptions {
        ParseOptions {
            max_input_len: (self.max_input_len > 0).then_some(self.max_input_len),
            max_group_depth: (self.max_group_depth > 0).then_some(self.max_group_depth),
        }
    }
}

// ── Load ────────────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match load_config_from(&path) {
                Ok(cfg) => {
                    tracing::info!(path = %path.display(), "Loaded config");
                    return cfg;
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to load config, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Load configuration from a specific file. Missing sections use defaults.
pub fn load_config_from(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path).map_err(|e| AddressError::io(path, e))?;
    toml::from_str::<Config>(&contents).map_err(|e| AddressError::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("ADDRESSPARSER_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("addressparser").join("config.toml"))
}
