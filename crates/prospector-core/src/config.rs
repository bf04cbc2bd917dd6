//! Configuration resolution for Prospector.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (`$XDG_CONFIG_HOME/prospector/settings.json`)
//! 3. Environment variables (`PROSPECTOR_*`, highest priority)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Complete Prospector configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub access: AccessConfig,
    #[serde(default)]
    pub licensing: LicensingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Access-gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AccessConfig {
    /// The designated super-admin email. Sessions with this email bypass
    /// every license check except authentication itself. Empty disables
    /// the bypass.
    pub super_admin_email: String,
}

/// License governance defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicensingConfig {
    /// Length of a quick trial grant, in days.
    pub trial_days: i64,
}

impl Default for LicensingConfig {
    fn default() -> Self {
        Self { trial_days: 15 }
    }
}

/// Storage and logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file. `None` uses the per-user default.
    pub database_path: Option<PathBuf>,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Emit JSON log lines instead of the human-readable format.
    pub log_json: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

/// Load configuration with hierarchical resolution.
pub fn load_config() -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_config_path() {
        if global_path.exists() {
            let global = load_config_file(&global_path)?;
            merge_config(&mut config, global);
        }
    }

    apply_env_overrides(&mut config);

    Ok(config)
}

/// Get the global config file path.
///
/// `PROSPECTOR_CONFIG` overrides; otherwise `$XDG_CONFIG_HOME` (or
/// `$HOME/.config`) is used.
pub fn global_config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("PROSPECTOR_CONFIG") {
        return Some(PathBuf::from(path));
    }
    config_dir().map(|p| p.join("settings.json"))
}

/// Get the default database path.
pub fn default_database_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("licensing.db"))
}

fn config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config"))
        })
        .map(|p| p.join("prospector"))
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn merge_config(base: &mut Config, overlay: Config) {
    if !overlay.access.super_admin_email.is_empty() {
        base.access.super_admin_email = overlay.access.super_admin_email;
    }
    base.licensing = overlay.licensing;
    if overlay.storage.database_path.is_some() {
        base.storage.database_path = overlay.storage.database_path;
    }
    base.storage.log_level = overlay.storage.log_level;
    base.storage.log_json = overlay.storage.log_json;
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(val) = std::env::var("PROSPECTOR_SUPER_ADMIN_EMAIL") {
        config.access.super_admin_email = val;
    }
    if let Ok(val) = std::env::var("PROSPECTOR_TRIAL_DAYS") {
        if let Ok(n) = val.parse() {
            config.licensing.trial_days = n;
        }
    }
    if let Ok(val) = std::env::var("PROSPECTOR_DATABASE_PATH") {
        config.storage.database_path = Some(PathBuf::from(val));
    }
    if let Ok(val) = std::env::var("PROSPECTOR_LOG_LEVEL") {
        config.storage.log_level = val;
    }
}
