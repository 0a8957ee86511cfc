//! User configuration at `~/.repodeck/config.yaml`.
//!
//! A missing file means [`Config::default`]. Unknown keys are ignored so older
//! binaries keep reading newer files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::store::{home, root_at};

pub const CONFIG_FILE: &str = "config.yaml";
pub const DEFAULT_BIND: &str = "127.0.0.1:7417";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Offer the "Manage repos..." choice in the selector and allow `manage`.
    pub manage_repos_enabled: bool,
    /// Base URL of a running daemon, e.g. `http://127.0.0.1:7417`.
    pub server: Option<String>,
    /// Listen address of `repodeck daemon start`.
    pub bind: String,
    /// HTTP client timeout for validate / update requests.
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manage_repos_enabled: true,
            server: None,
            bind: DEFAULT_BIND.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// `<home>/.repodeck/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    root_at(home).join(CONFIG_FILE)
}

pub fn load_at(home: &Path) -> Result<Config, RegistryError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(&path)?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(&contents).map_err(|e| RegistryError::Parse { path, source: e })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, RegistryError> {
    load_at(&home()?)
}
