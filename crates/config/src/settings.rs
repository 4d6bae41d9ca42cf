use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::theme::ThemePreference;

/// Error type for settings persistence.
#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    /// The settings file exists but is not valid JSON
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Settings I/O error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Settings file is invalid: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: ThemePreference,

    /// Base URL override for the backend API. Flag and env var take
    /// precedence over this.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl Settings {
    /// Load settings from a file. A missing file yields defaults; a file
    /// that exists but fails to parse is an error (silently resetting a
    /// user's settings is worse than reporting the problem).
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Write settings as pretty JSON, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        let json =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        fs::write(path, json).map_err(|e| ConfigError::Io(e.to_string()))
    }
}

/// `<config_dir>/fincore/settings.json`, or `None` when the platform has
/// no config directory.
pub fn settings_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("fincore").join("settings.json"))
}
