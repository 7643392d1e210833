//! CLI configuration
//!
//! Loaded from `~/.config/radix-manifest/config.json` when present. Every
//! field is optional in the file; command-line flags override the result.

use crate::{Error, Result, MAX_LEVEL, PATH_SEPARATOR};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = "radix-manifest";
const CONFIG_FILE: &str = "config.json";

/// Settings shared by all commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the chunk store file
    pub store: PathBuf,
    /// Path separator, a single ASCII character
    pub separator: char,
    /// Level bound used by `ls` when none is given
    pub default_level: u32,
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store: PathBuf::from("manifest.store"),
            separator: PATH_SEPARATOR as char,
            default_level: 1,
            log_filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// Default config file location
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not find config directory".into()))?;
        Ok(dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load from the default location, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Ok(path) => Self::load_from(&path),
            Err(_) => Ok(Config::default()),
        }
    }

    /// Load from `path`, falling back to defaults when the file does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Write to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config dir: {}", e)))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;
        Ok(())
    }

    /// The separator as a byte
    pub fn separator_byte(&self) -> Result<u8> {
        if !self.separator.is_ascii() {
            return Err(Error::Config(format!(
                "Separator must be a single ASCII character, got '{}'",
                self.separator
            )));
        }
        Ok(self.separator as u8)
    }

    fn validate(&self) -> Result<()> {
        self.separator_byte()?;
        if self.default_level == MAX_LEVEL {
            return Err(Error::Config(
                "default_level must be bounded; use `tree` for a full walk".into(),
            ));
        }
        Ok(())
    }
}
