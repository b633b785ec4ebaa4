//! Persisted editor configuration.
//!
//! A small JSON file (`~/.microdude/config`) remembering which MIDI device
//! the editor last connected to.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

pub const APP_DIR: &str = ".microdude";
pub const CONFIG_FILE: &str = "config";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// MIDI device name, empty when none was chosen yet.
    #[serde(default)]
    pub device: String,
}

impl EditorConfig {
    pub fn with_device(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
        }
    }

    pub fn has_device(&self) -> bool {
        !self.device.is_empty()
    }
}

/// Location of the configuration file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    /// Store under the user's home directory.
    pub fn in_home() -> Result<Self> {
        let home = dirs::home_dir().ok_or(Error::NoHomeDir)?;
        Ok(Self::new(home.join(APP_DIR)))
    }

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    /// Read the configuration. A missing or unreadable file yields the
    /// default instead of an error.
    pub fn load(&self) -> EditorConfig {
        debug!("Reading config file...");
        let path = self.path();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                error!("Config file could not be opened: {}.", e);
                return EditorConfig::default();
            }
        };
        match serde_json::from_str(&contents) {
            Ok(config) => {
                debug!("Config file read.");
                config
            }
            Err(e) => {
                error!(
                    "Config file could not be read: {}. Using default configuration...",
                    e
                );
                EditorConfig::default()
            }
        }
    }

    pub fn save(&self, config: &EditorConfig) -> Result<()> {
        debug!("Writing config file...");
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(), serde_json::to_string(config)?)?;
        debug!("Config file written.");
        Ok(())
    }

    /// Write the default configuration unless a file already exists.
    pub fn ensure_exists(&self) -> Result<()> {
        if self.path().exists() {
            return Ok(());
        }
        self.save(&EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_device() {
        let config = EditorConfig::default();
        assert!(!config.has_device());
        assert_eq!(serde_json::to_string(&config).unwrap(), r#"{"device":""}"#);
    }

    #[test]
    fn test_missing_device_field_defaults() {
        let config: EditorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_store_paths() {
        let store = ConfigStore::new("/tmp/x/.microdude");
        assert_eq!(store.path(), PathBuf::from("/tmp/x/.microdude/config"));
    }
}
