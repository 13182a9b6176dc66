//! Store configuration
//!
//! The data directory is always supplied by the caller; nothing is derived
//! from the environment. A config can be built in code or read from a
//! `snaptext.toml` file:
//!
//! ```toml
//! data_dir = "/home/me/.local/share/SnapText"
//! # history_file = "history.json"
//! # backup_file = "history.backup.json"
//! # sync_writes = true
//! ```

use serde::{Deserialize, Serialize};
use snaptext_core::{HistoryError, HistoryResult};
use snaptext_durability::{HistoryPaths, BACKUP_FILE_NAME, HISTORY_FILE_NAME, TEMP_SUFFIX};
use std::path::{Path, PathBuf};

/// Config file name conventionally placed next to the history
pub const CONFIG_FILE_NAME: &str = "snaptext.toml";

/// History store configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Application-private directory holding the history files
    pub data_dir: PathBuf,
    /// Primary file name inside `data_dir`
    #[serde(default = "default_history_file")]
    pub history_file: String,
    /// Backup file name inside `data_dir`
    #[serde(default = "default_backup_file")]
    pub backup_file: String,
    /// fsync every save before reporting it done
    #[serde(default = "default_sync_writes")]
    pub sync_writes: bool,
}

fn default_history_file() -> String {
    HISTORY_FILE_NAME.to_string()
}

fn default_backup_file() -> String {
    BACKUP_FILE_NAME.to_string()
}

fn default_sync_writes() -> bool {
    true
}

impl HistoryConfig {
    /// Create config with default file names and synced writes
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        HistoryConfig {
            data_dir: data_dir.into(),
            history_file: default_history_file(),
            backup_file: default_backup_file(),
            sync_writes: default_sync_writes(),
        }
    }

    /// Create config for testing
    ///
    /// Skips fsync for faster tests.
    pub fn for_testing(data_dir: impl Into<PathBuf>) -> Self {
        Self::new(data_dir).with_sync_writes(false)
    }

    /// Set the primary file name
    pub fn with_history_file(mut self, name: impl Into<String>) -> Self {
        self.history_file = name.into();
        self
    }

    /// Set the backup file name
    pub fn with_backup_file(mut self, name: impl Into<String>) -> Self {
        self.backup_file = name.into();
        self
    }

    /// Enable or disable fsync on save
    pub fn with_sync_writes(mut self, sync: bool) -> Self {
        self.sync_writes = sync;
        self
    }

    /// Directory layout described by this config
    pub fn paths(&self) -> HistoryPaths {
        HistoryPaths::with_file_names(&self.data_dir, &self.history_file, &self.backup_file)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }
        check_file_name("history_file", &self.history_file)?;
        check_file_name("backup_file", &self.backup_file)?;
        if self.history_file == self.backup_file {
            return Err(ConfigError::SameFile(self.history_file.clone()));
        }
        // The temp file is removed on open and renamed away on every save
        if self.backup_file == format!("{}{}", self.history_file, TEMP_SUFFIX) {
            return Err(ConfigError::BackupIsTempFile(self.backup_file.clone()));
        }
        Ok(())
    }

    /// Read and parse config from a TOML file
    pub fn from_file(path: &Path) -> HistoryResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HistoryError::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: HistoryConfig = toml::from_str(&content).map_err(|e| {
            HistoryError::config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config
            .validate()
            .map_err(|e| HistoryError::config(e.to_string()))?;
        Ok(config)
    }

    /// Serialize this config to TOML and write it to the given path
    pub fn write_to_file(&self, path: &Path) -> HistoryResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| HistoryError::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| HistoryError::write(path, e))
    }
}

fn check_file_name(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyFileName { field });
    }
    let mut components = Path::new(value).components();
    let bare = matches!(
        (components.next(), components.next()),
        (Some(std::path::Component::Normal(_)), None)
    );
    if !bare {
        return Err(ConfigError::NotAFileName {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No data directory given
    #[error("data_dir must not be empty")]
    EmptyDataDir,

    /// A file name is blank
    #[error("{field} must not be empty")]
    EmptyFileName {
        /// Offending setting
        field: &'static str,
    },

    /// A file name contains directory components
    #[error("{field} must be a bare file name, got '{value}'")]
    NotAFileName {
        /// Offending setting
        field: &'static str,
        /// Value supplied
        value: String,
    },

    /// Primary and backup point at the same file
    #[error("history_file and backup_file are both '{0}'")]
    SameFile(String),

    /// Backup name collides with the in-flight save file
    #[error("backup_file '{0}' is the temporary file used while saving")]
    BackupIsTempFile(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = HistoryConfig::new("/data/SnapText");
        assert_eq!(config.history_file, "history.json");
        assert_eq!(config.backup_file, "history.backup.json");
        assert!(config.sync_writes);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = HistoryConfig::new("/data")
            .with_history_file("clips.json")
            .with_backup_file("clips.prev.json")
            .with_sync_writes(false);

        assert_eq!(config.paths().primary(), PathBuf::from("/data/clips.json"));
        assert_eq!(config.paths().backup(), PathBuf::from("/data/clips.prev.json"));
        assert!(!config.sync_writes);
    }

    #[test]
    fn test_for_testing() {
        let config = HistoryConfig::for_testing("/tmp/x");
        assert!(!config.sync_writes);
    }

    #[test]
    fn test_validate_rejects_same_file() {
        let config = HistoryConfig::new("/data").with_backup_file("history.json");
        assert!(matches!(config.validate(), Err(ConfigError::SameFile(_))));
    }

    #[test]
    fn test_validate_rejects_backup_on_temp_name() {
        let config = HistoryConfig::new("/data").with_backup_file("history.json.tmp");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BackupIsTempFile(name)) if name == "history.json.tmp"
        ));

        let config = HistoryConfig::new("/data")
            .with_history_file("clips.json")
            .with_backup_file("clips.json.tmp");
        assert!(config.validate().is_err());

        // Only the primary's temp name is reserved
        let config = HistoryConfig::new("/data").with_backup_file("history.backup.json.tmp");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_nested_name() {
        let config = HistoryConfig::new("/data").with_history_file("sub/history.json");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotAFileName { field: "history_file", .. })
        ));

        let config = HistoryConfig::new("/data").with_backup_file("..");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank() {
        let config = HistoryConfig::new("/data").with_history_file("  ");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyFileName { .. })
        ));
        assert!(matches!(
            HistoryConfig::new("").validate(),
            Err(ConfigError::EmptyDataDir)
        ));
    }

    #[test]
    fn test_toml_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        let config = HistoryConfig::new(temp.path()).with_sync_writes(false);

        config.write_to_file(&path).unwrap();
        let loaded = HistoryConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_toml_defaults_applied() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "data_dir = \"/var/lib/snaptext\"\n").unwrap();

        let config = HistoryConfig::from_file(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/snaptext"));
        assert_eq!(config.history_file, "history.json");
        assert!(config.sync_writes);
    }

    #[test]
    fn test_from_file_invalid() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "data_dir = 42").unwrap();
        assert!(matches!(
            HistoryConfig::from_file(&path),
            Err(HistoryError::Config(_))
        ));

        let missing = temp.path().join("missing.toml");
        assert!(HistoryConfig::from_file(&missing).is_err());
    }
}
