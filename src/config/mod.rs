//! Configuration module for pictag
//!
//! Manages application configuration: index location, output format and the
//! default batch policy. Configuration is stored in the user's config
//! directory as TOML.

use std::fs;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::orchestrator::BatchOptions;

/// Path display format
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PathFormat {
    /// Display absolute paths
    #[default]
    Absolute,
    /// Display relative paths (relative to current directory)
    Relative,
}

/// Application configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct PictagConfig {
    /// Index directory; the data directory is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    /// Suppress informational output by default
    #[serde(default)]
    pub quiet: bool,

    /// Default format for displaying paths (absolute or relative)
    #[serde(default)]
    pub path_format: PathFormat,

    /// Default policy for batch, rename and cleanup commands
    #[serde(default)]
    pub batch: BatchOptions,
}

impl PictagConfig {
    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine config directory".to_string()))?;

        Ok(config_dir.join("pictag").join("config.toml"))
    }

    /// Load configuration from the default location, creating it if missing
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be read, parsed, or created.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed, or created.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let default_config = Self::default();
            default_config.save_to(path)?;
            return Ok(default_config);
        }

        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .build()?;

        settings.try_deserialize()
    }

    /// Save configuration to the default location
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config directory cannot be determined or
    /// the file cannot be written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the parent directory cannot be created, the configuration
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Message(format!("Failed to create config directory: {e}")))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Resolve the index directory, falling back to `<data dir>/pictag/db`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if no database is configured and the system data
    /// directory cannot be determined.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.database {
            return Ok(path.clone());
        }
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine data directory".to_string()))?;
        Ok(data_dir.join("pictag").join("db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = PictagConfig::default();
        assert!(config.database.is_none());
        assert!(!config.quiet);
        assert_eq!(config.path_format, PathFormat::Absolute);
        assert_eq!(config.batch, BatchOptions::default());
    }

    #[test]
    fn test_missing_file_writes_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let config = PictagConfig::load_from(&path).unwrap();

        assert_eq!(config, PictagConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let config = PictagConfig {
            database: Some(PathBuf::from("/tmp/pictag-test-db")),
            quiet: true,
            path_format: PathFormat::Relative,
            batch: BatchOptions {
                continue_on_error: false,
                parallel: true,
                atomic_retag: false,
            },
        };

        config.save_to(&path).unwrap();
        let loaded = PictagConfig::load_from(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "path_format = \"relative\"\n\n[batch]\nparallel = true\n").unwrap();

        let config = PictagConfig::load_from(&path).unwrap();

        assert_eq!(config.path_format, PathFormat::Relative);
        assert!(config.batch.parallel);
        assert!(config.batch.continue_on_error);
        assert!(config.batch.atomic_retag);
        assert!(config.database.is_none());
    }

    #[test]
    fn test_invalid_file_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "path_format = \"sideways\"\n").unwrap();

        assert!(PictagConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_database_path_prefers_configured() {
        let config = PictagConfig {
            database: Some(PathBuf::from("/srv/index")),
            ..PictagConfig::default()
        };
        assert_eq!(config.database_path().unwrap(), PathBuf::from("/srv/index"));
    }
}
