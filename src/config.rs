//! Configuration file handling.
//!
//! This module provides loading and saving of gemaudit configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/gemaudit/config.toml`
//! - macOS: `~/Library/Application Support/gemaudit/config.toml`
//! - Windows: `%APPDATA%\gemaudit\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! database_path = "/opt/ruby-advisory-db"
//!
//! [ignore]
//! advisories = ["CVE-2015-9284", "OSVDB-89026"]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::platform;

/// Application configuration.
///
/// Command-line flags take precedence over values loaded here.
///
/// # Example
///
/// ```no_run
/// use gemaudit::Config;
///
/// // Load from file (or use defaults if file doesn't exist)
/// let config = Config::load().unwrap();
///
/// println!("Database: {}", config.database_path().display());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Location of the advisory database checkout.
    ///
    /// Default: `<data_dir>/ruby-advisory-db`
    pub database_path: Option<PathBuf>,

    /// Advisories to suppress.
    pub ignore: IgnoreConfig,
}

/// Advisories that should not be reported.
///
/// Use this to suppress known false positives or accepted risks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    /// Advisory ids or identifiers (e.g., "CVE-2013-0156", "OSVDB-89026",
    /// "GHSA-jmgw-6vjg-jjwg").
    pub advisories: Vec<String>,
}

impl Config {
    /// Loads configuration from the default config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`, or defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Saves the configuration to the default config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    ///
    /// # Example
    ///
    /// ```
    /// use gemaudit::Config;
    ///
    /// let path = Config::config_path();
    /// assert!(path.ends_with("config.toml"));
    /// ```
    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }

    /// The configured database location, or the platform default.
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(platform::advisory_db_dir)
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config {
            database_path: Some(platform::advisory_db_dir()),
            ignore: IgnoreConfig::default(),
        };
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert!(config.database_path.is_none());
        assert!(config.ignore.advisories.is_empty());
        assert_eq!(config.database_path(), platform::advisory_db_dir());
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "database_path = \"/opt/ruby-advisory-db\"\n\n[ignore]\nadvisories = [\"CVE-2013-0156\"]\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.database_path(), PathBuf::from("/opt/ruby-advisory-db"));
        assert_eq!(config.ignore.advisories, vec!["CVE-2013-0156"]);
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "ignore = 3").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_save_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            database_path: Some(PathBuf::from("/opt/db")),
            ignore: IgnoreConfig {
                advisories: vec!["OSVDB-89026".to_string()],
            },
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_generate_default_config() {
        let generated = Config::generate_default_config();
        assert!(generated.contains("database_path"));
        assert!(generated.contains("[ignore]"));
    }
}
