//! CLI configuration
//!
//! Settings come from `lineage.toml` (or the file named by `LINEAGE_CONFIG`),
//! after a `.env` file has been loaded into the environment. Every field has
//! a default and command-line flags override the file.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use lineage_core::logging_facility::Profile;
use serde::Deserialize;

/// Environment variable naming an alternative configuration file
pub const CONFIG_ENV: &str = "LINEAGE_CONFIG";

/// Configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "lineage.toml";

/// Contents of the configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// SQLite database file; parent directories are created on open
    pub db_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(".lineage/lineage.db"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `development`, `production` or `test`
    pub profile: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            profile: "production".to_string(),
        }
    }
}

/// Effective settings after flags have been applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub db_path: PathBuf,
    pub profile: Profile,
}

impl Config {
    /// Load the configuration
    ///
    /// Looks for the file in this order:
    /// 1. `explicit`, from the `--config` flag
    /// 2. The path in `LINEAGE_CONFIG`
    /// 3. `./lineage.toml`
    ///
    /// A missing default file yields the defaults; a missing file that was
    /// named explicitly is an error.
    ///
    /// # Errors
    /// Unreadable or malformed configuration files.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();

        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        match named {
            Some(path) => Self::from_path(&path),
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_path(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Read and parse one configuration file
    ///
    /// # Errors
    /// Unreadable or malformed files.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// # Errors
    /// Malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Apply command-line overrides
    ///
    /// # Errors
    /// An unknown logging profile name.
    pub fn resolve(&self, db_path: Option<PathBuf>, profile: Option<&str>) -> Result<Settings> {
        let profile_name = profile.unwrap_or(&self.logging.profile);
        let profile = Profile::from_name(profile_name)
            .ok_or_else(|| anyhow!("Unknown logging profile: {}", profile_name))?;

        Ok(Settings {
            db_path: db_path.unwrap_or_else(|| self.store.db_path.clone()),
            profile,
        })
    }
}
