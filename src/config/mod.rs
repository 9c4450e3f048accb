//! Importer configuration.
//!
//! Settings are read from a TOML file. Every field is optional; anything left out
//! keeps the Bundler/RubyGems default.
//!
//! # Location
//!
//! - `--config <FILE>` on the command line, which must exist
//! - otherwise `~/.rubygems-import/config.toml` (`%LOCALAPPDATA%\rubygems-import\config.toml`
//!   on Windows) if present
//! - otherwise built-in defaults
//!
//! # Example
//!
//! ```toml
//! default_source = "https://gems.example.com"
//! gem_executables = ["gem", "gem3.2"]
//! lockfile_name = "Gemfile.lock"
//! ```

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_GEM_EXECUTABLES, DEFAULT_LOCKFILE_NAME,
    DEFAULT_MANIFEST_EXTENSION, DEFAULT_MANIFEST_GLOB, DEFAULT_SOURCE,
};
use crate::core::ImportError;
use crate::manifest::ManifestLocator;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings that shape how a source tree is searched and resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportConfig {
    /// Remote source declared by the synthetic manifest.
    pub default_source: String,

    /// Executable names whose `build`/`install` subcommands are intercepted.
    ///
    /// Matched against the file name of the first word of a command, so
    /// `/usr/local/bin/gem` counts as `gem`.
    pub gem_executables: Vec<String>,

    /// Manifest file extension, without the dot.
    pub manifest_extension: String,

    /// Directory-inclusion glob for the manifest search; the extension is appended.
    pub manifest_glob: String,

    /// Lock artifact looked for next to the manifest.
    pub lockfile_name: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            default_source: DEFAULT_SOURCE.to_string(),
            gem_executables: DEFAULT_GEM_EXECUTABLES.iter().map(|s| (*s).to_string()).collect(),
            manifest_extension: DEFAULT_MANIFEST_EXTENSION.to_string(),
            manifest_glob: DEFAULT_MANIFEST_GLOB.to_string(),
            lockfile_name: DEFAULT_LOCKFILE_NAME.to_string(),
        }
    }
}

impl ImportConfig {
    /// Loads from `path` if given, otherwise from the default location when it exists.
    ///
    /// # Errors
    ///
    /// Fails if an explicit `path` does not exist, or any chosen file cannot be
    /// read or parsed.
    pub fn load_with_optional(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if !path.is_file() {
                return Err(ImportError::ConfigError {
                    message: format!("Config file {} does not exist", path.display()),
                }
                .into());
            }
            return Self::load_from(path);
        }

        match Self::default_path() {
            Ok(path) if path.is_file() => Self::load_from(&path),
            Ok(path) => {
                debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => {
                debug!("No default config location ({e:#}), using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Loads configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not valid TOML, or fails validation.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content).map_err(|e| ImportError::ConfigError {
            message: format!("{}: {}", path.display(), e.message()),
        })?;
        config.validate().with_context(|| format!("Invalid config in {}", path.display()))?;

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Default config file location.
    ///
    /// # Errors
    ///
    /// Fails if the home (or local data) directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join(CONFIG_DIR_NAME.trim_start_matches('.'))
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(CONFIG_DIR_NAME)
        };

        Ok(config_dir.join(CONFIG_FILE_NAME))
    }

    /// Checks that no setting is empty.
    ///
    /// # Errors
    ///
    /// [`ImportError::ConfigError`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ImportError> {
        let empty = [
            ("default_source", self.default_source.is_empty()),
            ("gem_executables", self.gem_executables.iter().all(String::is_empty)),
            ("manifest_extension", self.manifest_extension.is_empty()),
            ("lockfile_name", self.lockfile_name.is_empty()),
        ];
        match empty.iter().find(|(_, is_empty)| *is_empty) {
            Some((field, _)) => Err(ImportError::ConfigError {
                message: format!("'{field}' must not be empty"),
            }),
            None => Ok(()),
        }
    }

    /// A manifest locator using the configured extension and glob.
    pub fn locator(&self) -> ManifestLocator {
        ManifestLocator::new(&self.manifest_extension, &self.manifest_glob)
    }
}
