//! Configuration loading.

use super::Config;
use crate::error::ConfigError;
use crate::paths;
use std::fs;
use std::path::Path;
use tracing::debug;

impl Config {
    /// Load configuration from the default path, falling back to defaults
    /// when the file does not exist.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = paths::config_file();
        if !path.exists() {
            debug!(path = %path.display(), "no project config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let mut config = Self::parse(&content)?;
        if let Some(dir) = config.credentials_dir.take() {
            config.credentials_dir = Some(paths::expand_tilde(&dir.to_string_lossy()));
        }
        debug!(path = %path.display(), "loaded project config");
        Ok(config)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }
}
