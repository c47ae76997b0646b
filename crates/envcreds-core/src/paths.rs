//! Path resolution utilities.

use crate::env::{self, vars};
use std::path::{Path, PathBuf};

/// Conventional credentials directory, relative to the working directory.
pub const DEFAULT_CREDENTIALS_DIR: &str = "credentials";

/// Project config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "envcreds.json5";

/// Get the default credentials directory (`./credentials`).
pub fn default_credentials_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CREDENTIALS_DIR)
}

/// Get the key file written for an environment (`{dir}/{env}.key`).
pub fn key_file(dir: &Path, env: &str) -> PathBuf {
    dir.join(format!("{env}.key"))
}

/// Get the project config file path (`ENVCREDS_CONFIG` or `./envcreds.json5`).
pub fn config_file() -> PathBuf {
    env::get_var(vars::ENVCREDS_CONFIG)
        .map(|p| expand_tilde(&p))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

/// Expand tilde (~) in a path.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
