//! Environment variable handling.

use std::env;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
pub fn get_var_or(name: &str, default: &str) -> String {
    get_var(name).unwrap_or_else(|| default.to_string())
}

/// Pick the first non-empty value: an explicit one, then the named
/// environment variable.
pub fn explicit_or_var(explicit: Option<&str>, name: &str) -> Option<String> {
    explicit
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| get_var(name))
}

/// Process variables read as fallback defaults.
pub mod vars {
    /// Hex-encoded 256-bit master key.
    pub const APP_MASTER_KEY: &str = "APP_MASTER_KEY";

    /// Current deployment environment name.
    pub const APP_ENV: &str = "APP_ENV";

    /// Editor command used for interactive edits.
    pub const EDITOR: &str = "EDITOR";

    /// Project config file override.
    pub const ENVCREDS_CONFIG: &str = "ENVCREDS_CONFIG";
}
