//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Project-level defaults read from `envcreds.json5`.
///
/// Every field is optional. Command-line flags and process variables take
/// precedence over anything set here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Default environment name (e.g. "production").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    /// Directory holding the encrypted credentials files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_dir: Option<PathBuf>,

    /// Editor command used by `envcreds edit`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
}
