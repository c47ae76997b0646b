//! Error types for credential operations.
//!
//! Every variant carries the environment name so a failure in a multi-env
//! deployment points at the right file. Causes are lower-level messages
//! only; key material never ends up in an error.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading, writing or editing credentials.
#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("Environment({env}) - master key is not provided (set APP_MASTER_KEY)")]
    MissingKey { env: String },

    #[error("Environment({env}) - invalid master key: {reason}")]
    InvalidKey { env: String, reason: String },

    #[error("Environment({env}) - invalid encryption key or encrypted data is corrupted: {cause}")]
    Decryption { env: String, cause: String },

    #[error("Environment({env}) - invalid JSON data format: {cause}")]
    InvalidFormat { env: String, cause: String },

    #[error("Environment({env}) - '{}' does not exist", .path.display())]
    SourceNotFound { env: String, path: PathBuf },

    #[error("Environment({env}) - encryption failed: {cause}")]
    Encryption { env: String, cause: String },

    #[error("Environment({env}) - editor '{editor}' failed: {cause}")]
    Editor {
        env: String,
        editor: String,
        cause: String,
    },

    #[error("Environment({env}) - IO error on '{}': {source}", .path.display())]
    Io {
        env: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CredentialsError {
    /// The environment the failing operation was working on.
    pub fn env(&self) -> &str {
        match self {
            Self::MissingKey { env }
            | Self::InvalidKey { env, .. }
            | Self::Decryption { env, .. }
            | Self::InvalidFormat { env, .. }
            | Self::SourceNotFound { env, .. }
            | Self::Encryption { env, .. }
            | Self::Editor { env, .. }
            | Self::Io { env, .. } => env,
        }
    }

    pub(crate) fn io(env: &str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            env: env.to_string(),
            path: path.into(),
            source,
        }
    }
}

/// Convenience result alias for credential operations.
pub type Result<T> = std::result::Result<T, CredentialsError>;
