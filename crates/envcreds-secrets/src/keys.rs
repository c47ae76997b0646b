//! Master key resolution.
//!
//! The master key is resolved in priority order:
//! 1. An explicit key passed by the caller (hex-encoded)
//! 2. `APP_MASTER_KEY` environment variable (hex-encoded)
//! 3. The key file `{credentials_dir}/{env}.key` written by `envcreds master-key`
//!
//! Nothing is generated implicitly: if no source yields a key the caller gets
//! [`CredentialsError::MissingKey`].

use std::path::Path;

use envcreds_core::env::{self, vars};
use envcreds_core::{paths, SecretString};
use tracing::debug;
use zeroize::Zeroizing;

use crate::crypto::KEY_SIZE;
use crate::error::{CredentialsError, Result};

/// Resolve the master key for `env`.
pub fn resolve_master_key(
    env: &str,
    explicit: Option<&SecretString>,
    credentials_dir: &Path,
) -> Result<Zeroizing<[u8; KEY_SIZE]>> {
    resolve_master_key_with(env, explicit, credentials_dir, env::get_var)
}

/// Resolve the master key, reading process variables through `lookup`.
pub(crate) fn resolve_master_key_with(
    env: &str,
    explicit: Option<&SecretString>,
    credentials_dir: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Zeroizing<[u8; KEY_SIZE]>> {
    // 1. Explicit key from the caller.
    if let Some(key) = explicit.filter(|k| !k.is_empty()) {
        debug!(env, "using explicit master key");
        return parse_hex_key(env, key.expose_secret());
    }

    // 2. Environment variable.
    if let Some(hex_key) = lookup(vars::APP_MASTER_KEY).map(Zeroizing::new) {
        debug!(env, "using master key from environment variable");
        return parse_hex_key(env, &hex_key);
    }

    // 3. Key file next to the credentials.
    let key_file = paths::key_file(credentials_dir, env);
    if key_file.is_file() {
        debug!(env, path = %key_file.display(), "using master key from key file");
        let hex_key = std::fs::read_to_string(&key_file)
            .map(Zeroizing::new)
            .map_err(|e| CredentialsError::io(env, &key_file, e))?;
        return parse_hex_key(env, &hex_key);
    }

    Err(CredentialsError::MissingKey {
        env: env.to_string(),
    })
}

/// Decode a hex master key, requiring exactly 32 bytes.
pub fn parse_hex_key(env: &str, hex_key: &str) -> Result<Zeroizing<[u8; KEY_SIZE]>> {
    let bytes = Zeroizing::new(hex::decode(hex_key.trim()).map_err(|e| {
        CredentialsError::InvalidKey {
            env: env.to_string(),
            reason: format!("not valid hex: {e}"),
        }
    })?);

    if bytes.len() != KEY_SIZE {
        return Err(CredentialsError::InvalidKey {
            env: env.to_string(),
            reason: format!("must decode to exactly {KEY_SIZE} bytes, got {}", bytes.len()),
        });
    }

    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    key.copy_from_slice(&bytes);
    Ok(key)
}
