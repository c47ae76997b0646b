//! Top-level credential operations.
//!
//! These resolve the environment, directory and master key from an
//! [`Options`] value, build a [`CredentialStore`] and run one operation on it.
//! Only [`load`] (through [`export_to_env`]) touches process state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use envcreds_core::{env, SecretString};
use tracing::{debug, warn};

use crate::crypto::{AesCbcEncryptor, Encryptor};
use crate::editor::Editor;
use crate::error::Result;
use crate::keys;
use crate::store::CredentialStore;
use crate::types::{CredentialsFile, Environment, Secrets};

pub use crate::crypto::generate_key;

/// Options shared by [`read`], [`load`] and [`edit`].
#[derive(Clone, Default)]
pub struct Options {
    env: Option<String>,
    credentials_dir: Option<PathBuf>,
    credentials_file: Option<String>,
    master_key: Option<SecretString>,
    overrides: Option<Secrets>,
    encryptor: Option<Arc<dyn Encryptor>>,
}

impl Options {
    /// Options that resolve everything from the process environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment name (otherwise `APP_ENV`, then "development").
    pub fn env(mut self, env: impl Into<String>) -> Self {
        self.env = Some(env.into());
        self
    }

    /// Credentials directory. An empty path means the working directory.
    pub fn credentials_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.credentials_dir = Some(dir.into());
        self
    }

    /// Credentials file name inside the directory.
    pub fn credentials_file(mut self, file: impl Into<String>) -> Self {
        self.credentials_file = Some(file.into());
        self
    }

    /// Hex-encoded master key (otherwise `APP_MASTER_KEY`, then the key file).
    pub fn master_key(mut self, key: impl Into<SecretString>) -> Self {
        self.master_key = Some(key.into());
        self
    }

    /// Values applied on top of the decrypted secrets by [`load`].
    pub fn overrides(mut self, overrides: Secrets) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Use a specific backend instead of the local AES-256-CBC key.
    pub fn encryptor(mut self, encryptor: Arc<dyn Encryptor>) -> Self {
        self.encryptor = Some(encryptor);
        self
    }

    /// Resolve the environment, file location and backend, then build a store.
    pub fn store(&self) -> Result<CredentialStore> {
        self.store_with(env::get_var)
    }

    /// Build a store, reading process variables through `lookup`.
    pub(crate) fn store_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<CredentialStore> {
        let env = Environment::resolve(self.env.as_deref());
        let file = CredentialsFile::new(
            env,
            self.credentials_dir.clone(),
            self.credentials_file.clone(),
        );
        let encryptor = self.resolve_encryptor(&file, lookup)?;
        debug!(env = %file.env(), path = %file.path().display(), "resolved credentials file");
        Ok(CredentialStore::new(file, encryptor))
    }

    fn resolve_encryptor(
        &self,
        file: &CredentialsFile,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Arc<dyn Encryptor>> {
        if let Some(encryptor) = &self.encryptor {
            return Ok(Arc::clone(encryptor));
        }

        let key_dir = if file.dir().as_os_str().is_empty() {
            Path::new(".")
        } else {
            file.dir()
        };
        let key = keys::resolve_master_key_with(
            file.env().name(),
            self.master_key.as_ref(),
            key_dir,
            lookup,
        )?;
        Ok(Arc::new(AesCbcEncryptor::new(*key)))
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("env", &self.env)
            .field("credentials_dir", &self.credentials_dir)
            .field("credentials_file", &self.credentials_file)
            .field("master_key", &self.master_key)
            .field("overrides", &self.overrides)
            .field("custom_encryptor", &self.encryptor.is_some())
            .finish()
    }
}

/// Decrypt the credentials without touching the process environment.
pub async fn read(options: &Options) -> Result<Secrets> {
    options.store()?.read().await
}

/// Decrypt the credentials, apply overrides and export every pair to the
/// process environment. Returns the effective mapping.
pub async fn load(options: &Options) -> Result<Secrets> {
    let secrets = read(options).await?;
    let secrets = match &options.overrides {
        Some(overrides) => secrets.merged(overrides),
        None => secrets,
    };

    export_to_env(&secrets);
    Ok(secrets)
}

/// Set one process environment variable per entry.
///
/// Keys that cannot be environment variable names (empty, or containing `=`
/// or NUL) are skipped.
pub fn export_to_env(secrets: &Secrets) {
    for (key, value) in secrets.iter() {
        if key.is_empty() || key.contains(['=', '\0']) {
            warn!(key = %key.escape_debug(), "skipping key that is not a valid variable name");
            continue;
        }
        let value = Secrets::env_value(value);
        if value.contains('\0') {
            warn!(key = %key, "skipping value containing NUL");
            continue;
        }
        std::env::set_var(key, value);
    }
    debug!(count = secrets.len(), "exported credentials to process environment");
}

/// Open the credentials in `editor` and save the result.
pub async fn edit(options: &Options, editor: &Editor) -> Result<()> {
    options.store()?.edit(editor).await
}

/// Options for [`encrypt_file`].
#[derive(Debug, Clone, Default)]
pub struct EncryptFileOptions {
    /// File to encrypt. Must contain a JSON object.
    pub input: PathBuf,
    /// Output file name; defaults to `<input-basename>.enc`.
    pub output: Option<String>,
    /// Environment and key resolution.
    pub options: Options,
}

impl EncryptFileOptions {
    /// Encrypt `input` with otherwise default options.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    fn output_name(&self) -> String {
        self.output.clone().filter(|o| !o.is_empty()).unwrap_or_else(|| {
            let base = self
                .input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "credentials.json".to_string());
            format!("{base}.enc")
        })
    }
}

/// Encrypt an arbitrary JSON file into the credentials directory.
///
/// Returns the path of the encrypted output.
pub async fn encrypt_file(options: &EncryptFileOptions) -> Result<PathBuf> {
    let store = options
        .options
        .clone()
        .credentials_file(options.output_name())
        .store()?;
    store.encrypt_file(&options.input).await
}
