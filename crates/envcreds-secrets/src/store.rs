//! Encrypted credentials file storage.
//!
//! [`CredentialStore`] owns one [`CredentialsFile`] and one [`Encryptor`] and
//! performs every read and write against that file. Content is validated
//! before anything touches disk, so a rejected update leaves the previous
//! ciphertext in place.
//!
//! There is no locking. Two processes updating the same file race and the
//! last writer wins.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::crypto::{CipherError, Encryptor};
use crate::editor::{EditSession, Editor};
use crate::error::{CredentialsError, Result};
use crate::types::{Contents, CredentialsFile, Environment, Secrets};

/// Reads and updates one environment's encrypted credentials file.
pub struct CredentialStore {
    file: CredentialsFile,
    encryptor: Arc<dyn Encryptor>,
}

impl CredentialStore {
    /// Create a store for `file` using `encryptor`.
    pub fn new(file: CredentialsFile, encryptor: Arc<dyn Encryptor>) -> Self {
        Self { file, encryptor }
    }

    /// The file this store reads and writes.
    pub fn file(&self) -> &CredentialsFile {
        &self.file
    }

    /// Full path to the encrypted file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// The environment this store belongs to.
    pub fn env(&self) -> &Environment {
        self.file.env()
    }

    /// Decrypt and parse the credentials file.
    ///
    /// A missing or empty file reads as an empty mapping.
    pub async fn read(&self) -> Result<Secrets> {
        let payload = self.read_payload().await?;
        let decrypted = self
            .encryptor
            .decrypt(&payload)
            .await
            .map_err(|e| self.cipher_error(e))?;

        let plaintext = Zeroizing::new(decrypted.plaintext);
        let text = std::str::from_utf8(&plaintext).map_err(|e| CredentialsError::Decryption {
            env: self.env_name(),
            cause: format!("decrypted data is not valid UTF-8: {e}"),
        })?;

        // Whitespace-only plaintext falls through to InvalidFormat.
        if text.is_empty() {
            return Ok(Secrets::new());
        }

        Secrets::from_json(text).map_err(|e| CredentialsError::InvalidFormat {
            env: self.env_name(),
            cause: e.to_string(),
        })
    }

    /// Update the credentials.
    ///
    /// With contents, they replace the file immediately (see
    /// [`CredentialStore::replace`]). Without, the current content is opened
    /// in the editor named by `EDITOR` (see [`CredentialStore::edit`]).
    pub async fn update(&self, contents: Option<Contents>) -> Result<()> {
        match contents {
            Some(contents) => self.replace(contents).await,
            None => self.edit(&Editor::from_env()).await,
        }
    }

    /// Validate, encrypt and write new contents.
    pub async fn replace(&self, contents: Contents) -> Result<()> {
        let plaintext = Zeroizing::new(contents.canonicalize().map_err(|e| {
            CredentialsError::InvalidFormat {
                env: self.env_name(),
                cause: e.to_string(),
            }
        })?);

        let payload = self
            .encryptor
            .encrypt(plaintext.as_bytes())
            .await
            .map_err(|e| self.cipher_error(e))?;

        self.write_payload(&payload).await?;
        info!(env = %self.env(), path = %self.path().display(), "credentials saved");
        Ok(())
    }

    /// Edit the credentials interactively.
    ///
    /// Completes once the editor has exited and its result has been saved.
    /// The plaintext temp file is removed on every path out of this call.
    pub async fn edit(&self, editor: &Editor) -> Result<()> {
        let current = self.read().await?;
        let mut session = EditSession::begin(self.env().name(), &current)?;

        let saved = self.save_edit(&mut session, editor).await;
        let cleaned = session.finish();
        saved.and(cleaned)
    }

    async fn save_edit(&self, session: &mut EditSession, editor: &Editor) -> Result<()> {
        let status = session.run_editor(editor).await?;
        if !status.success() {
            warn!(env = %self.env(), editor = %editor, %status, "editor exited unsuccessfully, saving anyway");
        }

        let edited = Zeroizing::new(session.read_back().await?);
        self.replace(Contents::Raw(edited.to_string())).await?;
        session.mark_saved();
        Ok(())
    }

    /// Encrypt an arbitrary JSON file into this store's file.
    ///
    /// Returns the path of the encrypted output.
    pub async fn encrypt_file(&self, input: &Path) -> Result<PathBuf> {
        if !input.exists() {
            return Err(CredentialsError::SourceNotFound {
                env: self.env_name(),
                path: input.to_path_buf(),
            });
        }

        let bytes = Zeroizing::new(
            tokio::fs::read(input)
                .await
                .map_err(|e| CredentialsError::io(self.env().name(), input, e))?,
        );
        let text = std::str::from_utf8(&bytes).map_err(|e| CredentialsError::InvalidFormat {
            env: self.env_name(),
            cause: format!("input is not valid UTF-8: {e}"),
        })?;

        debug!(input = %input.display(), output = %self.path().display(), "encrypting file");
        self.replace(Contents::Raw(text.to_string())).await?;
        Ok(self.path().to_path_buf())
    }

    async fn read_payload(&self) -> Result<String> {
        let path = self.path();
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "credentials file not found, reading as empty");
                return Ok(String::new());
            }
            Err(e) => return Err(CredentialsError::io(self.env().name(), path, e)),
        };

        String::from_utf8(bytes).map_err(|e| CredentialsError::Decryption {
            env: self.env_name(),
            cause: format!("encrypted file is not valid UTF-8: {e}"),
        })
    }

    async fn write_payload(&self, payload: &str) -> Result<()> {
        self.ensure_dir().await?;

        let path = self.path();
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        write_secret_file(&tmp, payload.as_bytes())
            .await
            .map_err(|e| CredentialsError::io(self.env().name(), &tmp, e))?;

        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                warn!(path = %tmp.display(), "could not remove temporary file: {cleanup}");
            }
            return Err(CredentialsError::io(self.env().name(), path, e));
        }

        Ok(())
    }

    /// Create the credentials directory if it is missing.
    ///
    /// Only the last path component is created; a missing ancestor is an
    /// error rather than being created recursively.
    async fn ensure_dir(&self) -> Result<()> {
        let dir = self.file.dir();
        if dir.as_os_str().is_empty() || dir.is_dir() {
            return Ok(());
        }

        debug!(dir = %dir.display(), "creating credentials directory");
        match tokio::fs::create_dir(dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(CredentialsError::io(self.env().name(), dir, e)),
        }
    }

    fn env_name(&self) -> String {
        self.env().name().to_string()
    }

    fn cipher_error(&self, err: CipherError) -> CredentialsError {
        match err {
            CipherError::Decrypt(cause) => CredentialsError::Decryption {
                env: self.env_name(),
                cause,
            },
            CipherError::Encrypt(cause) => CredentialsError::Encryption {
                env: self.env_name(),
                cause,
            },
        }
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("file", &self.file)
            .finish_non_exhaustive()
    }
}

/// Write `data` to `path` with mode 0600 on Unix.
///
/// A new file is created with that mode, and an existing file is narrowed to
/// it before any data is written.
pub async fn write_secret_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .await?;
    }

    file.write_all(data).await?;
    file.flush().await?;
    Ok(())
}
