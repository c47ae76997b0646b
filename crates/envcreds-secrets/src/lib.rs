//! Encrypted per-environment credentials for envcreds.
//!
//! One JSON object of secrets per deployment environment, stored as
//! AES-256-CBC ciphertext at `credentials/credentials.<env>.json.enc` and
//! edited through an external editor.
//!
//! ```no_run
//! # async fn example() -> envcreds_secrets::Result<()> {
//! use envcreds_secrets::{load, Options};
//!
//! let secrets = load(&Options::new().env("production")).await?;
//! println!("loaded {} credentials", secrets.len());
//! # Ok(())
//! # }
//! ```

pub mod credentials;
pub mod crypto;
pub mod editor;
pub mod error;
pub mod keys;
pub mod store;
pub mod types;

pub use credentials::{edit, encrypt_file, export_to_env, generate_key, load, read, EncryptFileOptions, Options};
pub use crypto::{AesCbcEncryptor, CipherError, Decrypted, Encryptor, OffloadEncryptor};
pub use editor::{EditPhase, EditSession, Editor};
pub use error::{CredentialsError, Result};
pub use store::{write_secret_file, CredentialStore};
pub use types::{Contents, CredentialsFile, Environment, Secrets};
