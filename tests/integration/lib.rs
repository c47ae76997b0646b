//! Shared fixtures for the envcreds integration tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use envcreds_secrets::crypto::{generate_master_key, CipherError};
use envcreds_secrets::{AesCbcEncryptor, Decrypted, Encryptor, OffloadEncryptor, Options};
use tempfile::TempDir;

/// A backend that completes only after a timer, standing in for a remote
/// key service.
pub struct DelayedEncryptor {
    inner: AesCbcEncryptor,
    delay: Duration,
}

impl DelayedEncryptor {
    pub fn new(inner: AesCbcEncryptor, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl Encryptor for DelayedEncryptor {
    async fn encrypt(&self, plaintext: &[u8]) -> Result<String, CipherError> {
        tokio::time::sleep(self.delay).await;
        self.inner.encrypt_sync(plaintext)
    }

    async fn decrypt(&self, payload: &str) -> Result<Decrypted, CipherError> {
        tokio::time::sleep(self.delay).await;
        self.inner.decrypt_sync(payload)
    }
}

/// Backend flavours that must behave identically.
#[derive(Debug, Clone, Copy)]
pub enum Backend {
    Immediate,
    Offload,
    Delayed,
}

impl Backend {
    pub const ALL: [Backend; 3] = [Backend::Immediate, Backend::Offload, Backend::Delayed];

    /// Build this backend around `key`.
    pub fn build(self, key: [u8; 32]) -> Arc<dyn Encryptor> {
        let aes = AesCbcEncryptor::new(key);
        match self {
            Backend::Immediate => Arc::new(aes),
            Backend::Offload => Arc::new(OffloadEncryptor::new(aes)),
            Backend::Delayed => Arc::new(DelayedEncryptor::new(aes, Duration::from_millis(5))),
        }
    }
}

/// A fresh random key.
pub fn random_key() -> [u8; 32] {
    *generate_master_key()
}

/// Options for `env` rooted in `tmp/credentials` with an explicit backend.
pub fn options(tmp: &TempDir, env: &str, encryptor: Arc<dyn Encryptor>) -> Options {
    Options::new()
        .env(env)
        .credentials_dir(tmp.path().join("credentials"))
        .encryptor(encryptor)
}
