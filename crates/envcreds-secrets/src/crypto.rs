//! Pluggable encryption backends.
//!
//! [`Encryptor`] is the single capability the store talks to. Backends that
//! finish immediately and backends that defer to another task (or another
//! machine) implement the same async trait, so callers never branch on which
//! one they hold.
//!
//! The default backend is AES-256-CBC with PKCS#7 padding. Each call draws a
//! fresh 16-byte IV and the payload is written as text:
//! `<base64 ciphertext>--<base64 iv>`.

use std::fmt;
use std::sync::Arc;

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;
use thiserror::Error;
use zeroize::Zeroizing;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Master key length in bytes.
pub const KEY_SIZE: usize = 32;

/// CBC initialization vector length in bytes.
pub const IV_SIZE: usize = 16;

/// Separator between the ciphertext and IV in a payload.
pub const PAYLOAD_SEPARATOR: &str = "--";

/// Low-level backend failure. The store attaches the environment name.
#[derive(Debug, Error)]
pub enum CipherError {
    #[error("{0}")]
    Encrypt(String),

    #[error("{0}")]
    Decrypt(String),
}

/// Result of a successful decryption.
#[derive(Clone, PartialEq, Eq)]
pub struct Decrypted {
    /// Recovered plaintext bytes.
    pub plaintext: Vec<u8>,
    /// IV read from the payload, if the backend uses one.
    pub iv: Option<Vec<u8>>,
}

impl Decrypted {
    /// The empty result returned for an empty payload.
    pub fn empty() -> Self {
        Self {
            plaintext: Vec::new(),
            iv: None,
        }
    }
}

impl fmt::Debug for Decrypted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decrypted")
            .field("plaintext", &format_args!("[{} bytes]", self.plaintext.len()))
            .field("iv", &self.iv.as_ref().map(hex::encode))
            .finish()
    }
}

/// Async trait for encryption backends.
#[async_trait]
pub trait Encryptor: Send + Sync {
    /// Encrypt `plaintext` into a self-describing text payload.
    async fn encrypt(&self, plaintext: &[u8]) -> Result<String, CipherError>;

    /// Recover the plaintext from a payload produced by [`Encryptor::encrypt`].
    ///
    /// An empty (or whitespace-only) payload decrypts to empty plaintext.
    async fn decrypt(&self, payload: &str) -> Result<Decrypted, CipherError>;
}

/// Local-key AES-256-CBC backend.
pub struct AesCbcEncryptor {
    key: Zeroizing<[u8; KEY_SIZE]>,
}

impl AesCbcEncryptor {
    /// Create a backend from raw key bytes.
    pub fn new(key: [u8; KEY_SIZE]) -> Self {
        Self {
            key: Zeroizing::new(key),
        }
    }

    /// Encrypt on the calling thread.
    pub fn encrypt_sync(&self, plaintext: &[u8]) -> Result<String, CipherError> {
        let mut iv = [0u8; IV_SIZE];
        rand::thread_rng().fill_bytes(&mut iv);

        let cipher = Aes256CbcEnc::new_from_slices(&self.key[..], &iv)
            .map_err(|e| CipherError::Encrypt(e.to_string()))?;
        let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        Ok(format!(
            "{}{PAYLOAD_SEPARATOR}{}",
            STANDARD.encode(ciphertext),
            STANDARD.encode(iv)
        ))
    }

    /// Decrypt on the calling thread.
    pub fn decrypt_sync(&self, payload: &str) -> Result<Decrypted, CipherError> {
        let payload = payload.trim();
        if payload.is_empty() {
            return Ok(Decrypted::empty());
        }

        let (ciphertext, iv) = split_payload(payload)?;
        let cipher = Aes256CbcDec::new_from_slices(&self.key[..], &iv)
            .map_err(|e| CipherError::Decrypt(e.to_string()))?;
        let plaintext = cipher
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|e| CipherError::Decrypt(format!("bad decrypt: {e}")))?;

        Ok(Decrypted {
            plaintext,
            iv: Some(iv),
        })
    }
}

impl fmt::Debug for AesCbcEncryptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesCbcEncryptor")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl Encryptor for AesCbcEncryptor {
    async fn encrypt(&self, plaintext: &[u8]) -> Result<String, CipherError> {
        self.encrypt_sync(plaintext)
    }

    async fn decrypt(&self, payload: &str) -> Result<Decrypted, CipherError> {
        self.decrypt_sync(payload)
    }
}

/// Deferred backend that runs the AES-256-CBC cipher on Tokio's blocking
/// pool. Payloads are interchangeable with [`AesCbcEncryptor`].
#[derive(Debug, Clone)]
pub struct OffloadEncryptor {
    inner: Arc<AesCbcEncryptor>,
}

impl OffloadEncryptor {
    /// Wrap a local-key backend.
    pub fn new(inner: AesCbcEncryptor) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }
}

#[async_trait]
impl Encryptor for OffloadEncryptor {
    async fn encrypt(&self, plaintext: &[u8]) -> Result<String, CipherError> {
        let inner = Arc::clone(&self.inner);
        let plaintext = Zeroizing::new(plaintext.to_vec());
        tokio::task::spawn_blocking(move || inner.encrypt_sync(&plaintext))
            .await
            .map_err(|e| CipherError::Encrypt(format!("encryption task failed: {e}")))?
    }

    async fn decrypt(&self, payload: &str) -> Result<Decrypted, CipherError> {
        let inner = Arc::clone(&self.inner);
        let payload = payload.to_string();
        tokio::task::spawn_blocking(move || inner.decrypt_sync(&payload))
            .await
            .map_err(|e| CipherError::Decrypt(format!("decryption task failed: {e}")))?
    }
}

/// Split a payload into (ciphertext, iv).
fn split_payload(payload: &str) -> Result<(Vec<u8>, Vec<u8>), CipherError> {
    let (ciphertext, iv) = payload
        .split_once(PAYLOAD_SEPARATOR)
        .ok_or_else(|| CipherError::Decrypt("missing IV separator".to_string()))?;

    let ciphertext = STANDARD
        .decode(ciphertext)
        .map_err(|e| CipherError::Decrypt(format!("ciphertext is not valid base64: {e}")))?;
    let iv = STANDARD
        .decode(iv)
        .map_err(|e| CipherError::Decrypt(format!("IV is not valid base64: {e}")))?;

    if iv.len() != IV_SIZE {
        return Err(CipherError::Decrypt(format!(
            "IV must be {IV_SIZE} bytes, got {}",
            iv.len()
        )));
    }

    Ok((ciphertext, iv))
}

/// Generate a new random 256-bit master key.
pub fn generate_master_key() -> Zeroizing<[u8; KEY_SIZE]> {
    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    rand::thread_rng().fill_bytes(&mut key[..]);
    key
}

/// Generate a new master key, hex-encoded for `APP_MASTER_KEY`.
pub fn generate_key() -> String {
    hex::encode(&generate_master_key()[..])
}
