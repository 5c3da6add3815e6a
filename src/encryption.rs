//! Symmetric encryption for values persisted at rest (refresh tokens,
//! device codes).
//!
//! The salt is hashed with SHA-256 to derive the fixed-length cipher key, so
//! integrators can supply salts of any length. A fresh random nonce is
//! generated per call and prepended to the ciphertext, making a single
//! base64 string the unit of storage.

use std::sync::RwLock;

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::Aes256Gcm;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chacha20poly1305::ChaCha20Poly1305;
use sha2::{Digest, Sha256};
use strum::{Display, EnumString};

use crate::error::{OAuthError, Result};

/// AEAD ciphers this build supports. Both use 96-bit nonces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum CipherMethod {
    #[strum(serialize = "aes-256-gcm")]
    Aes256Gcm,
    #[strum(serialize = "chacha20-poly1305")]
    ChaCha20Poly1305,
}

impl CipherMethod {
    const NONCE_LEN: usize = 12;
}

/// Encrypt/decrypt contract consumed by the secure storage layer.
///
/// Object-safe and interior-mutable: the grant machinery propagates the
/// configured salt through a shared `Arc<dyn Encryption>` at the start of
/// every operation.
pub trait Encryption: Send + Sync {
    /// True only once a non-empty salt has been configured. Used as a
    /// startup gate and never silently bypassed.
    fn is_valid(&self) -> bool;

    fn encrypt(&self, value: &str) -> Result<String>;

    fn decrypt(&self, value: &str) -> Result<String>;

    /// Set the salt the cipher key is derived from. Must be called with a
    /// non-empty value before the provider is usable.
    fn set_salt(&self, salt: &str) -> Result<()>;

    /// Select the cipher by name, e.g. `"aes-256-gcm"`.
    fn set_cipher_method(&self, name: &str) -> Result<()>;
}

/// Default [`Encryption`] implementation over the RustCrypto AEADs.
pub struct CipherEncryption {
    salt: RwLock<Option<String>>,
    method: RwLock<CipherMethod>,
}

impl CipherEncryption {
    pub fn new() -> Self {
        Self {
            salt: RwLock::new(None),
            method: RwLock::new(CipherMethod::Aes256Gcm),
        }
    }

    fn derive_key(&self) -> Result<[u8; 32]> {
        let guard = self
            .salt
            .read()
            .map_err(|_| OAuthError::Crypto("salt lock poisoned".to_string()))?;
        let salt = guard
            .as_ref()
            .ok_or_else(|| OAuthError::Crypto("no salt has been configured".to_string()))?;
        Ok(Sha256::digest(salt.as_bytes()).into())
    }

    fn method(&self) -> CipherMethod {
        self.method.read().map(|m| *m).unwrap_or(CipherMethod::Aes256Gcm)
    }

    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let key = self.derive_key()?;
        match self.method() {
            CipherMethod::Aes256Gcm => {
                let cipher = Aes256Gcm::new_from_slice(&key)
                    .map_err(|err| OAuthError::Crypto(format!("cipher init failed: {err}")))?;
                let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
                let ciphertext = cipher
                    .encrypt(&nonce, plaintext)
                    .map_err(|_| OAuthError::Crypto("encryption failed".to_string()))?;
                let mut out = nonce.to_vec();
                out.extend_from_slice(&ciphertext);
                Ok(out)
            }
            CipherMethod::ChaCha20Poly1305 => {
                let cipher = ChaCha20Poly1305::new_from_slice(&key)
                    .map_err(|err| OAuthError::Crypto(format!("cipher init failed: {err}")))?;
                let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
                let ciphertext = cipher
                    .encrypt(&nonce, plaintext)
                    .map_err(|_| OAuthError::Crypto("encryption failed".to_string()))?;
                let mut out = nonce.to_vec();
                out.extend_from_slice(&ciphertext);
                Ok(out)
            }
        }
    }

    fn open(&self, payload: &[u8]) -> Result<Vec<u8>> {
        if payload.len() <= CipherMethod::NONCE_LEN {
            return Err(OAuthError::Crypto(
                "payload too short to contain a nonce".to_string(),
            ));
        }
        let key = self.derive_key()?;
        let (nonce, ciphertext) = payload.split_at(CipherMethod::NONCE_LEN);
        match self.method() {
            CipherMethod::Aes256Gcm => {
                let cipher = Aes256Gcm::new_from_slice(&key)
                    .map_err(|err| OAuthError::Crypto(format!("cipher init failed: {err}")))?;
                cipher
                    .decrypt(aes_gcm::Nonce::from_slice(nonce), ciphertext)
                    .map_err(|_| OAuthError::Crypto("decryption failed".to_string()))
            }
            CipherMethod::ChaCha20Poly1305 => {
                let cipher = ChaCha20Poly1305::new_from_slice(&key)
                    .map_err(|err| OAuthError::Crypto(format!("cipher init failed: {err}")))?;
                cipher
                    .decrypt(chacha20poly1305::Nonce::from_slice(nonce), ciphertext)
                    .map_err(|_| OAuthError::Crypto("decryption failed".to_string()))
            }
        }
    }
}

impl Default for CipherEncryption {
    fn default() -> Self {
        Self::new()
    }
}

impl Encryption for CipherEncryption {
    fn is_valid(&self) -> bool {
        self.salt
            .read()
            .map(|salt| salt.as_deref().is_some_and(|s| !s.is_empty()))
            .unwrap_or(false)
    }

    fn encrypt(&self, value: &str) -> Result<String> {
        if value.is_empty() {
            return Err(OAuthError::InvalidArgument(
                "Must specify a value to encrypt".to_string(),
            ));
        }
        let sealed = self.seal(value.as_bytes())?;
        Ok(BASE64.encode(sealed))
    }

    fn decrypt(&self, value: &str) -> Result<String> {
        if value.is_empty() {
            return Err(OAuthError::InvalidArgument(
                "Must specify a value to decrypt".to_string(),
            ));
        }
        let payload = BASE64
            .decode(value)
            .map_err(|_| OAuthError::Crypto("payload is not valid base64".to_string()))?;
        let plaintext = self.open(&payload)?;
        String::from_utf8(plaintext)
            .map_err(|_| OAuthError::Crypto("decrypted payload is not UTF-8".to_string()))
    }

    fn set_salt(&self, salt: &str) -> Result<()> {
        if salt.is_empty() {
            return Err(OAuthError::InvalidArgument(
                "The encryption salt must be a non-empty string".to_string(),
            ));
        }
        let mut guard = self
            .salt
            .write()
            .map_err(|_| OAuthError::Crypto("salt lock poisoned".to_string()))?;
        *guard = Some(salt.to_string());
        Ok(())
    }

    fn set_cipher_method(&self, name: &str) -> Result<()> {
        let method: CipherMethod = name.parse().map_err(|_| {
            OAuthError::InvalidArgument(format!("The selected cipher is not available: {name}"))
        })?;
        let mut guard = self
            .method
            .write()
            .map_err(|_| OAuthError::Crypto("cipher lock poisoned".to_string()))?;
        *guard = method;
        Ok(())
    }
}
