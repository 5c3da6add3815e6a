//! Key/value persistence contracts and the implementations the grant flows
//! wire together.
//!
//! Durable state lives entirely behind these traits: CSRF state in any
//! [`Storage`] (typically [`MemoryStorage`] or a session store), refresh
//! tokens in the encrypted cookie layer.

mod cookie;
mod memory;

pub use cookie::{CookieJar, CookieStorage, SecureCookieStorage};
pub use memory::MemoryStorage;

use std::sync::Arc;

use crate::error::Result;

/// Key/value persistence with optional TTL, shared across requests.
///
/// `compare` is defined as `get(key) == value` for every built-in
/// implementation; see [`SecureCookieStorage::compare`] for the one place
/// where that definition has teeth.
pub trait Storage: Send + Sync {
    /// Store a value, optionally expiring after `ttl` seconds.
    fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<()>;

    /// Fetch a value, or `None` if absent or expired.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Look up `key` and report whether the stored value equals `value`.
    fn compare(&self, key: &str, value: &str) -> Result<bool>;

    /// Remove all data associated with `key`. Removing an absent key is
    /// not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// The secure-storage slot of a grant controller.
///
/// The precondition gate treats each variant differently: `Encrypted` gets
/// config propagated into it and its encryption provider validated, `Plain`
/// is always rejected (secrets must not be stored unencrypted), and
/// `Custom` is accepted as-is because the integrator has taken
/// responsibility for at-rest protection.
#[derive(Clone)]
pub enum SecureStorage {
    Encrypted(Arc<SecureCookieStorage>),
    Plain(Arc<CookieStorage>),
    Custom(Arc<dyn Storage>),
}

impl SecureStorage {
    /// The default secure store: encrypted cookies over the given jar.
    pub fn encrypted(storage: SecureCookieStorage) -> Self {
        Self::Encrypted(Arc::new(storage))
    }

    /// Plain cookies. Always rejected by the precondition gate; exists so
    /// that the rejection is explicit rather than a silent downgrade.
    pub fn plain(storage: CookieStorage) -> Self {
        Self::Plain(Arc::new(storage))
    }

    /// An integrator-supplied store that handles its own encryption.
    pub fn custom(storage: Arc<dyn Storage>) -> Self {
        Self::Custom(storage)
    }
}

impl Storage for SecureStorage {
    fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<()> {
        match self {
            Self::Encrypted(storage) => storage.set(key, value, ttl),
            Self::Plain(storage) => storage.set(key, value, ttl),
            Self::Custom(storage) => storage.set(key, value, ttl),
        }
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        match self {
            Self::Encrypted(storage) => storage.get(key),
            Self::Plain(storage) => storage.get(key),
            Self::Custom(storage) => storage.get(key),
        }
    }

    fn compare(&self, key: &str, value: &str) -> Result<bool> {
        match self {
            Self::Encrypted(storage) => storage.compare(key, value),
            Self::Plain(storage) => storage.compare(key, value),
            Self::Custom(storage) => storage.compare(key, value),
        }
    }

    fn remove(&self, key: &str) -> Result<()> {
        match self {
            Self::Encrypted(storage) => storage.remove(key),
            Self::Plain(storage) => storage.remove(key),
            Self::Custom(storage) => storage.remove(key),
        }
    }
}
