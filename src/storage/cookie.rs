//! Cookie-backed storage: a plain key/value layer over raw cookie I/O, and
//! an encrypting decorator over that.

use std::sync::{Arc, RwLock};

use crate::encryption::Encryption;
use crate::error::{OAuthError, Result};

use super::Storage;

/// Raw cookie I/O primitive, implemented by the integrator over whatever
/// request/response machinery their framework provides. The core never
/// touches headers directly.
pub trait CookieJar: Send + Sync {
    /// Set a cookie, optionally expiring after `max_age` seconds and scoped
    /// to `domain`.
    fn set_cookie(
        &self,
        name: &str,
        value: &str,
        max_age: Option<u64>,
        domain: Option<&str>,
    ) -> Result<()>;

    fn get_cookie(&self, name: &str) -> Result<Option<String>>;

    fn remove_cookie(&self, name: &str, domain: Option<&str>) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
struct CookieScope {
    domain: Option<String>,
    key_prefix: String,
}

/// Plain cookie storage: prefixes keys and scopes them to a domain. Values
/// go over the wire as-is, so this layer alone is never acceptable for
/// secrets.
pub struct CookieStorage {
    jar: Arc<dyn CookieJar>,
    scope: RwLock<CookieScope>,
}

impl CookieStorage {
    pub fn new(jar: Arc<dyn CookieJar>) -> Self {
        Self {
            jar,
            scope: RwLock::new(CookieScope::default()),
        }
    }

    /// Set the domain the cookies are scoped to, or `None` for the default.
    /// An empty string is not a valid domain.
    pub fn set_domain(&self, domain: Option<&str>) -> Result<()> {
        if domain.is_some_and(str::is_empty) {
            return Err(OAuthError::InvalidArgument(
                "If set, the cookie domain must be a non-empty string".to_string(),
            ));
        }
        let mut scope = self.scope_mut()?;
        scope.domain = domain.map(str::to_string);
        Ok(())
    }

    /// Prefix for all keys, for when multiple proxies share a domain.
    pub fn set_key_prefix(&self, prefix: &str) -> Result<()> {
        let mut scope = self.scope_mut()?;
        scope.key_prefix = prefix.to_string();
        Ok(())
    }

    fn scope(&self) -> Result<CookieScope> {
        self.scope
            .read()
            .map(|scope| scope.clone())
            .map_err(|_| OAuthError::Storage("cookie scope lock poisoned".to_string()))
    }

    fn scope_mut(&self) -> Result<std::sync::RwLockWriteGuard<'_, CookieScope>> {
        self.scope
            .write()
            .map_err(|_| OAuthError::Storage("cookie scope lock poisoned".to_string()))
    }
}

impl Storage for CookieStorage {
    fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<()> {
        let scope = self.scope()?;
        self.jar.set_cookie(
            &format!("{}{key}", scope.key_prefix),
            value,
            ttl,
            scope.domain.as_deref(),
        )
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let scope = self.scope()?;
        self.jar.get_cookie(&format!("{}{key}", scope.key_prefix))
    }

    fn compare(&self, key: &str, value: &str) -> Result<bool> {
        Ok(self.get(key)?.as_deref() == Some(value))
    }

    fn remove(&self, key: &str) -> Result<()> {
        let scope = self.scope()?;
        self.jar.remove_cookie(
            &format!("{}{key}", scope.key_prefix),
            scope.domain.as_deref(),
        )
    }
}

/// Encrypting decorator over [`CookieStorage`]: values are encrypted before
/// they reach the jar and decrypted on the way out. This is the default
/// secure-storage implementation for refresh tokens and device codes.
pub struct SecureCookieStorage {
    inner: CookieStorage,
    encryption: RwLock<Arc<dyn Encryption>>,
}

impl SecureCookieStorage {
    pub fn new(jar: Arc<dyn CookieJar>, encryption: Arc<dyn Encryption>) -> Self {
        Self {
            inner: CookieStorage::new(jar),
            encryption: RwLock::new(encryption),
        }
    }

    /// Swap the encryption provider. The precondition gate calls this so
    /// the decorator always shares the controller's provider.
    pub fn set_encryption(&self, encryption: Arc<dyn Encryption>) -> Result<()> {
        let mut guard = self
            .encryption
            .write()
            .map_err(|_| OAuthError::Storage("encryption lock poisoned".to_string()))?;
        *guard = encryption;
        Ok(())
    }

    pub fn set_domain(&self, domain: Option<&str>) -> Result<()> {
        self.inner.set_domain(domain)
    }

    pub fn set_key_prefix(&self, prefix: &str) -> Result<()> {
        self.inner.set_key_prefix(prefix)
    }

    fn encryption(&self) -> Result<Arc<dyn Encryption>> {
        self.encryption
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| OAuthError::Storage("encryption lock poisoned".to_string()))
    }
}

impl Storage for SecureCookieStorage {
    fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<()> {
        let ciphertext = self.encryption()?.encrypt(value)?;
        self.inner.set(key, &ciphertext, ttl)
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.inner.get(key)? {
            Some(value) if !value.is_empty() => Ok(Some(self.encryption()?.decrypt(&value)?)),
            other => Ok(other),
        }
    }

    /// Inherited from the plain layer, so this compares **ciphertexts**,
    /// not plaintexts. Two encryptions of the same value never match (fresh
    /// nonce per call), which is why the CSRF-state flow keeps its state in
    /// plain session storage and never routes through this decorator.
    fn compare(&self, key: &str, value: &str) -> Result<bool> {
        self.inner.compare(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::encryption::CipherEncryption;

    /// Cookie jar fake that records what the storage layer hands it.
    #[derive(Default)]
    struct FakeJar {
        cookies: Mutex<HashMap<String, String>>,
    }

    impl FakeJar {
        fn raw(&self, name: &str) -> Option<String> {
            self.cookies.lock().unwrap().get(name).cloned()
        }
    }

    impl CookieJar for FakeJar {
        fn set_cookie(
            &self,
            name: &str,
            value: &str,
            _max_age: Option<u64>,
            _domain: Option<&str>,
        ) -> Result<()> {
            self.cookies
                .lock()
                .unwrap()
                .insert(name.to_string(), value.to_string());
            Ok(())
        }

        fn get_cookie(&self, name: &str) -> Result<Option<String>> {
            Ok(self.raw(name))
        }

        fn remove_cookie(&self, name: &str, _domain: Option<&str>) -> Result<()> {
            self.cookies.lock().unwrap().remove(name);
            Ok(())
        }
    }

    fn encryption() -> Arc<dyn Encryption> {
        let enc = CipherEncryption::new();
        enc.set_salt("test-salt").unwrap();
        Arc::new(enc)
    }

    #[test]
    fn plain_storage_prefixes_keys() {
        let jar = Arc::new(FakeJar::default());
        let storage = CookieStorage::new(jar.clone());
        storage.set_key_prefix("proxy_").unwrap();
        storage.set("refresh_token", "value", None).unwrap();
        assert_eq!(jar.raw("proxy_refresh_token").as_deref(), Some("value"));
        assert_eq!(storage.get("refresh_token").unwrap().as_deref(), Some("value"));
        storage.remove("refresh_token").unwrap();
        assert!(storage.get("refresh_token").unwrap().is_none());
    }

    #[test]
    fn plain_storage_rejects_empty_domain() {
        let storage = CookieStorage::new(Arc::new(FakeJar::default()));
        assert!(matches!(
            storage.set_domain(Some("")),
            Err(OAuthError::InvalidArgument(_))
        ));
        storage.set_domain(Some("example.org")).unwrap();
        storage.set_domain(None).unwrap();
    }

    #[test]
    fn secure_storage_encrypts_at_rest() {
        let jar = Arc::new(FakeJar::default());
        let storage = SecureCookieStorage::new(jar.clone(), encryption());
        storage.set("refresh_token", "R1", None).unwrap();
        let at_rest = jar.raw("refresh_token").unwrap();
        assert_ne!(at_rest, "R1");
        assert_eq!(storage.get("refresh_token").unwrap().as_deref(), Some("R1"));
    }

    #[test]
    fn secure_storage_passes_absent_values_through() {
        let storage = SecureCookieStorage::new(Arc::new(FakeJar::default()), encryption());
        assert!(storage.get("missing").unwrap().is_none());
    }

    #[test]
    fn secure_storage_compare_is_ciphertext_compare() {
        let jar = Arc::new(FakeJar::default());
        let storage = SecureCookieStorage::new(jar.clone(), encryption());
        storage.set("key", "plaintext", None).unwrap();
        // Comparing against the plaintext fails: the stored value is a
        // ciphertext under a fresh nonce.
        assert!(!storage.compare("key", "plaintext").unwrap());
        // Comparing against the stored ciphertext itself succeeds.
        let at_rest = jar.raw("key").unwrap();
        assert!(storage.compare("key", &at_rest).unwrap());
    }
}
