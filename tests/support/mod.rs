#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokengate::config::StaticConfig;
use tokengate::encryption::{CipherEncryption, Encryption};
use tokengate::error::Result;
use tokengate::storage::{CookieJar, MemoryStorage, SecureStorage};

/// Config pointing at a wiremock server.
pub fn test_config(server_uri: &str) -> Arc<StaticConfig> {
    Arc::new(StaticConfig {
        client_id: "abc".to_string(),
        client_secret: "shhh".to_string(),
        client_credentials_token: "client-creds-token".to_string(),
        auth_server_host: server_uri.to_string(),
        client_app_url: "https://app.example.org".to_string(),
        auth_code_callback_url: "https://proxy.example.org/callback".to_string(),
        cookie_domain: None,
        cookie_key_prefix: String::new(),
        encryption_salt: "integration-test-salt".to_string(),
    })
}

/// Salted encryption provider ready for use.
pub fn encryption() -> Arc<dyn Encryption> {
    let enc = CipherEncryption::new();
    enc.set_salt("integration-test-salt").expect("set salt");
    Arc::new(enc)
}

/// A custom secure store plus a handle for seeding and asserting on it.
pub fn secure_memory() -> (Arc<MemoryStorage>, SecureStorage) {
    let memory = Arc::new(MemoryStorage::new());
    let secure = SecureStorage::custom(memory.clone());
    (memory, secure)
}

/// In-memory cookie jar fake, recording exactly what the storage layers
/// hand it.
#[derive(Default)]
pub struct MemoryCookieJar {
    cookies: Mutex<HashMap<String, String>>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value as it would go over the wire.
    pub fn raw(&self, name: &str) -> Option<String> {
        self.cookies.lock().expect("jar lock poisoned").get(name).cloned()
    }
}

impl CookieJar for MemoryCookieJar {
    fn set_cookie(
        &self,
        name: &str,
        value: &str,
        _max_age: Option<u64>,
        _domain: Option<&str>,
    ) -> Result<()> {
        self.cookies
            .lock()
            .expect("jar lock poisoned")
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn get_cookie(&self, name: &str) -> Result<Option<String>> {
        Ok(self.raw(name))
    }

    fn remove_cookie(&self, name: &str, _domain: Option<&str>) -> Result<()> {
        self.cookies.lock().expect("jar lock poisoned").remove(name);
        Ok(())
    }
}

/// A valid `POST /token` response body.
pub fn token_response(refresh_token: Option<&str>) -> serde_json::Value {
    let mut body = serde_json::json!({
        "access_token": "fresh-access-token",
        "token_type": "Bearer",
        "expires_in": 3600,
    });
    if let Some(refresh_token) = refresh_token {
        body["refresh_token"] = serde_json::Value::from(refresh_token);
    }
    body
}
