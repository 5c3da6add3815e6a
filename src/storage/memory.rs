use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::error::{OAuthError, Result};

use super::Storage;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

/// Thread-safe in-process store with per-entry expiry.
///
/// Suitable for CSRF state on a single-instance deployment and as a custom
/// secure store in tests; multi-instance deployments should put state in a
/// shared backend with read-your-writes consistency instead, since the
/// authorize redirect and its callback generally land on different
/// requests.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn live_value(entry: &Entry) -> Option<String> {
        match entry.expires_at {
            Some(expires_at) if Utc::now() >= expires_at => None,
            _ => Some(entry.value.clone()),
        }
    }
}

impl Storage for MemoryStorage {
    fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<()> {
        let expires_at = ttl.map(|secs| Utc::now() + Duration::seconds(secs as i64));
        self.entries
            .lock()
            .map_err(|_| OAuthError::Storage("storage lock poisoned".to_string()))?
            .insert(
                key.to_string(),
                Entry {
                    value: value.to_string(),
                    expires_at,
                },
            );
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| OAuthError::Storage("storage lock poisoned".to_string()))?;
        match entries.get(key) {
            Some(entry) => match Self::live_value(entry) {
                Some(value) => Ok(Some(value)),
                None => {
                    entries.remove(key);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    fn compare(&self, key: &str, value: &str) -> Result<bool> {
        Ok(self.get(key)?.as_deref() == Some(value))
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| OAuthError::Storage("storage lock poisoned".to_string()))?
            .remove(key);
        Ok(())
    }
}
