// Lossy key/value persistence with an in-memory fallback

use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

use crate::errors::PersistenceError;

pub mod file;

pub use file::FileBackend;

/// Raw string storage addressed by key, the shape of browser local storage.
pub trait KeyValueBackend: Send + Sync + fmt::Debug {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
    fn remove(&self, key: &str) -> Result<(), PersistenceError>;
    fn keys(&self) -> Result<Vec<String>, PersistenceError>;
}

pub(crate) fn check_quota(
    key: &str,
    value: &str,
    quota: Option<usize>,
) -> Result<(), PersistenceError> {
    match quota {
        Some(quota) if value.len() > quota => Err(PersistenceError::QuotaExceeded {
            key: key.to_string(),
            size: value.len(),
            quota,
        }),
        _ => Ok(()),
    }
}

// In-memory backend, also the fallback when no durable store is configured
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    store: Arc<RwLock<HashMap<String, String>>>,
    quota_bytes: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects any single value larger than `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            store: Arc::default(),
            quota_bytes: Some(quota_bytes),
        }
    }

    fn poisoned() -> PersistenceError {
        PersistenceError::Unavailable("memory store lock poisoned".to_string())
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let store = self.store.read().map_err(|_| Self::poisoned())?;
        Ok(store.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        check_quota(key, value, self.quota_bytes)?;
        let mut store = self.store.write().map_err(|_| Self::poisoned())?;
        store.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let mut store = self.store.write().map_err(|_| Self::poisoned())?;
        store.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, PersistenceError> {
        let store = self.store.read().map_err(|_| Self::poisoned())?;
        let mut keys: Vec<String> = store.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

/// JSON persistence over a backend with never-failing `load`/`save`.
///
/// No cross-process coordination: concurrent writers to one key are last
/// write wins.
#[derive(Debug, Clone)]
pub struct Persistence {
    backend: Arc<dyn KeyValueBackend>,
}

impl Default for Persistence {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl Persistence {
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    pub fn backend(&self) -> &Arc<dyn KeyValueBackend> {
        &self.backend
    }

    /// Stored value for `key`, or `fallback` when the key is absent, the
    /// backend fails, or the payload does not parse.
    pub fn load<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        match self.try_load(key) {
            Ok(Some(value)) => value,
            Ok(None) => fallback,
            Err(err) => {
                warn!(key, error = %err, "Falling back after failed load");
                fallback
            }
        }
    }

    pub fn try_load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PersistenceError> {
        match self.backend.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Read ahead of a rewrite. An absent key or a payload that does not
    /// parse yields `T::default()`; a backend failure is returned so the
    /// caller never overwrites rows it could not read.
    pub fn load_for_update<T>(&self, key: &str) -> Result<T, PersistenceError>
    where
        T: DeserializeOwned + Default,
    {
        match self.try_load(key) {
            Ok(value) => Ok(value.unwrap_or_default()),
            Err(PersistenceError::Serialization(err)) => {
                warn!(key, error = %err, "Replacing unreadable payload");
                Ok(T::default())
            }
            Err(err) => Err(err),
        }
    }

    /// Best-effort write. Serialization, quota and I/O failures are logged
    /// and dropped.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(err) = self.try_save(key, value) {
            warn!(key, error = %err, "Dropped failed save");
        }
    }

    pub fn try_save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), PersistenceError> {
        let payload = serde_json::to_string(value)?;
        self.write_raw(key, &payload)
    }

    pub fn write_raw(&self, key: &str, payload: &str) -> Result<(), PersistenceError> {
        self.backend.set(key, payload)?;
        debug!(key, bytes = payload.len(), "Persisted value");
        Ok(())
    }

    pub fn remove(&self, key: &str) {
        if let Err(err) = self.backend.remove(key) {
            warn!(key, error = %err, "Dropped failed remove");
        }
    }
}
