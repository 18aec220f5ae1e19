//! Key-value persistence
//!
//! Leaderboards and settings are stored as JSON strings under fixed keys.
//! On the web this is `window.localStorage`; natively and in tests an
//! in-memory map stands in for it.

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[cfg(target_arch = "wasm32")]
mod local;
#[cfg(target_arch = "wasm32")]
pub use local::LocalStore;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Minimal string key-value store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError>;
    fn remove(&mut self, key: &str) -> Result<(), PersistError>;
}

/// Read and decode a JSON value
///
/// Missing keys, storage failures and corrupt data all come back as `None`.
pub fn load_json<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("Could not read {key}: {e}");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Discarding corrupt data under {key}: {e}");
            None
        }
    }
}

/// Encode and write a JSON value
pub fn save_json<T: Serialize>(
    store: &mut impl KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), PersistError> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

/// In-memory store for native builds and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        self.entries.remove(key);
        Ok(())
    }
}
