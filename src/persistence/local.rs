//! `window.localStorage` backend

use super::{KeyValueStore, PersistError};

/// LocalStorage-backed store (scoped per browser profile)
pub struct LocalStore {
    storage: Option<web_sys::Storage>,
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalStore {
    pub fn new() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if storage.is_none() {
            log::warn!("LocalStorage unavailable - progress will not be saved");
        }
        Self { storage }
    }

    fn storage(&self) -> Result<&web_sys::Storage, PersistError> {
        self.storage.as_ref().ok_or(PersistError::Unavailable)
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        self.storage()?
            .get_item(key)
            .map_err(|e| PersistError::Backend(format!("{e:?}")))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| PersistError::Backend(format!("{e:?}")))
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        self.storage()?
            .remove_item(key)
            .map_err(|e| PersistError::Backend(format!("{e:?}")))
    }
}
