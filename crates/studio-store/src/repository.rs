//! Local cache repository
//!
//! The cache is a single slot holding a JSON array of configurations. Every
//! mutation is a full read-modify-write-replace of that array with
//! upsert-by-id semantics. Entries keep their `persistenceState`, unlike
//! the wire form.
//!
//! Mutations hold a repository-wide lock from read to write-back, so
//! concurrent upserts of different ids never overwrite each other. Clones
//! share the lock.

use std::sync::Arc;

use parking_lot::Mutex;
use studio_model::{ChatbotId, Configuration};

use crate::error::StoreError;
use crate::slot::SlotStorage;

/// Default slot key
pub const DEFAULT_CACHE_KEY: &str = "chatbots";

/// Keyed collection of configurations over one slot
#[derive(Clone)]
pub struct LocalRepository {
    slot: Arc<dyn SlotStorage>,
    key: String,
    write_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for LocalRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalRepository")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl LocalRepository {
    /// Repository over `slot` using the default key
    #[must_use]
    pub fn new(slot: Arc<dyn SlotStorage>) -> Self {
        Self::with_key(slot, DEFAULT_CACHE_KEY)
    }

    /// Repository over `slot` using `key`
    #[must_use]
    pub fn with_key(slot: Arc<dyn SlotStorage>, key: impl Into<String>) -> Self {
        Self {
            slot,
            key: key.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Slot key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whole collection as stored, without migration
    ///
    /// # Errors
    /// Returns error if the slot cannot be read or does not hold an array
    /// of configurations
    pub fn load(&self) -> Result<Vec<Configuration>, StoreError> {
        let Some(text) = self.slot.read(&self.key).map_err(StoreError::LocalRead)? else {
            return Ok(Vec::new());
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&text).map_err(StoreError::LocalParse)
    }

    /// Single entry by id
    ///
    /// # Errors
    /// Returns error if the collection cannot be loaded
    pub fn get(&self, id: &ChatbotId) -> Result<Option<Configuration>, StoreError> {
        Ok(self.load()?.into_iter().find(|config| &config.id == id))
    }

    /// Replace the whole collection
    ///
    /// # Errors
    /// Returns [`StoreError::LocalWrite`] if the slot rejects the write
    pub fn replace_all(&self, configs: &[Configuration]) -> Result<(), StoreError> {
        let _lock = self.write_lock.lock();
        self.write(configs)
    }

    /// Read, change and write back the collection under the repository lock
    ///
    /// The slot is only written if `f` changed the collection.
    ///
    /// # Errors
    /// Returns error if the collection cannot be loaded or written back
    pub fn modify<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Vec<Configuration>) -> T,
    {
        let _lock = self.write_lock.lock();
        let before = self.load()?;
        let mut configs = before.clone();
        let result = f(&mut configs);
        if configs != before {
            self.write(&configs)?;
        }
        Ok(result)
    }

    /// Replace the entry with the same id, or append
    ///
    /// # Errors
    /// Returns error if the collection cannot be loaded or written back
    pub fn upsert(&self, config: &Configuration) -> Result<(), StoreError> {
        self.modify(|configs| {
            match configs.iter_mut().find(|existing| existing.id == config.id) {
                Some(existing) => existing.clone_from(config),
                None => configs.push(config.clone()),
            }
        })
    }

    /// Drop the entry with `id`; returns whether it existed
    ///
    /// # Errors
    /// Returns error if the collection cannot be loaded or written back
    pub fn remove(&self, id: &ChatbotId) -> Result<bool, StoreError> {
        self.modify(|configs| {
            let before = configs.len();
            configs.retain(|config| &config.id != id);
            configs.len() != before
        })
    }

    fn write(&self, configs: &[Configuration]) -> Result<(), StoreError> {
        let text = serde_json::to_string(configs).map_err(|e| StoreError::Model(e.into()))?;
        self.slot.write(&self.key, &text).map_err(|e| {
            tracing::error!(key = %self.key, error = %e, "local cache write failed");
            StoreError::LocalWrite(e)
        })
    }
}
