//! Single-key string slots backing the local cache
//!
//! A slot holds one serialized document per key. There is no partial-key
//! API: callers read and write whole values.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;

use crate::error::SlotError;

/// String-keyed storage for whole documents
pub trait SlotStorage: Send + Sync {
    /// Read the value under `key`, `None` if never written
    ///
    /// # Errors
    /// Returns error if the backing storage cannot be read
    fn read(&self, key: &str) -> Result<Option<String>, SlotError>;

    /// Replace the value under `key`
    ///
    /// # Errors
    /// Returns error if the value could not be stored; the previous value
    /// is left intact
    fn write(&self, key: &str, value: &str) -> Result<(), SlotError>;
}

/// In-process slot storage
#[derive(Debug, Default)]
pub struct MemorySlot {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySlot {
    /// Empty storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with one value
    #[must_use]
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        let slot = Self::new();
        slot.values.write().insert(key.into(), value.into());
        slot
    }
}

impl SlotStorage for MemorySlot {
    fn read(&self, key: &str) -> Result<Option<String>, SlotError> {
        Ok(self.values.read().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SlotError> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON file per key under a directory
///
/// Writes go to a temporary sibling that is synced and renamed over the
/// target, so a crash never leaves a half-written cache.
#[derive(Debug, Clone)]
pub struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    /// Slots stored under `dir`, created on first write
    #[inline]
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the slot files
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SlotStorage for FileSlot {
    fn read(&self, key: &str) -> Result<Option<String>, SlotError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SlotError::Io { path, source }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SlotError> {
        let path = self.path_for(key);
        fs::create_dir_all(&self.dir).map_err(|source| SlotError::Io {
            path: self.dir.clone(),
            source,
        })?;
        atomic_write(&path, value.as_bytes()).map_err(|source| SlotError::Io { path, source })
    }
}

fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| std::io::Error::other("path has no parent"))?;
    let tmp_path = parent.join(format!(
        ".{}.tmp-{}-{}",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("slot"),
        std::process::id(),
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0),
    ));

    {
        let mut file = fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&tmp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
    }

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_slot_roundtrip() {
        let slot = MemorySlot::new();
        assert_eq!(slot.read("chatbots").unwrap(), None);
        slot.write("chatbots", "[]").unwrap();
        assert_eq!(slot.read("chatbots").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn file_slot_missing_key_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new(dir.path().join("cache"));
        assert_eq!(slot.read("chatbots").unwrap(), None);
    }

    #[test]
    fn file_slot_replaces_whole_value() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new(dir.path().join("cache"));
        slot.write("chatbots", r#"[{"a":1}]"#).unwrap();
        slot.write("chatbots", "[]").unwrap();

        assert_eq!(slot.read("chatbots").unwrap().as_deref(), Some("[]"));
        let leftovers: Vec<_> = fs::read_dir(slot.dir())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp-"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
