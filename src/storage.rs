//! Storage
//!
//! Durable key-value storage backing the cart and session state. Values are whole JSON documents;
//! every write replaces the previous value for the key.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use rustc_hash::FxHashMap;
use thiserror::Error;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage io error: {0}")]
    Io(#[from] io::Error),

    /// The backend refused the write because it is full.
    #[error("storage quota exceeded")]
    QuotaExceeded,

    /// The key cannot be mapped onto the backend.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// Whole-value key-value storage.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend could not be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend rejected the write.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend could not be updated.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// In-memory storage.
///
/// Clones share the same entries, so two stores built from clones of one `MemoryStore` see each
/// other's writes the way two page views share one browser storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<FxHashMap<String, String>>>,
    reject_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` fail with [`StorageError::QuotaExceeded`].
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::Relaxed);
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, FxHashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.reject_writes.load(Ordering::Relaxed) {
            return Err(StorageError::QuotaExceeded);
        }

        self.entries().insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);

        Ok(())
    }
}

/// File-backed storage: one `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a storage directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();

        fs::create_dir_all(&dir)?;

        Ok(Self { dir })
    }

    /// Directory holding the stored values.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let staging = path.with_extension("json.tmp");

        // Rename is atomic on the same filesystem, so readers never see a half-written value.
        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn memory_store_clones_share_entries() -> TestResult {
        let store = MemoryStore::new();
        let other = store.clone();

        store.set("cart", "[]")?;

        assert_eq!(other.get("cart")?.as_deref(), Some("[]"));

        Ok(())
    }

    #[test]
    fn memory_store_rejects_writes_when_asked() -> TestResult {
        let store = MemoryStore::new();

        store.set("cart", "[]")?;
        store.reject_writes(true);

        assert!(matches!(
            store.set("cart", "[1]"),
            Err(StorageError::QuotaExceeded)
        ));
        assert_eq!(store.get("cart")?.as_deref(), Some("[]"));

        Ok(())
    }

    #[test]
    fn memory_store_remove_missing_key_is_ok() -> TestResult {
        let store = MemoryStore::new();

        store.remove("missing")?;

        assert_eq!(store.get("missing")?, None);

        Ok(())
    }

    #[test]
    fn file_store_round_trips_values() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = FileStore::open(dir.path())?;

        store.set("cart", r#"[{"id":1}]"#)?;

        let reopened = FileStore::open(dir.path())?;

        assert_eq!(reopened.get("cart")?.as_deref(), Some(r#"[{"id":1}]"#));
        assert!(!dir.path().join("cart.json.tmp").exists());

        Ok(())
    }

    #[test]
    fn file_store_missing_key_reads_none() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = FileStore::open(dir.path())?;

        assert_eq!(store.get("user")?, None);

        store.remove("user")?;

        Ok(())
    }

    #[test]
    fn file_store_rejects_path_like_keys() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = FileStore::open(dir.path())?;

        let result = store.set("../escape", "x");

        assert!(matches!(result, Err(StorageError::InvalidKey(key)) if key == "../escape"));

        Ok(())
    }
}
