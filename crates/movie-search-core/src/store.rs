use movie_search_models::is_valid_storage_key;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable string-key/string-value storage surviving restarts
pub trait StoragePort: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

fn validate_key(key: &str) -> Result<(), StorageError> {
    if is_valid_storage_key(key) {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// One `<key>.json` file per key under a directory
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Creates the directory if it does not exist yet
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl StoragePort for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        // Atomic write: write to temp file, then rename
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, value)?;
        std::fs::rename(&temp_path, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local storage, shared between clones
#[derive(Clone, Default)]
pub struct MemoryStorage {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StoragePort for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        Ok(self.values().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.values().remove(key);
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize value for {key:?}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Write-through persistence for a single in-memory value. Seeded from a
/// [`StoragePort`] at startup; every mutation is flushed back before the new
/// value becomes visible.
pub struct PersistentStore<T> {
    storage: Arc<dyn StoragePort>,
    key: String,
    value: T,
}

impl<T> PersistentStore<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Seeds the value from `storage`, falling back to `default` when the key
    /// is absent, unreadable or does not parse. A payload that does not parse
    /// is copied to `<key>.bak` before it can be overwritten.
    pub fn load(storage: Arc<dyn StoragePort>, key: impl Into<String>, default: T) -> Self {
        let key = key.into();
        let value = match storage.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    info!(key = %key, bytes = raw.len(), "Loaded persisted value");
                    value
                }
                Err(e) => {
                    let backup = format!("{}.bak", key);
                    match storage.set(&backup, &raw) {
                        Ok(()) => warn!(key = %key, backup = %backup, error = %e, "Persisted value is corrupt, starting from default"),
                        Err(backup_err) => warn!(key = %key, error = %e, backup_error = %backup_err, "Persisted value is corrupt and could not be backed up, starting from default"),
                    }
                    default
                }
            },
            Ok(None) => {
                debug!(key = %key, "Nothing persisted yet, using default");
                default
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read persisted value, using default");
                default
            }
        };
        Self { storage, key, value }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Applies `update`, flushes the result and only then makes it visible.
    /// On a failed write the previous value stays in place.
    pub fn mutate<F>(&mut self, update: F) -> Result<&T, StoreError>
    where
        F: FnOnce(&T) -> T,
    {
        let next = update(&self.value);
        let serialized = serde_json::to_string(&next).map_err(|source| StoreError::Serialize {
            key: self.key.clone(),
            source,
        })?;
        self.storage.set(&self.key, &serialized)?;
        debug!(key = %self.key, bytes = serialized.len(), "Persisted value");
        self.value = next;
        Ok(&self.value)
    }

    /// Drops the durable copy and resets the in-memory value
    pub fn reset(&mut self, default: T) -> Result<(), StoreError> {
        self.storage.remove(&self.key)?;
        info!(key = %self.key, "Persisted value cleared");
        self.value = default;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct BrokenStorage;

    impl StoragePort for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full")))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn test_value_survives_restart() {
        let dir = TempDir::new().unwrap();
        {
            let storage: Arc<dyn StoragePort> = Arc::new(FileStorage::new(dir.path()).unwrap());
            let mut store = PersistentStore::load(storage, "watched", Vec::<u32>::new());
            store.mutate(|v| [v.as_slice(), &[1, 2]].concat()).unwrap();
        }
        let storage: Arc<dyn StoragePort> = Arc::new(FileStorage::new(dir.path()).unwrap());
        let store = PersistentStore::load(storage, "watched", Vec::<u32>::new());
        assert_eq!(store.get(), &vec![1, 2]);
        assert!(!dir.path().join("watched.json.tmp").exists());
    }

    #[test]
    fn test_durable_bytes_match_after_mutate() {
        let storage = MemoryStorage::new();
        let mut store = PersistentStore::load(Arc::new(storage.clone()), "n", 0u32);
        store.mutate(|n| n + 41).unwrap();
        store.mutate(|n| n + 1).unwrap();
        assert_eq!(storage.get("n").unwrap().as_deref(), Some("42"));
        assert_eq!(*store.get(), 42);
    }

    #[test]
    fn test_corrupt_payload_falls_back_and_is_backed_up() {
        let storage = MemoryStorage::new();
        storage.set("watched", "{not json").unwrap();
        let store = PersistentStore::load(Arc::new(storage.clone()), "watched", Vec::<u32>::new());
        assert!(store.get().is_empty());
        assert_eq!(storage.get("watched.bak").unwrap().as_deref(), Some("{not json"));
    }

    #[test]
    fn test_keys_are_independent() {
        let storage: Arc<dyn StoragePort> = Arc::new(MemoryStorage::new());
        let mut a = PersistentStore::load(storage.clone(), "a", String::new());
        let mut b = PersistentStore::load(storage.clone(), "b", String::new());
        a.mutate(|_| "left".to_string()).unwrap();
        b.mutate(|_| "right".to_string()).unwrap();

        let a = PersistentStore::load(storage.clone(), "a", String::new());
        assert_eq!(a.get(), "left");
    }

    #[test]
    fn test_failed_write_keeps_previous_value() {
        let mut store = PersistentStore::load(Arc::new(BrokenStorage), "watched", vec![1u32]);
        let result = store.mutate(|v| [v.as_slice(), &[2]].concat());
        assert!(matches!(result, Err(StoreError::Storage(StorageError::Io(_)))));
        assert_eq!(store.get(), &vec![1]);
    }

    #[test]
    fn test_invalid_keys_rejected() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        for key in ["", "../escape", ".hidden", "a/b"] {
            assert!(matches!(storage.set(key, "x"), Err(StorageError::InvalidKey(_))));
        }
        assert!(storage.get("missing").unwrap().is_none());
        storage.remove("missing").unwrap();
    }

    #[test]
    fn test_reset_clears_durable_copy() {
        let storage = MemoryStorage::new();
        let mut store = PersistentStore::load(Arc::new(storage.clone()), "k", 1u8);
        store.mutate(|_| 7).unwrap();
        store.reset(1).unwrap();
        assert_eq!(*store.get(), 1);
        assert!(storage.get("k").unwrap().is_none());
    }
}
