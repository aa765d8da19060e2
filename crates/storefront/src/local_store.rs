//! Durable per-user storage for cart and wishlist state.
//!
//! Each store keeps one serialized array per user under a key of the form
//! `<slot>_<uid>` (e.g. `wishlist_abc123`). There is no locking and no
//! cross-session coordination: the most recent write wins.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use storekeeper_core::UserId;

/// Errors raised by a [`LocalStore`].
#[derive(Debug, Error)]
pub enum LocalStoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Stored value could not be (de)serialized.
    #[error("Serialization error for key {key}: {source}")]
    Serde {
        /// Key whose value failed.
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// String key/value storage that survives the session.
pub trait LocalStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `LocalStoreError` if the backing storage cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, LocalStoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `LocalStoreError` if the backing storage cannot be written.
    fn save(&self, key: &str, value: &str) -> Result<(), LocalStoreError>;

    /// Delete the value under `key`. Absent keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns `LocalStoreError` if the backing storage cannot be written.
    fn remove(&self, key: &str) -> Result<(), LocalStoreError>;
}

/// A named per-user slot (`cart`, `wishlist`) in a [`LocalStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageSlot(&'static str);

impl StorageSlot {
    pub const CART: Self = Self("cart");
    pub const WISHLIST: Self = Self("wishlist");

    /// The storage key for `user`.
    #[must_use]
    pub fn key_for(self, user: &UserId) -> String {
        format!("{}_{user}", self.0)
    }

    /// Load the user's items; a missing entry is an empty list.
    ///
    /// # Errors
    ///
    /// Returns `LocalStoreError` if the entry cannot be read or decoded.
    pub fn load<T: DeserializeOwned>(
        self,
        store: &dyn LocalStore,
        user: &UserId,
    ) -> Result<Vec<T>, LocalStoreError> {
        let key = self.key_for(user);
        match store.load(&key)? {
            Some(raw) => {
                serde_json::from_str(&raw).map_err(|source| LocalStoreError::Serde { key, source })
            }
            None => Ok(Vec::new()),
        }
    }

    /// Persist the full list of the user's items.
    ///
    /// # Errors
    ///
    /// Returns `LocalStoreError` if the items cannot be encoded or written.
    pub fn save<T: Serialize>(
        self,
        store: &dyn LocalStore,
        user: &UserId,
        items: &[T],
    ) -> Result<(), LocalStoreError> {
        let key = self.key_for(user);
        let raw = serde_json::to_string(items).map_err(|source| LocalStoreError::Serde {
            key: key.clone(),
            source,
        })?;
        store.save(&key, &raw)
    }
}

// =============================================================================
// FileStore
// =============================================================================

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use `dir` as the storage directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `LocalStoreError::Io` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, LocalStoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| LocalStoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// The storage directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Percent-encoded so that distinct keys never share a file and no key
    /// can contain a path separator.
    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = url::form_urlencoded::byte_serialize(key.as_bytes()).collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl LocalStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(LocalStoreError::Io { path, source }),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        let path = self.path_for(key);
        // Write-then-rename so a crash never leaves a truncated file behind
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|source| LocalStoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| LocalStoreError::Io { path, source })
    }

    fn remove(&self, key: &str) -> Result<(), LocalStoreError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(LocalStoreError::Io { path, source }),
        }
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// Process-local storage, shared between sessions through an `Arc`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LocalStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), LocalStoreError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("storekeeper-test-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_slot_keys_are_user_scoped() {
        let user = UserId::new("abc123");
        assert_eq!(StorageSlot::WISHLIST.key_for(&user), "wishlist_abc123");
        assert_eq!(StorageSlot::CART.key_for(&user), "cart_abc123");
    }

    #[test]
    fn test_slot_missing_entry_is_empty() {
        let store = MemoryStore::new();
        let items: Vec<u32> = StorageSlot::CART.load(&store, &UserId::new("u")).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_slot_corrupt_entry_is_an_error() {
        let store = MemoryStore::new();
        store.save("cart_u", "{not json").unwrap();
        let err = StorageSlot::CART
            .load::<u32>(&store, &UserId::new("u"))
            .unwrap_err();
        assert!(matches!(err, LocalStoreError::Serde { ref key, .. } if key == "cart_u"));
    }

    #[test]
    fn test_file_store_roundtrip_and_remove() {
        let dir = temp_dir();
        let store = FileStore::open(&dir).unwrap();

        assert_eq!(store.load("wishlist_u1").unwrap(), None);
        store.save("wishlist_u1", "[1,2]").unwrap();
        assert_eq!(store.load("wishlist_u1").unwrap().as_deref(), Some("[1,2]"));

        store.save("wishlist_u1", "[3]").unwrap();
        assert_eq!(store.load("wishlist_u1").unwrap().as_deref(), Some("[3]"));

        store.remove("wishlist_u1").unwrap();
        store.remove("wishlist_u1").unwrap();
        assert_eq!(store.load("wishlist_u1").unwrap(), None);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_file_store_sanitizes_keys() {
        let store = FileStore::open(temp_dir()).unwrap();
        let path = store.path_for("cart_../../etc/passwd");
        assert_eq!(path.parent(), Some(store.dir()));
        fs::remove_dir_all(store.dir()).unwrap();
    }

    #[test]
    fn test_file_store_keeps_similar_users_apart() {
        let store = FileStore::open(temp_dir()).unwrap();
        let email = UserId::new("a@b.com");
        let lookalike = UserId::new("a_b.com");

        StorageSlot::CART.save(&store, &email, &[1, 2, 3]).unwrap();
        let other: Vec<u32> = StorageSlot::CART.load(&store, &lookalike).unwrap();
        assert!(other.is_empty());

        StorageSlot::CART.save(&store, &lookalike, &[9]).unwrap();
        let mine: Vec<u32> = StorageSlot::CART.load(&store, &email).unwrap();
        assert_eq!(mine, [1, 2, 3]);
        assert_ne!(
            store.path_for("cart_a b"),
            store.path_for("cart_a+b")
        );

        fs::remove_dir_all(store.dir()).unwrap();
    }
}
