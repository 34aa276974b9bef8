//! Key-value persistence for the storefront.
//!
//! Every entity is stored as a JSON text blob under an application-chosen
//! key, the same way a browser profile's local storage would hold it. There
//! is no schema versioning: a blob that no longer parses is deleted and the
//! caller falls back to its documented default.
//!
//! # Backends
//!
//! - [`MemoryStore`] - process-local map, used by tests and throwaway sessions
//! - [`FileStore`] - one JSON document per profile on disk, rewritten on every mutation

mod file;
mod memory;

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized to JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A writer panicked while holding the store lock.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// A synchronous string key-value store.
///
/// Implementations must apply each mutation before returning; there are no
/// transactions and the last writer wins.
pub trait KeyValueStore: Send + Sync {
    /// Get the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// List every key currently stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Typed handle over a [`KeyValueStore`].
///
/// Cheaply cloneable via `Arc`; all repositories borrow one of these.
#[derive(Clone)]
pub struct Storage {
    inner: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

impl Storage {
    /// Wrap an arbitrary backend.
    #[must_use]
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Create a storage handle backed by a fresh [`MemoryStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Open (or create) a file-backed profile at `path`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the file exists but cannot be read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Ok(Self::new(FileStore::open(path)?))
    }

    /// Load and deserialize the value under `key`.
    ///
    /// A value that fails to parse is treated as corrupted: it is logged,
    /// removed from the store, and reported as absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only if the backend itself fails.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.inner.get(key)? else {
            debug!(key, "storage key absent");
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key, error = %e, "discarding corrupted storage value");
                self.inner.remove(key)?;
                Ok(None)
            }
        }
    }

    /// Load the value under `key`, falling back to `T::default()`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only if the backend itself fails.
    pub fn load_or_default<T: DeserializeOwned + Default>(
        &self,
        key: &str,
    ) -> Result<T, StorageError> {
        Ok(self.load(key)?.unwrap_or_default())
    }

    /// Serialize `value` and store it under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if serialization or the backend write fails.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)?;
        self.inner.set(key, raw)
    }

    /// Remove the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend write fails.
    pub fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }

    /// Whether a value (parseable or not) exists under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub fn contains(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.inner.get(key)?.is_some())
    }

    /// Raw string access, bypassing JSON decoding.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    /// Raw string write, bypassing JSON encoding.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub fn set_raw(&self, key: &str, value: impl Into<String>) -> Result<(), StorageError> {
        self.inner.set(key, value.into())
    }

    /// All keys currently stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.inner.keys()
    }
}
