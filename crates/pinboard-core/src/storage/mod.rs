//! Storage abstraction for persistence.

mod memory;
mod persistence;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod local;

pub use memory::MemoryStorage;
pub use persistence::Persistence;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Entry not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// A durable key-value store holding text values.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    /// Read the value under `key`, or `None` if nothing is stored.
    fn read(&self, key: &str) -> StorageResult<Option<String>>;

    /// Replace the value under `key`.
    fn write(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// A durable key-value store (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    /// Read the value under `key`, or `None` if nothing is stored.
    fn read(&self, key: &str) -> StorageResult<Option<String>>;

    /// Replace the value under `key`.
    fn write(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

impl<S: Storage + ?Sized> Storage for &S {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

/// Storage picked for the current platform at startup.
pub type PlatformStorage = Box<dyn Storage>;

/// Create the platform storage backend.
///
/// If the durable backend can't be opened the app still runs, with pins kept
/// for this session only.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_storage() -> PlatformStorage {
    match FileStorage::default_location() {
        Ok(storage) => {
            log::info!("Storing pins in {}", storage.base_path().display());
            Box::new(storage)
        }
        Err(e) => {
            log::error!("Falling back to in-memory storage: {}", e);
            Box::new(MemoryStorage::new())
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub fn create_default_storage() -> PlatformStorage {
    match LocalStorage::new() {
        Ok(storage) => Box::new(storage),
        Err(e) => {
            log::error!("Falling back to in-memory storage: {}", e);
            Box::new(MemoryStorage::new())
        }
    }
}
