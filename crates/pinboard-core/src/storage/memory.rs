//! In-memory storage implementation.

use super::{Storage, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_write_read() {
        let storage = MemoryStorage::new();
        storage.write("pins", "[]").unwrap();
        assert_eq!(storage.read("pins").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_memory_storage_missing_key() {
        let storage = MemoryStorage::new();
        assert!(storage.read("nonexistent").unwrap().is_none());
    }

    #[test]
    fn test_memory_storage_remove() {
        let storage = MemoryStorage::new();
        storage.write("pins", "[]").unwrap();
        storage.remove("pins").unwrap();
        assert!(storage.is_empty());
        // Removing again is fine.
        storage.remove("pins").unwrap();
    }

    #[test]
    fn test_boxed_storage_delegates() {
        let storage: Box<dyn Storage> = Box::new(MemoryStorage::new());
        storage.write("a", "1").unwrap();
        assert_eq!(storage.read("a").unwrap().as_deref(), Some("1"));
    }
}
