//! Mirrors the pin list to a [`Storage`] backend under one namespaced key.
//!
//! Nothing is written until [`Persistence::load`] has run, so an empty
//! store at startup can never clobber pins saved by an earlier session.

use super::{Storage, StorageError, StorageResult};
use crate::pin::Pin;
use crate::store::PinStore;

pub struct Persistence<S: Storage> {
    storage: S,
    key: String,
    loaded: bool,
    /// Store revision last written (or attempted).
    saved_revision: Option<u64>,
}

impl<S: Storage> Persistence<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            loaded: false,
            saved_revision: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Whether the initial load has happened; saves are refused before it.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Read the saved pins.
    ///
    /// Missing, unreadable, or corrupt data all yield an empty list.
    pub fn load(&mut self) -> Vec<Pin> {
        self.loaded = true;
        let raw = match self.storage.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("Could not read saved pins: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Pin>>(&raw) {
            Ok(pins) => pins,
            Err(e) => {
                log::warn!("Ignoring corrupt saved pins under '{}': {}", self.key, e);
                Vec::new()
            }
        }
    }

    /// Write the pins, or remove the entry when there are none.
    pub fn save(&mut self, pins: &[Pin]) -> StorageResult<()> {
        if !self.loaded {
            log::debug!("Skipping save before initial load");
            return Ok(());
        }
        if pins.is_empty() {
            return self.storage.remove(&self.key);
        }
        let json = serde_json::to_string(pins)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.storage.write(&self.key, &json)
    }

    /// Save the store if it changed since the last save.
    ///
    /// Returns true when a write succeeded. A failed write is logged and not
    /// retried until the store changes again.
    pub fn sync(&mut self, store: &PinStore) -> bool {
        if !self.loaded || self.saved_revision == Some(store.revision()) {
            return false;
        }
        self.saved_revision = Some(store.revision());
        match self.save(store.pins()) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to save pins: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pin::LatLng;
    use crate::storage::MemoryStorage;
    use crate::store::GeocodeCompletion;

    const KEY: &str = "map-pinboard-pins";

    #[test]
    fn test_no_save_before_load() {
        let storage = MemoryStorage::new();
        storage.write(KEY, "[]").unwrap();
        let mut persistence = Persistence::new(storage, KEY);

        let mut store = PinStore::new();
        store.create(LatLng::new(1.0, 2.0));
        assert!(!persistence.sync(&store));
        persistence.save(store.pins()).unwrap();
        assert_eq!(persistence.storage().read(KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let mut persistence = Persistence::new(MemoryStorage::new(), KEY);
        assert!(persistence.load().is_empty());

        let mut store = PinStore::new();
        let request = store.create(LatLng::new(40.5, -74.25));
        store.apply_geocode(&GeocodeCompletion::new(&request, "123 Main St"));
        store.create(LatLng::new(-37.75, 144.5));
        assert!(persistence.sync(&store));

        let loaded = persistence.load();
        assert_eq!(loaded, store.pins());
    }

    #[test]
    fn test_sync_skips_unchanged_revision() {
        let mut persistence = Persistence::new(MemoryStorage::new(), KEY);
        persistence.load();
        let mut store = PinStore::new();
        store.create(LatLng::new(0.0, 0.0));

        assert!(persistence.sync(&store));
        assert!(!persistence.sync(&store));
    }

    #[test]
    fn test_corrupt_data_loads_empty() {
        let storage = MemoryStorage::new();
        storage.write(KEY, "{not json").unwrap();
        let mut persistence = Persistence::new(storage, KEY);
        assert!(persistence.load().is_empty());
        assert!(persistence.is_loaded());
    }

    #[test]
    fn test_wrong_shape_loads_empty() {
        let storage = MemoryStorage::new();
        storage.write(KEY, r#"[{"id":"x","latitude":1}]"#).unwrap();
        let mut persistence = Persistence::new(storage, KEY);
        assert!(persistence.load().is_empty());
    }

    #[test]
    fn test_clear_removes_entry() {
        let mut persistence = Persistence::new(MemoryStorage::new(), KEY);
        persistence.load();
        let mut store = PinStore::new();
        store.create(LatLng::new(0.0, 0.0));
        persistence.sync(&store);
        assert!(persistence.storage().read(KEY).unwrap().is_some());

        store.clear();
        persistence.sync(&store);
        assert!(persistence.storage().read(KEY).unwrap().is_none());
        assert!(persistence.load().is_empty());
        assert!(persistence.load().is_empty());
    }
}
