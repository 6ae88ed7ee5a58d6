//! Browser `localStorage` backend for WASM.

use super::{Storage, StorageError, StorageResult};
use wasm_bindgen::JsValue;

fn js_error(e: JsValue) -> StorageError {
    StorageError::Other(format!("{:?}", e))
}

/// Storage backed by `window.localStorage`.
pub struct LocalStorage {
    inner: web_sys::Storage,
}

impl LocalStorage {
    /// Open the window's local storage.
    ///
    /// Fails when there is no window or the browser denies access (e.g.
    /// storage disabled in private browsing).
    pub fn new() -> StorageResult<Self> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("No window".to_string()))?;
        let inner = window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(format!("{:?}", e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage disabled".to_string()))?;
        Ok(Self { inner })
    }
}

impl Storage for LocalStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get_item(key).map_err(js_error)
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        // Quota errors land here.
        self.inner.set_item(key, value).map_err(js_error)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.inner.remove_item(key).map_err(js_error)
    }
}
