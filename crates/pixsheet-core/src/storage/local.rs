//! Browser `localStorage` backend for WebAssembly.

use super::{BoxFuture, Storage, StorageError, StorageResult};

/// Storage backed by `window.localStorage`.
///
/// Calls are synchronous in the browser; they are wrapped in ready futures
/// to satisfy the [`Storage`] trait.
#[derive(Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> StorageResult<web_sys::Storage> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Other("No window object".to_string()))?;
        window
            .local_storage()
            .map_err(|e| StorageError::Other(format!("localStorage error: {:?}", e)))?
            .ok_or_else(|| StorageError::Other("localStorage not available".to_string()))
    }
}

impl Storage for LocalStorage {
    fn save(&self, key: &str, content: &str) -> BoxFuture<'_, StorageResult<()>> {
        let result = Self::storage().and_then(|storage| {
            storage
                .set_item(key, content)
                .map_err(|e| StorageError::Io(format!("setItem failed: {:?}", e)))
        });
        Box::pin(async move { result })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<String>> {
        let key = key.to_string();
        let result = Self::storage().and_then(|storage| {
            storage
                .get_item(&key)
                .map_err(|e| StorageError::Io(format!("getItem failed: {:?}", e)))?
                .ok_or(StorageError::NotFound(key))
        });
        Box::pin(async move { result })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let result = Self::storage().and_then(|storage| {
            storage
                .remove_item(key)
                .map_err(|e| StorageError::Io(format!("removeItem failed: {:?}", e)))
        });
        Box::pin(async move { result })
    }

    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let result = Self::storage().and_then(|storage| {
            storage
                .get_item(key)
                .map(|item| item.is_some())
                .map_err(|e| StorageError::Io(format!("getItem failed: {:?}", e)))
        });
        Box::pin(async move { result })
    }
}
