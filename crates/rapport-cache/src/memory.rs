//! In-process key-value store.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{CacheError, KeyValueStore};

/// Keeps values in a `HashMap`. Nothing survives the process.
///
/// Cheap to clone; clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `key` currently holds a value.
    pub async fn contains(&self, key: &str) -> bool {
        self.values.read().await.contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.values.write().await.remove(key);
        Ok(())
    }
}
