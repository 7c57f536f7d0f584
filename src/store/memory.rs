use crate::error::Result;
use crate::store::CacheStore;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// In-memory store, used by tests in place of [`JsonFileStore`].
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        let map = self.inner.read().unwrap();
        let value = map.get(key).cloned();
        if value.is_some() {
            debug!("Memory store HIT: {key}");
        } else {
            debug!("Memory store MISS: {key}");
        }
        value
    }

    fn put(&self, key: &str, payload: &Value) -> Result<()> {
        let mut map = self.inner.write().unwrap();
        debug!("Memory store PUT: {key}");
        map.insert(key.to_string(), payload.clone());
        Ok(())
    }
}
