use std::collections::HashMap;
use std::sync::Mutex;

use log::warn;
use serde_json::Value;

use super::CacheStore;

/// In-process cache store.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryCacheStore {
    fn read(&self, key: &str) -> Option<Value> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn write(&self, key: &str, value: &Value) {
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(key.to_string(), value.clone());
            }
            Err(_) => warn!("Memory cache lock poisoned, dropping write for '{}'", key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_last_write_wins() {
        let store = MemoryCacheStore::new();
        store.write("a", &json!(1));
        store.write("a", &json!(2));
        assert_eq!(store.read("a"), Some(json!(2)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_miss() {
        let store = MemoryCacheStore::new();
        assert!(store.read("missing").is_none());
        assert!(store.is_empty());
    }
}
