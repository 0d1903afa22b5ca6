use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::CacheStore;
use crate::errors::{Error, Result};

const CURRENT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Default)]
struct CacheDocument {
    version: u32,
    entries: HashMap<String, Value>,
}

/// Cache store persisted as a single JSON document.
///
/// Every write rewrites the whole document into a sibling temp file and
/// renames it over the old one, so readers never see a partial document.
/// A missing, empty or corrupt file reads as an empty cache.
#[derive(Debug)]
pub struct FileCacheStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn load_locked(&self) -> Result<HashMap<String, Value>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let raw = fs::read(&self.path)?;
        if raw.is_empty() {
            return Ok(HashMap::new());
        }

        let document: CacheDocument = serde_json::from_slice(&raw)?;
        if document.version != CURRENT_VERSION {
            return Err(Error::Storage(format!(
                "unsupported cache version {}",
                document.version
            )));
        }
        Ok(document.entries)
    }

    fn persist_locked(&self, entries: HashMap<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let document = CacheDocument {
            version: CURRENT_VERSION,
            entries,
        };
        let json = serde_json::to_vec(&document)?;
        let temp = self.temp_path();
        fs::write(&temp, json)?;
        if let Err(e) = fs::rename(&temp, &self.path) {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }
        Ok(())
    }

    fn try_write(&self, key: &str, value: &Value) -> Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::Storage("cache lock poisoned".into()))?;
        // A corrupt document is replaced rather than blocking every future write.
        let mut entries = self.load_locked().unwrap_or_default();
        entries.insert(key.to_string(), value.clone());
        self.persist_locked(entries)
    }

    fn try_read(&self, key: &str) -> Result<Option<Value>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::Storage("cache lock poisoned".into()))?;
        Ok(self.load_locked()?.remove(key))
    }
}

impl CacheStore for FileCacheStore {
    fn read(&self, key: &str) -> Option<Value> {
        match self.try_read(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Cache read failed for '{}' ({}): {}", key, self.path.display(), e);
                None
            }
        }
    }

    fn write(&self, key: &str, value: &Value) {
        if let Err(e) = self.try_write(key, value) {
            warn!("Cache write failed for '{}' ({}): {}", key, self.path.display(), e);
        }
    }
}
