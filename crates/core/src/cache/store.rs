//! Persistence backends for the expiring cache.
//!
//! Stores deal in raw serialized documents; decoding (and treating a bad
//! document as a miss) is the cache's job.

use std::{
    collections::HashMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use parking_lot::Mutex;
use sbxctl_types::APP_NAME;
use tracing::debug;

use crate::error::{Result, SbxError};

/// Key-value persistence for cache entries
pub trait CacheStore: Send + Sync {
    /// Read the raw document stored under `key`, if any.
    fn load(&self, key: &str) -> Option<String>;

    /// Replace the document stored under `key`.
    fn save(&self, key: &str, document: &str) -> Result<()>;
}

/// One JSON file per key in a directory, surviving process restarts
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted in the user cache directory (`~/.cache/sbxctl` on Linux)
    pub fn in_user_cache_dir() -> Result<Self> {
        let base = dirs::cache_dir()
            .ok_or_else(|| SbxError::Store("Failed to get system cache directory".to_string()))?;
        Ok(Self::new(base.join(APP_NAME)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file_name}.json"))
    }

    fn write_atomically(&self, path: &Path, document: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let tmp = path.with_extension(format!("json.{}.tmp", std::process::id()));
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(document.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, path)
    }
}

impl CacheStore for FileStore {
    fn load(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(document) => Some(document),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                debug!(key, path = %path.display(), error = %e, "Ignoring unreadable cache file");
                None
            }
        }
    }

    fn save(&self, key: &str, document: &str) -> Result<()> {
        let path = self.path_for(key);
        self.write_atomically(&path, document)
            .map_err(|e| SbxError::Store(format!("Failed to write {}: {}", path.display(), e)))
    }
}

/// Process-local store, used for tests and `--no-cache`
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.documents.lock().get(key).cloned()
    }

    fn save(&self, key: &str, document: &str) -> Result<()> {
        self.documents
            .lock()
            .insert(key.to_string(), document.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_file_store_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("nested"));

        assert!(store.load("auth-token").is_none());
        store.save("auth-token", r#"{"value":"abc"}"#).unwrap();
        assert_eq!(
            store.load("auth-token").as_deref(),
            Some(r#"{"value":"abc"}"#)
        );

        // overwrite
        store.save("auth-token", r#"{"value":"def"}"#).unwrap();
        assert_eq!(
            store.load("auth-token").as_deref(),
            Some(r#"{"value":"def"}"#)
        );
        assert!(temp_dir.path().join("nested/auth-token.json").exists());
    }

    #[test]
    fn test_file_store_survives_new_instance() {
        let temp_dir = TempDir::new().unwrap();
        FileStore::new(temp_dir.path())
            .save("sandbox-list", "[]")
            .unwrap();

        let reopened = FileStore::new(temp_dir.path());
        assert_eq!(reopened.load("sandbox-list").as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_store_sanitizes_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());
        store.save("../escape", "x").unwrap();
        assert!(temp_dir.path().join("___escape.json").exists());
        assert_eq!(store.load("../escape").as_deref(), Some("x"));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.load("k").is_none());
        store.save("k", "v").unwrap();
        assert_eq!(store.load("k").as_deref(), Some("v"));
    }
}
