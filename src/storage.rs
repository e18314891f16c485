//! The durable key-value store backing user preferences.
//!
//! Preferences live in a single flat JSON object on disk. Keys are plain
//! strings, values are plain strings; an overwrite is the only way to change
//! a value. There is no schema and no transaction — the stores layered above
//! treat any read problem as "value absent" and keep their defaults.

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::errors::Error;

/// An asynchronous, string-keyed, string-valued durable store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, or `None` if it was never written.
    async fn get(&self, key: &str) -> Result<Option<String>, Error>;
    /// Writes `value` under `key`, overwriting any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), Error>;
}

/// File-backed implementation writing a single `settings.json` under the
/// application data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    async fn read_map(&self) -> Result<BTreeMap<String, String>, Error> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&raw) {
            Ok(map) => Ok(map),
            Err(e) => {
                // A corrupt settings file is unrecoverable; start over rather
                // than refusing every write from here on.
                tracing::warn!(path = %self.path.display(), error = %e, "settings file unreadable, starting fresh");
                Ok(BTreeMap::new())
            }
        }
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let map = self.read_map().await?;
        Ok(map.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_string_pretty(&map)?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    //! In-memory store used by unit tests, with a switch to force write
    //! failures so persist-before-update ordering can be exercised.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Default)]
    pub struct MemoryStore {
        entries: Mutex<HashMap<String, String>>,
        fail_writes: Mutex<bool>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn fail_writes(&self, fail: bool) {
            *self.fail_writes.lock().unwrap() = fail;
        }

        pub fn insert_raw(&self, key: &str, value: &str) {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
        }
    }

    #[async_trait]
    impl KeyValueStore for MemoryStore {
        async fn get(&self, key: &str) -> Result<Option<String>, Error> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), Error> {
            if *self.fail_writes.lock().unwrap() {
                return Err(Error::Storage(io::Error::new(
                    io::ErrorKind::Other,
                    "simulated write failure",
                )));
            }
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::testing::MemoryStore;
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tandem-storage-{}-{}.json", std::process::id(), name))
    }

    #[tokio::test]
    async fn file_store_round_trips_values() {
        let store = FileStore::new(scratch_path("round-trip"));
        store.set("app_mode", "personal").await.unwrap();
        store.set("theme_mode", "light").await.unwrap();
        assert_eq!(
            store.get("app_mode").await.unwrap().as_deref(),
            Some("personal")
        );
        assert_eq!(
            store.get("theme_mode").await.unwrap().as_deref(),
            Some("light")
        );
    }

    #[tokio::test]
    async fn file_store_missing_file_reads_as_absent() {
        let store = FileStore::new(scratch_path("never-written"));
        assert_eq!(store.get("app_mode").await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_store_overwrite_replaces_value() {
        let store = FileStore::new(scratch_path("overwrite"));
        store.set("app_mode", "financial").await.unwrap();
        store.set("app_mode", "personal").await.unwrap();
        assert_eq!(
            store.get("app_mode").await.unwrap().as_deref(),
            Some("personal")
        );
    }

    #[tokio::test]
    async fn memory_store_write_failure_is_typed() {
        let store = MemoryStore::new();
        store.fail_writes(true);
        let err = store.set("app_mode", "personal").await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert_eq!(store.get("app_mode").await.unwrap(), None);
    }
}
