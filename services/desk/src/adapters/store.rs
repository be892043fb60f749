//! services/desk/src/adapters/store.rs
//!
//! Concrete implementations of the `KeyValueStore` port: a JSON-file
//! store shared between sessions on the same machine, and an in-memory
//! store for tests and ephemeral runs.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::warn;

use coachdesk_core::ports::{KeyValueStore, PortError, PortResult, StoreKey};

//=========================================================================================
// JsonFileStore
//=========================================================================================

/// A `KeyValueStore` backed by a single JSON object file mapping store
/// keys to their collections.
///
/// Writes replace the whole file via a temp file and an atomic rename, so
/// a concurrent reader never observes a partial write. The internal mutex
/// serializes the read-modify-write of the file map, which makes each
/// single-key write atomic with respect to other writers in this process.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Loads the full key map. A missing file reads as empty; an
    /// unreadable file is logged and also reads as empty, so the next
    /// successful write starts the store fresh rather than wedging it.
    fn load_map(&self) -> PortResult<serde_json::Map<String, Value>> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(serde_json::Map::new())
            }
            Err(e) => {
                return Err(PortError::Unexpected(format!(
                    "failed to read store file {}: {e}",
                    self.path.display()
                )))
            }
        };
        match serde_json::from_slice::<Value>(&data) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => {
                warn!(path = %self.path.display(), "store file is not a JSON object, starting empty");
                Ok(serde_json::Map::new())
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "store file is corrupt, starting empty");
                Ok(serde_json::Map::new())
            }
        }
    }

    fn persist_map(&self, map: &serde_json::Map<String, Value>) -> PortResult<()> {
        let data = serde_json::to_vec_pretty(map)
            .map_err(|e| PortError::Unexpected(format!("failed to encode store file: {e}")))?;
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
            PortError::Unexpected(format!("failed to create temp file in {}: {e}", dir.display()))
        })?;
        std::fs::write(temp.path(), data)
            .map_err(|e| PortError::Unexpected(format!("failed to write store temp file: {e}")))?;
        temp.persist(&self.path).map_err(|e| {
            PortError::Unexpected(format!(
                "failed to persist store to {}: {e}",
                self.path.display()
            ))
        })?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn read_raw(&self, key: StoreKey) -> PortResult<Option<Value>> {
        let _guard = self.lock.lock().await;
        Ok(self.load_map()?.remove(key.as_str()))
    }

    async fn write_raw(&self, key: StoreKey, value: Value) -> PortResult<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.load_map()?;
        map.insert(key.as_str().to_string(), value);
        self.persist_map(&map)
    }
}

//=========================================================================================
// MemoryStore
//=========================================================================================

/// A `KeyValueStore` held entirely in memory. Used by the test harness
/// and useful for ephemeral runs where durability does not matter.
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<StoreKey, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn read_raw(&self, key: StoreKey) -> PortResult<Option<Value>> {
        Ok(self.map.lock().await.get(&key).cloned())
    }

    async fn write_raw(&self, key: StoreKey, value: Value) -> PortResult<()> {
        self.map.lock().await.insert(key, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::new(dir.path().join("store.json"));
        let value = store.read_raw(StoreKey::SupportTickets).await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn written_value_reads_back_and_keys_stay_independent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::new(dir.path().join("store.json"));

        store
            .write_raw(StoreKey::SupportTickets, json!([{"id": 1}]))
            .await
            .unwrap();
        store
            .write_raw(StoreKey::ManagementNotifications, json!([]))
            .await
            .unwrap();

        let tickets = store.read_raw(StoreKey::SupportTickets).await.unwrap();
        assert_eq!(tickets, Some(json!([{"id": 1}])));
        let messages = store
            .read_raw(StoreKey::StudentSupportMessages)
            .await
            .unwrap();
        assert!(messages.is_none());
    }

    #[tokio::test]
    async fn corrupt_file_degrades_to_empty_instead_of_failing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("store.json");
        std::fs::write(&path, b"{not json").unwrap();

        let store = JsonFileStore::new(&path);
        let value = store.read_raw(StoreKey::SupportTickets).await.unwrap();
        assert!(value.is_none());

        // The next write starts the store fresh.
        store
            .write_raw(StoreKey::SupportTickets, json!([]))
            .await
            .unwrap();
        let value = store.read_raw(StoreKey::SupportTickets).await.unwrap();
        assert_eq!(value, Some(json!([])));
    }

    #[tokio::test]
    async fn memory_store_round_trips() {
        let store = MemoryStore::new();
        store
            .write_raw(StoreKey::StudentSupportMessages, json!([{"id": "m1"}]))
            .await
            .unwrap();
        let value = store
            .read_raw(StoreKey::StudentSupportMessages)
            .await
            .unwrap();
        assert_eq!(value, Some(json!([{"id": "m1"}])));
    }
}
