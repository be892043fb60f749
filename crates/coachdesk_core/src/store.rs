//! crates/coachdesk_core/src/store.rs
//!
//! The typed read/write facade over the shared key-value space. Every
//! component goes through this facade exclusively; it is the single place
//! where persistence failures are caught, logged, and degraded, and the
//! single place where writes are announced on the change bus.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::ports::{ChangeBus, KeyValueStore, StoreKey};

/// Typed get/set wrapper over the durable key-value space.
///
/// Reads degrade to the caller-supplied default on a missing key or a
/// persistence failure; writes that fail are logged and dropped (no retry).
/// A successful write publishes the key on the change bus so every other
/// live session can invalidate its cache.
pub struct PersistedStore {
    backend: Arc<dyn KeyValueStore>,
    bus: Arc<dyn ChangeBus>,
}

impl PersistedStore {
    pub fn new(backend: Arc<dyn KeyValueStore>, bus: Arc<dyn ChangeBus>) -> Self {
        Self { backend, bus }
    }

    /// Reads and deserializes the collection under `key`. A missing key,
    /// an unavailable backend, or an unreadable payload all resolve to
    /// `T::default()`: the engine renders an empty collection rather
    /// than crashing.
    pub async fn read<T>(&self, key: StoreKey) -> T
    where
        T: DeserializeOwned + Default,
    {
        match self.backend.read_raw(key).await {
            Ok(Some(raw)) => match serde_json::from_value(raw) {
                Ok(value) => value,
                Err(e) => {
                    warn!(key = %key, error = %e, "unreadable collection, falling back to empty");
                    T::default()
                }
            },
            Ok(None) => T::default(),
            Err(e) => {
                warn!(key = %key, error = %e, "store read failed, falling back to empty");
                T::default()
            }
        }
    }

    /// Serializes and writes the collection under `key`, then announces
    /// the change. A failed write is logged and dropped; the mutation
    /// does not take effect until the next successful write. Returns
    /// whether the write reached the store, so callers can keep their
    /// caches in step with what was actually persisted.
    pub async fn write<T>(&self, key: StoreKey, value: &T) -> bool
    where
        T: Serialize,
    {
        let raw = match serde_json::to_value(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %key, error = %e, "failed to serialize collection, write dropped");
                return false;
            }
        };
        match self.backend.write_raw(key, raw).await {
            Ok(()) => {
                self.bus.publish(key);
                true
            }
            Err(e) => {
                warn!(key = %key, error = %e, "store write failed, mutation dropped");
                false
            }
        }
    }
}
