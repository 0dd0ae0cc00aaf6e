//! Latest-value store.
//!
//! One live `AssetRecord` per key, persisted as JSON. Same-key writes are
//! never concurrent (the commit substrate serializes them before the engine
//! applies anything), so no per-key locking happens here.

use crate::{keys, storage_error};
use std::sync::Arc;
use tracelink_core::{AssetKey, AssetRecord, LedgerError, Result};
use tracelink_persistence::KvStore;
use tracing::{debug, error};

/// Durable key → latest-value map
#[derive(Clone)]
pub struct WorldState {
    store: Arc<dyn KvStore>,
}

impl WorldState {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Unconditional upsert of the live value for a key
    pub fn put(&self, record: &AssetRecord) -> Result<()> {
        let bytes = serde_json::to_vec(record)?;
        self.store
            .put(&keys::state(&record.key), &bytes)
            .map_err(storage_error)?;
        debug!(key = %record.key, version = record.version, "world state updated");
        Ok(())
    }

    /// Gets the live value for a key.
    ///
    /// Absent keys are `NotFound`; a stored value that no longer decodes is
    /// a `Serialization` failure, which is a hard error on this path
    /// (unlike scans).
    pub fn get(&self, key: &AssetKey) -> Result<AssetRecord> {
        let bytes = self
            .store
            .get(&keys::state(key))
            .map_err(storage_error)?
            .ok_or_else(|| LedgerError::NotFound(key.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            LedgerError::Serialization(format!("stored value for {} is corrupt: {}", key, e))
        })
    }

    /// Checks if a key has a live value; storage failures are reported and
    /// read as absence so this probe itself never fails
    pub fn exists(&self, key: &AssetKey) -> bool {
        match self.store.contains(&keys::state(key)) {
            Ok(present) => present,
            Err(e) => {
                error!(key = %key, error = %e, "existence probe hit storage failure");
                false
            }
        }
    }

    /// Removes the live value for a key; absent keys are not an error
    pub fn delete(&self, key: &AssetKey) -> Result<()> {
        self.store.delete(&keys::state(key)).map_err(storage_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tracelink_core::{AssetPayload, ErrorKind, InventoryAsset};
    use tracelink_persistence::MemoryStore;

    fn world_state() -> (Arc<MemoryStore>, WorldState) {
        let store = Arc::new(MemoryStore::new());
        (Arc::clone(&store), WorldState::new(store))
    }

    fn record(key: &str, stock: i64) -> AssetRecord {
        AssetRecord::new(
            AssetKey::new(key).expect("valid key"),
            AssetPayload::Inventory(InventoryAsset::new("Raw Materials", stock, Utc::now())),
        )
    }

    #[test]
    fn test_get_absent_is_not_found() {
        let (_, state) = world_state();
        let key = AssetKey::new("ITEM001").expect("valid key");
        assert!(!state.exists(&key));
        let err = state.get(&key).expect_err("absent");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_put_then_get_roundtrip() {
        let (_, state) = world_state();
        let stored = record("ITEM001", 100);
        state.put(&stored).expect("put");

        let loaded = state.get(&stored.key).expect("get");
        assert_eq!(loaded, stored);
        assert!(state.exists(&stored.key));
    }

    #[test]
    fn test_put_is_upsert() {
        let (_, state) = world_state();
        state.put(&record("ITEM001", 100)).expect("put");
        state.put(&record("ITEM001", 250)).expect("overwrite");

        let loaded = state.get(&AssetKey::new("ITEM001").expect("valid key")).expect("get");
        match loaded.payload {
            AssetPayload::Inventory(item) => assert_eq!(item.current_stock, 250),
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_corrupt_value_is_serialization_error() {
        let (store, state) = world_state();
        let key = AssetKey::new("ITEM001").expect("valid key");
        store
            .put(&keys::state(&key), b"not json at all")
            .expect("raw put");

        let err = state.get(&key).expect_err("corrupt value");
        assert_eq!(err.kind(), ErrorKind::Serialization);
    }

    #[test]
    fn test_delete_removes_live_value() {
        let (_, state) = world_state();
        let stored = record("ITEM001", 100);
        state.put(&stored).expect("put");
        state.delete(&stored.key).expect("delete");
        assert!(!state.exists(&stored.key));
        state.delete(&stored.key).expect("delete absent");
    }
}
