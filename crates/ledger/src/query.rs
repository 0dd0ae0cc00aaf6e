//! World-state scans.
//!
//! Full and prefix/type scans over the latest values. Entries are yielded
//! lazily in store-native key order; a value that fails to decode comes back
//! raw with the parse error attached instead of aborting the scan. The
//! underlying cursor is released when the `Scan` drops, however iteration
//! ends.

use crate::{keys, storage_error};
use std::sync::Arc;
use tracelink_core::{AssetRecord, Result};
use tracelink_persistence::{KvIter, KvStore, SeekDirection};

/// Scan and prefix search over world state
#[derive(Clone)]
pub struct QueryEngine {
    store: Arc<dyn KvStore>,
}

impl QueryEngine {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Scans every live (key, value) pair in store-native key order
    pub fn scan_all(&self) -> Scan<'_> {
        Scan {
            inner: self
                .store
                .find(Some(keys::state_prefix().as_slice()), SeekDirection::Forward),
        }
    }

    /// Scans only keys under a type tag (`^tag_.*`), same order as `scan_all`
    pub fn scan_by_prefix(&self, type_tag: &str) -> Scan<'_> {
        Scan {
            inner: self.store.find(
                Some(keys::state_type_prefix(type_tag).as_slice()),
                SeekDirection::Forward,
            ),
        }
    }
}

/// One scanned world-state entry
#[derive(Debug, Clone, PartialEq)]
pub struct ScanEntry {
    pub key: String,
    pub value: ScanValue,
}

impl ScanEntry {
    /// The decoded document, unless this entry is a raw passthrough
    pub fn document(&self) -> Option<&AssetRecord> {
        match &self.value {
            ScanValue::Document(record) => Some(record),
            ScanValue::Raw { .. } => None,
        }
    }
}

/// A scanned value: decoded, or raw with the parse failure attached
#[derive(Debug, Clone, PartialEq)]
pub enum ScanValue {
    Document(AssetRecord),
    Raw { bytes: Vec<u8>, error: String },
}

/// Lazy, self-releasing traversal of world state
pub struct Scan<'a> {
    inner: KvIter<'a>,
}

impl Iterator for Scan<'_> {
    type Item = Result<ScanEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner.next()? {
            Err(e) => Some(Err(storage_error(e))),
            Ok((raw_key, bytes)) => {
                let key = keys::asset_from_state(&raw_key);
                let value = match serde_json::from_slice::<AssetRecord>(&bytes) {
                    Ok(record) => ScanValue::Document(record),
                    Err(e) => ScanValue::Raw {
                        bytes,
                        error: e.to_string(),
                    },
                };
                Some(Ok(ScanEntry { key, value }))
            }
        }
    }
}
