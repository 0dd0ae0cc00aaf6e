//! Per-key mutation history.
//!
//! Every mutation appends one immutable entry keyed (asset key, sequence).
//! Sequences start at 1 per key and never gap: the entry and the per-key
//! counter are written in one atomic batch. Replay yields entries lazily in
//! ascending sequence order and can be restarted at will; the cursor is
//! released when the replay iterator drops.

use crate::{keys, storage_error};
use chrono::Utc;
use std::sync::Arc;
use tracelink_core::{AssetKey, AssetRecord, HistoryEntry, LedgerError, Result};
use tracelink_persistence::{BatchOperation, KvIter, KvStore, SeekDirection};
use tracing::debug;

/// Append-only, per-key ordered log of every mutation
#[derive(Clone)]
pub struct HistoryLog {
    store: Arc<dyn KvStore>,
}

impl HistoryLog {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Appends the next entry for `key`, assigning its sequence number.
    ///
    /// `value` is the asset value after the mutation; it must be present
    /// unless the mutation is a delete. Only storage-level I/O can fail
    /// here, and such a failure is fatal to the enclosing transaction.
    pub fn append(
        &self,
        key: &AssetKey,
        transaction_id: &str,
        value: Option<&AssetRecord>,
        is_delete: bool,
    ) -> Result<HistoryEntry> {
        if !is_delete && value.is_none() {
            return Err(LedgerError::InvalidOperation(format!(
                "non-delete history entry for {} requires a value snapshot",
                key
            )));
        }

        let sequence = self.last_sequence(key)? + 1;
        let entry = HistoryEntry {
            key: key.clone(),
            sequence,
            transaction_id: transaction_id.to_string(),
            timestamp: Utc::now(),
            is_delete,
            value: if is_delete { None } else { value.cloned() },
        };

        let bytes = serde_json::to_vec(&entry)?;
        self.store
            .write_batch(vec![
                BatchOperation::Put {
                    key: keys::history(key, sequence),
                    value: bytes,
                },
                BatchOperation::Put {
                    key: keys::history_sequence(key),
                    value: sequence.to_be_bytes().to_vec(),
                },
            ])
            .map_err(storage_error)?;

        debug!(key = %key, sequence, transaction_id, "history entry appended");
        Ok(entry)
    }

    /// Last sequence assigned for `key`; 0 when the key was never mutated
    pub fn last_sequence(&self, key: &AssetKey) -> Result<u64> {
        match self.store.get(&keys::history_sequence(key)).map_err(storage_error)? {
            None => Ok(0),
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    LedgerError::Serialization(format!(
                        "history sequence for {} has {} bytes, expected 8",
                        key,
                        bytes.len()
                    ))
                })?;
                Ok(u64::from_be_bytes(raw))
            }
        }
    }

    /// Lazily replays all entries for `key` in ascending sequence order.
    ///
    /// Empty for keys never mutated; restartable by calling again.
    pub fn replay(&self, key: &AssetKey) -> HistoryReplay<'_> {
        HistoryReplay {
            inner: self
                .store
                .find(Some(keys::history_prefix(key).as_slice()), SeekDirection::Forward),
        }
    }
}

/// Lazy, ordered, self-releasing traversal of one key's history
pub struct HistoryReplay<'a> {
    inner: KvIter<'a>,
}

impl Iterator for HistoryReplay<'_> {
    type Item = Result<HistoryEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner.next()? {
            Err(e) => Some(Err(storage_error(e))),
            Ok((_, bytes)) => Some(
                serde_json::from_slice(&bytes)
                    .map_err(|e| LedgerError::Serialization(format!("corrupt history entry: {}", e))),
            ),
        }
    }
}
