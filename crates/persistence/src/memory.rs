//! In-memory storage backend.
//!
//! An ordered map under a `parking_lot` read-write lock, used by tests and
//! standalone runs. `find` snapshots the matching range under the read lock
//! and yields from the snapshot, so an in-flight scan never blocks writers;
//! each entry reflects the value present when the snapshot was taken.
//!
//! The store counts its live cursors, which is how the query-layer tests
//! assert that every scan path (completion, early break, error) releases
//! its cursor.

use crate::{
    prefix_upper_bound, BatchOperation, KvIter, KvStore, SeekDirection, StorageResult,
};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Ordered in-memory key-value store
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
    open_cursors: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Number of cursors handed out by [`KvStore::find`] and not yet dropped
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    fn snapshot_range(&self, prefix: Option<&[u8]>, direction: SeekDirection) -> Vec<(Vec<u8>, Vec<u8>)> {
        let data = self.data.read();
        let entries: Box<dyn Iterator<Item = (&Vec<u8>, &Vec<u8>)> + '_> = match prefix {
            None => Box::new(data.iter()),
            Some(prefix) => {
                let upper = match prefix_upper_bound(prefix) {
                    Some(bound) => Bound::Excluded(bound),
                    None => Bound::Unbounded,
                };
                Box::new(data.range((Bound::Included(prefix.to_vec()), upper)))
            }
        };
        let mut snapshot: Vec<(Vec<u8>, Vec<u8>)> =
            entries.map(|(k, v)| (k.clone(), v.clone())).collect();
        if direction == SeekDirection::Backward {
            snapshot.reverse();
        }
        snapshot
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.data.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StorageResult<()> {
        self.data.write().remove(key);
        Ok(())
    }

    fn contains(&self, key: &[u8]) -> StorageResult<bool> {
        Ok(self.data.read().contains_key(key))
    }

    fn find(&self, prefix: Option<&[u8]>, direction: SeekDirection) -> KvIter<'_> {
        let snapshot = self.snapshot_range(prefix, direction);
        let guard = CursorGuard::acquire(Arc::clone(&self.open_cursors));
        Box::new(MemoryCursor {
            entries: snapshot.into_iter(),
            _guard: guard,
        })
    }

    fn write_batch(&self, operations: Vec<BatchOperation>) -> StorageResult<()> {
        let mut data = self.data.write();
        for operation in operations {
            match operation {
                BatchOperation::Put { key, value } => {
                    data.insert(key, value);
                }
                BatchOperation::Delete { key } => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }
}

/// Decrements the store's live-cursor count when dropped
struct CursorGuard {
    counter: Arc<AtomicUsize>,
}

impl CursorGuard {
    fn acquire(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self { counter }
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

struct MemoryCursor {
    entries: std::vec::IntoIter<(Vec<u8>, Vec<u8>)>,
    _guard: CursorGuard,
}

impl Iterator for MemoryCursor {
    type Item = StorageResult<(Vec<u8>, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(Ok)
    }
}
