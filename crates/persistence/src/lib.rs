//! # TraceLink Persistence Layer
//!
//! Byte-level storage abstraction for the TraceLink ledger engine.
//!
//! The engine stores all of its data (world state, history entries,
//! sequence counters, and transaction records) in one key space behind the
//! [`KvStore`] trait. Two backends are provided:
//!
//! - **RocksDB** (default): durable production storage
//! - **In-memory**: ordered-map storage for tests and standalone runs
//!
//! Iteration is prefix-seek based: [`KvStore::find`] yields key/value pairs
//! in key order (forward or backward) and stops at the end of the prefix
//! range. Returned iterators own their cursor and release it when dropped,
//! whichever way iteration ends.

/// In-memory storage backend
pub mod memory;
/// RocksDB storage backend
pub mod rocksdb_store;

pub use memory::MemoryStore;
pub use rocksdb_store::RocksDbStore;

use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Storage-specific error types
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend-level failure (I/O, corruption, lock poisoning)
    #[error("storage backend error: {0}")]
    Backend(String),

    /// Database could not be opened
    #[error("failed to open store at {path}: {reason}")]
    Open { path: String, reason: String },
}

impl From<rocksdb::Error> for StorageError {
    fn from(err: rocksdb::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

/// Direction of a [`KvStore::find`] scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekDirection {
    Forward,
    Backward,
}

/// One operation inside an atomic write batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

/// A lazily-yielding, self-releasing cursor over a key range
pub type KvIter<'a> = Box<dyn Iterator<Item = StorageResult<(Vec<u8>, Vec<u8>)>> + 'a>;

/// Key-value storage interface shared by all backends.
///
/// Implementations are safe for concurrent use; per-key write ordering is
/// the caller's concern (the engine relies on the commit substrate to
/// serialize same-key mutations before they reach storage).
pub trait KvStore: Send + Sync {
    /// Gets a value by key
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Stores a key-value pair, overwriting any existing value
    fn put(&self, key: &[u8], value: &[u8]) -> StorageResult<()>;

    /// Deletes a key; absent keys are not an error
    fn delete(&self, key: &[u8]) -> StorageResult<()>;

    /// Checks if a key exists
    fn contains(&self, key: &[u8]) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Scans keys under `prefix` (all keys when `None`) in key order.
    ///
    /// The cursor is released when the returned iterator is dropped,
    /// whether iteration completed, broke early, or hit an error item.
    fn find(&self, prefix: Option<&[u8]>, direction: SeekDirection) -> KvIter<'_>;

    /// Applies all operations atomically: either every put/delete in the
    /// batch becomes visible or none does
    fn write_batch(&self, operations: Vec<BatchOperation>) -> StorageResult<()>;
}

/// Smallest byte string strictly greater than every key with this prefix,
/// or `None` when the prefix is all `0xff`
pub(crate) fn prefix_upper_bound(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut bound = prefix.to_vec();
    while let Some(last) = bound.last_mut() {
        if *last < u8::MAX {
            *last += 1;
            return Some(bound);
        }
        bound.pop();
    }
    None
}
