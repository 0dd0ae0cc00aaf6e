//! RocksDB storage backend.
//!
//! Durable production storage. All engine data lives in the default column
//! family; prefix scans map onto RocksDB range seeks with an exclusive
//! upper bound derived from the prefix.

use crate::{
    prefix_upper_bound, BatchOperation, KvIter, KvStore, SeekDirection, StorageError,
    StorageResult,
};
use rocksdb::{DBCompressionType, Direction, IteratorMode, Options, WriteBatch, DB};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// RocksDB-backed key-value store
pub struct RocksDbStore {
    db: DB,
    path: PathBuf,
}

impl RocksDbStore {
    /// Opens (creating if missing) a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();

        let mut options = Options::default();
        options.create_if_missing(true);
        options.set_compression_type(DBCompressionType::Lz4);
        options.set_max_open_files(1024);
        options.set_write_buffer_size(64 * 1024 * 1024);
        options.set_level_compaction_dynamic_level_bytes(true);
        options.increase_parallelism(2);

        let db = DB::open(&options, &path).map_err(|e| StorageError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        info!(path = %path.display(), "opened rocksdb store");
        Ok(Self { db, path })
    }

    /// Filesystem location of this store
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forces pending writes to disk
    pub fn flush(&self) -> StorageResult<()> {
        self.db.flush().map_err(StorageError::from)
    }
}

impl KvStore for RocksDbStore {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        self.db.get(key).map_err(StorageError::from)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        debug!(key = %hex::encode(&key[..key.len().min(12)]), len = value.len(), "put");
        self.db.put(key, value).map_err(StorageError::from)
    }

    fn delete(&self, key: &[u8]) -> StorageResult<()> {
        self.db.delete(key).map_err(StorageError::from)
    }

    fn contains(&self, key: &[u8]) -> StorageResult<bool> {
        Ok(self.db.get_pinned(key).map_err(StorageError::from)?.is_some())
    }

    fn find(&self, prefix: Option<&[u8]>, direction: SeekDirection) -> KvIter<'_> {
        // A backward prefix scan seeks to the exclusive upper bound of the
        // prefix range; the one key that can sit at that position without
        // matching the prefix is skipped by the cursor below.
        let upper = prefix.and_then(prefix_upper_bound);
        let mode = match (prefix, direction) {
            (Some(prefix), SeekDirection::Forward) => IteratorMode::From(prefix, Direction::Forward),
            (Some(_), SeekDirection::Backward) => match upper.as_deref() {
                Some(bound) => IteratorMode::From(bound, Direction::Reverse),
                None => IteratorMode::End,
            },
            (None, SeekDirection::Forward) => IteratorMode::Start,
            (None, SeekDirection::Backward) => IteratorMode::End,
        };

        Box::new(PrefixCursor {
            inner: self.db.iterator(mode),
            prefix: prefix.map(|p| p.to_vec()),
            allow_one_skip: prefix.is_some() && direction == SeekDirection::Backward,
            done: false,
        })
    }

    fn write_batch(&self, operations: Vec<BatchOperation>) -> StorageResult<()> {
        let mut batch = WriteBatch::default();
        for operation in operations {
            match operation {
                BatchOperation::Put { key, value } => batch.put(key, value),
                BatchOperation::Delete { key } => batch.delete(key),
            }
        }
        self.db.write(batch).map_err(StorageError::from)
    }
}

/// Bounds a raw RocksDB iterator to a prefix range and stops after the
/// first backend error
struct PrefixCursor<I> {
    inner: I,
    prefix: Option<Vec<u8>>,
    allow_one_skip: bool,
    done: bool,
}

impl<I> Iterator for PrefixCursor<I>
where
    I: Iterator<Item = Result<(Box<[u8]>, Box<[u8]>), rocksdb::Error>>,
{
    type Item = StorageResult<(Vec<u8>, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match self.inner.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(StorageError::from(e)));
                }
                Some(Ok((key, value))) => {
                    if let Some(prefix) = &self.prefix {
                        if !key.starts_with(prefix) {
                            if self.allow_one_skip {
                                self.allow_one_skip = false;
                                continue;
                            }
                            self.done = true;
                            return None;
                        }
                    }
                    self.allow_one_skip = false;
                    return Some(Ok((key.into_vec(), value.into_vec())));
                }
            }
        }
    }
}
