//! Durable transaction status log.
//!
//! Every submission is mirrored here for audit and retry, whatever became of
//! the underlying mutation. Primary records are keyed by transaction id;
//! a submission-time index (inverted nanoseconds, so a forward scan reads
//! newest first) and a per-operation index support the audit queries.
//!
//! Records move `pending → confirmed` or `pending → failed` exactly once.
//! Re-transitioning a terminal record is a programming error: it is logged
//! and rejected, never silently ignored.

use crate::{keys, storage_error};
use std::sync::Arc;
use tracelink_core::{ErrorKind, LedgerError, Result, TransactionRecord};
use tracelink_persistence::{BatchOperation, KvStore, SeekDirection};
use tracing::{debug, error};

/// Durable mirror of every submitted transaction
#[derive(Clone)]
pub struct TransactionLog {
    store: Arc<dyn KvStore>,
}

impl TransactionLog {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Writes the pending record and both index entries atomically.
    ///
    /// Transaction ids are content hashes; a duplicate means id computation
    /// is broken, so it is rejected rather than overwritten.
    pub fn create(&self, record: &TransactionRecord) -> Result<()> {
        let primary = keys::transaction(&record.transaction_id);
        if self.store.contains(&primary).map_err(storage_error)? {
            return Err(LedgerError::InvalidOperation(format!(
                "transaction {} already recorded",
                record.transaction_id
            )));
        }

        let bytes = serde_json::to_vec(record)?;
        self.store
            .write_batch(vec![
                BatchOperation::Put {
                    key: primary,
                    value: bytes,
                },
                BatchOperation::Put {
                    key: keys::tx_time_index(record.submitted_at, &record.transaction_id),
                    value: record.transaction_id.as_bytes().to_vec(),
                },
                BatchOperation::Put {
                    key: keys::tx_type_index(&record.operation, &record.transaction_id),
                    value: record.transaction_id.as_bytes().to_vec(),
                },
            ])
            .map_err(storage_error)?;

        debug!(
            transaction_id = %record.transaction_id,
            operation = %record.operation,
            "transaction recorded as pending"
        );
        Ok(())
    }

    /// Loads a record by transaction id
    pub fn get(&self, transaction_id: &str) -> Result<TransactionRecord> {
        let bytes = self
            .store
            .get(&keys::transaction(transaction_id))
            .map_err(storage_error)?
            .ok_or_else(|| LedgerError::NotFound(format!("transaction {}", transaction_id)))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            LedgerError::Serialization(format!(
                "stored transaction {} is corrupt: {}",
                transaction_id, e
            ))
        })
    }

    /// Transitions `pending → confirmed`, storing the result payload
    pub fn mark_confirmed(
        &self,
        transaction_id: &str,
        result: serde_json::Value,
    ) -> Result<TransactionRecord> {
        self.transition(transaction_id, |record| record.confirm(result.clone()))
    }

    /// Transitions `pending → failed`, preserving kind and message for audit
    pub fn mark_failed(
        &self,
        transaction_id: &str,
        kind: ErrorKind,
        message: &str,
    ) -> Result<TransactionRecord> {
        self.transition(transaction_id, |record| record.fail(kind, message))
    }

    fn transition(
        &self,
        transaction_id: &str,
        apply: impl Fn(&mut TransactionRecord) -> Result<()>,
    ) -> Result<TransactionRecord> {
        let mut record = self.get(transaction_id)?;
        if let Err(e) = apply(&mut record) {
            error!(transaction_id, error = %e, "illegal status transition attempted");
            return Err(e);
        }

        let bytes = serde_json::to_vec(&record)?;
        self.store
            .put(&keys::transaction(transaction_id), &bytes)
            .map_err(storage_error)?;
        debug!(transaction_id, status = %record.status, "transaction transitioned");
        Ok(record)
    }

    /// The most recent submissions, newest first, bounded by `limit`
    pub fn recent(&self, limit: usize) -> Result<Vec<TransactionRecord>> {
        self.load_index(keys::tx_time_prefix(), limit)
    }

    /// All submissions of one operation type
    pub fn by_type(&self, operation: &str) -> Result<Vec<TransactionRecord>> {
        self.load_index(keys::tx_type_prefix(operation), usize::MAX)
    }

    fn load_index(&self, prefix: Vec<u8>, limit: usize) -> Result<Vec<TransactionRecord>> {
        let mut records = Vec::new();
        for item in self.store.find(Some(prefix.as_slice()), SeekDirection::Forward) {
            if records.len() >= limit {
                break;
            }
            let (index_key, transaction_id) = item.map_err(storage_error)?;
            let transaction_id = String::from_utf8(transaction_id).map_err(|_| {
                LedgerError::Serialization(format!(
                    "index entry {} holds a non-utf8 transaction id",
                    hex::encode(&index_key)
                ))
            })?;
            records.push(self.get(&transaction_id)?);
        }
        Ok(records)
    }
}
