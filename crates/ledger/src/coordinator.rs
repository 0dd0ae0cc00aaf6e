//! Submission coordination.
//!
//! `submit` is the only mutation entry point: it assigns a content-hash
//! transaction id, records the submission as pending, validates and plans
//! the mutation, performs the single bounded round trip to the commit
//! substrate, applies the put + append pair, and transitions the status
//! record to its terminal state. Every submission ends `confirmed` or
//! `failed` before the call returns, never stuck pending.
//!
//! The substrate round trip happens before the local mutation, so substrate
//! unavailability (including timeout) leaves world state untouched.

use crate::history::HistoryLog;
use crate::status::TransactionLog;
use crate::world_state::WorldState;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracelink_config::RECORD_KEY_SUFFIX_LEN;
use tracelink_core::{
    AssetKey, AssetPayload, AssetRecord, DemandForecast, InventoryAsset, LedgerError, Operation,
    QualityRecord, Result, SupplierEvent, TransactionRecord, TxError, TxStatus,
};
use tracelink_substrate::{CommitClient, CommitRequest};
use tracing::{error, info, warn};

/// Computes a collision-resistant transaction id.
///
/// SHA-256 over the operation name, each argument, and the submission time
/// at nanosecond granularity, so identical payloads under rapid retry still
/// get distinct ids.
pub fn transaction_id(operation: &str, arguments: &[String], submitted_at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(operation.as_bytes());
    hasher.update([0u8]);
    for argument in arguments {
        hasher.update(argument.as_bytes());
        hasher.update([0u8]);
    }
    let nanos = submitted_at.timestamp_nanos_opt().unwrap_or_default();
    hasher.update(nanos.to_be_bytes());
    hex::encode(hasher.finalize())
}

/// Structured result of one submission
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub transaction_id: String,
    pub success: bool,
    pub status: TxStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<TxError>,
}

impl SubmissionReceipt {
    fn confirmed(transaction_id: String, result: serde_json::Value) -> Self {
        Self {
            transaction_id,
            success: true,
            status: TxStatus::Confirmed,
            result: Some(result),
            error: None,
        }
    }

    fn failed(transaction_id: String, error: &LedgerError) -> Self {
        Self {
            transaction_id,
            success: false,
            status: TxStatus::Failed,
            result: None,
            error: Some(TxError {
                kind: error.kind(),
                message: error.to_string(),
            }),
        }
    }
}

/// Bridges submissions to durable, auditable records
pub struct Coordinator {
    world_state: WorldState,
    history: HistoryLog,
    transactions: TransactionLog,
    substrate: Arc<dyn CommitClient>,
    request_timeout: Duration,
}

impl Coordinator {
    pub fn new(
        world_state: WorldState,
        history: HistoryLog,
        transactions: TransactionLog,
        substrate: Arc<dyn CommitClient>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            world_state,
            history,
            transactions,
            substrate,
            request_timeout,
        }
    }

    /// Submits a named operation with string arguments.
    ///
    /// Never returns an error: every failure class is captured into the
    /// receipt and mirrored in the transaction log.
    pub async fn submit(&self, operation: &str, arguments: &[String]) -> SubmissionReceipt {
        let submitted_at = Utc::now();
        let transaction_id = transaction_id(operation, arguments, submitted_at);

        let record = TransactionRecord::pending(&transaction_id, operation, arguments, submitted_at);
        if let Err(e) = self.transactions.create(&record) {
            error!(%transaction_id, error = %e, "failed to record submission");
            return SubmissionReceipt::failed(transaction_id, &e);
        }

        match self
            .execute(&transaction_id, operation, arguments, submitted_at)
            .await
        {
            Ok(payload) => match self.transactions.mark_confirmed(&transaction_id, payload.clone()) {
                Ok(_) => {
                    info!(%transaction_id, operation, "submission confirmed");
                    SubmissionReceipt::confirmed(transaction_id, payload)
                }
                Err(e) => {
                    error!(%transaction_id, error = %e, "mutation applied but confirmation not recorded");
                    SubmissionReceipt::failed(transaction_id, &e)
                }
            },
            Err(e) => {
                warn!(%transaction_id, operation, kind = %e.kind(), error = %e, "submission failed");
                if let Err(log_err) =
                    self.transactions
                        .mark_failed(&transaction_id, e.kind(), &e.to_string())
                {
                    error!(%transaction_id, error = %log_err, "failed to record failure");
                }
                SubmissionReceipt::failed(transaction_id, &e)
            }
        }
    }

    async fn execute(
        &self,
        transaction_id: &str,
        operation: &str,
        arguments: &[String],
        submitted_at: DateTime<Utc>,
    ) -> Result<serde_json::Value> {
        let operation = Operation::parse(operation, arguments)?;
        let record = self.plan(&operation, transaction_id)?;

        let request = CommitRequest {
            transaction_id: transaction_id.to_string(),
            operation: operation.name().to_string(),
            arguments: arguments.to_vec(),
            submitted_at,
        };
        let ack = match tokio::time::timeout(self.request_timeout, self.substrate.submit(&request))
            .await
        {
            Err(_) => {
                return Err(LedgerError::SubstrateUnavailable(format!(
                    "commit timed out after {:?}",
                    self.request_timeout
                )))
            }
            Ok(Err(e)) => return Err(LedgerError::SubstrateUnavailable(e.to_string())),
            Ok(Ok(ack)) => ack,
        };

        self.world_state.put(&record)?;
        let entry = self
            .history
            .append(&record.key, transaction_id, Some(&record), false)?;

        Ok(serde_json::json!({
            "blockNumber": ack.block_number,
            "key": record.key.as_str(),
            "version": record.version,
            "sequence": entry.sequence,
            "docType": record.payload.doc_type(),
            "record": serde_json::to_value(&record)?,
        }))
    }

    /// Builds the post-mutation record for an operation, enforcing the
    /// existence guards
    fn plan(&self, operation: &Operation, transaction_id: &str) -> Result<AssetRecord> {
        match operation {
            Operation::CreateAsset {
                key,
                name,
                initial_stock,
                timestamp,
            } => {
                if self.world_state.exists(key) {
                    return Err(LedgerError::AlreadyExists(key.to_string()));
                }
                Ok(AssetRecord::new(
                    key.clone(),
                    AssetPayload::Inventory(InventoryAsset::new(name, *initial_stock, *timestamp)),
                ))
            }
            Operation::UpdateAsset {
                key,
                new_stock,
                reason,
                timestamp,
            } => {
                let current = self.world_state.get(key)?;
                match &current.payload {
                    AssetPayload::Inventory(item) => Ok(current.next_version(
                        AssetPayload::Inventory(item.with_stock(*new_stock, reason, *timestamp)),
                    )),
                    other => Err(LedgerError::Validation(format!(
                        "stock updates apply to inventory assets; {} is a {} record",
                        key,
                        other.doc_type()
                    ))),
                }
            }
            Operation::RecordForecast {
                product_id,
                forecast_data,
                accuracy,
                timestamp,
            } => {
                let key = derived_key("FORECAST", product_id, transaction_id)?;
                self.require_absent(&key)?;
                Ok(AssetRecord::new(
                    key,
                    AssetPayload::Forecast(DemandForecast {
                        product_id: product_id.clone(),
                        forecast_data: forecast_data.clone(),
                        accuracy: *accuracy,
                        recorded_at: *timestamp,
                    }),
                ))
            }
            Operation::RecordQuality {
                batch_id,
                sigma_level,
                defect_rate,
                timestamp,
            } => {
                let key = derived_key("QUALITY", batch_id, transaction_id)?;
                self.require_absent(&key)?;
                Ok(AssetRecord::new(
                    key,
                    AssetPayload::Quality(QualityRecord {
                        batch_id: batch_id.clone(),
                        sigma_level: *sigma_level,
                        defect_rate: *defect_rate,
                        recorded_at: *timestamp,
                    }),
                ))
            }
            Operation::RecordSupplierEvent {
                supplier_id,
                event_data,
                timestamp,
            } => {
                let key = derived_key("SUPPLIER", supplier_id, transaction_id)?;
                self.require_absent(&key)?;
                Ok(AssetRecord::new(
                    key,
                    AssetPayload::Supplier(SupplierEvent {
                        supplier_id: supplier_id.clone(),
                        event_data: event_data.clone(),
                        recorded_at: *timestamp,
                    }),
                ))
            }
        }
    }

    fn require_absent(&self, key: &AssetKey) -> Result<()> {
        if self.world_state.exists(key) {
            return Err(LedgerError::AlreadyExists(key.to_string()));
        }
        Ok(())
    }
}

/// Derives a record key from the entity id and the transaction id prefix,
/// replacing the wall-clock suffix scheme that risked collisions under
/// rapid submission
fn derived_key(tag: &str, entity_id: &str, transaction_id: &str) -> Result<AssetKey> {
    let suffix = &transaction_id[..RECORD_KEY_SUFFIX_LEN.min(transaction_id.len())];
    AssetKey::new(format!("{}_{}_{}", tag, entity_id, suffix))
}
