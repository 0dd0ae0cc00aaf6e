//! Engine facade.
//!
//! Wires the five components to one store and one substrate client and
//! exposes the external surface: `submit` plus the read paths, which bypass
//! the coordinator entirely.

use crate::coordinator::{transaction_id, Coordinator, SubmissionReceipt};
use crate::history::{HistoryLog, HistoryReplay};
use crate::query::{QueryEngine, Scan};
use crate::status::TransactionLog;
use crate::world_state::WorldState;
use crate::{keys, storage_error};
use chrono::Utc;
use std::sync::Arc;
use tracelink_config::LedgerConfig;
use tracelink_core::{
    AssetKey, AssetPayload, AssetRecord, InventoryAsset, LedgerError, Result, TransactionRecord,
};
use tracelink_persistence::KvStore;
use tracelink_substrate::{CommitClient, HealthStatus};
use tracing::info;

const BOOTSTRAP_MARKER: &[u8] = b"bootstrap";

/// The assembled ledger engine
pub struct LedgerEngine {
    store: Arc<dyn KvStore>,
    world_state: WorldState,
    history: HistoryLog,
    query: QueryEngine,
    transactions: TransactionLog,
    coordinator: Coordinator,
    substrate: Arc<dyn CommitClient>,
}

impl LedgerEngine {
    /// Assembles an engine from an injected store and substrate client
    pub fn new(
        store: Arc<dyn KvStore>,
        substrate: Arc<dyn CommitClient>,
        config: &LedgerConfig,
    ) -> Self {
        let world_state = WorldState::new(Arc::clone(&store));
        let history = HistoryLog::new(Arc::clone(&store));
        let query = QueryEngine::new(Arc::clone(&store));
        let transactions = TransactionLog::new(Arc::clone(&store));
        let coordinator = Coordinator::new(
            world_state.clone(),
            history.clone(),
            transactions.clone(),
            Arc::clone(&substrate),
            config.request_timeout(),
        );

        Self {
            store,
            world_state,
            history,
            query,
            transactions,
            coordinator,
            substrate,
        }
    }

    /// Submits a named operation; see [`Coordinator::submit`]
    pub async fn submit(&self, operation: &str, arguments: &[String]) -> SubmissionReceipt {
        self.coordinator.submit(operation, arguments).await
    }

    /// Gets the live value for a key
    pub fn get_asset(&self, key: &str) -> Result<AssetRecord> {
        self.world_state.get(&AssetKey::new(key)?)
    }

    /// Checks if a key has a live value
    pub fn asset_exists(&self, key: &str) -> bool {
        match AssetKey::new(key) {
            Ok(key) => self.world_state.exists(&key),
            Err(_) => false,
        }
    }

    /// Lazily replays the full mutation history of a key
    pub fn get_history(&self, key: &str) -> Result<HistoryReplay<'_>> {
        Ok(self.history.replay(&AssetKey::new(key)?))
    }

    /// Scans every live (key, value) pair
    pub fn scan_all(&self) -> Scan<'_> {
        self.query.scan_all()
    }

    /// Scans live values under a type tag
    pub fn scan_by_prefix(&self, type_tag: &str) -> Scan<'_> {
        self.query.scan_by_prefix(type_tag)
    }

    /// Loads one transaction record for audit
    pub fn transaction(&self, transaction_id: &str) -> Result<TransactionRecord> {
        self.transactions.get(transaction_id)
    }

    /// The most recent submissions, newest first
    pub fn recent_transactions(&self, limit: usize) -> Result<Vec<TransactionRecord>> {
        self.transactions.recent(limit)
    }

    /// All submissions of one operation type
    pub fn transactions_by_type(&self, operation: &str) -> Result<Vec<TransactionRecord>> {
        self.transactions.by_type(operation)
    }

    /// Probes substrate health; background use only, never the request path
    pub async fn substrate_health(&self) -> HealthStatus {
        self.substrate.health().await
    }

    /// Seeds the demonstration inventory asset on first run.
    ///
    /// Idempotent: guarded by a marker key, and a no-op when the asset
    /// already exists. Returns whether seeding happened.
    pub async fn bootstrap(&self) -> Result<bool> {
        let marker = keys::meta(BOOTSTRAP_MARKER);
        if self.store.contains(&marker).map_err(storage_error)? {
            return Ok(false);
        }

        let key = AssetKey::new("ITEM001")?;
        if !self.world_state.exists(&key) {
            let timestamp = Utc::now();
            let seed_id = transaction_id("Bootstrap", &[], timestamp);

            let mut item = InventoryAsset::new("Raw Materials", 100, timestamp);
            item.max_stock = 200;
            item.min_stock = 20;
            item.location = "Warehouse A".to_string();

            let record = AssetRecord::new(key.clone(), AssetPayload::Inventory(item));
            self.world_state.put(&record)?;
            self.history.append(&key, &seed_id, Some(&record), false)?;
            info!(key = %key, "seeded demonstration inventory asset");
        }

        self.store.put(&marker, b"1").map_err(storage_error)?;
        Ok(true)
    }

    /// Releases the substrate client; the engine must not submit afterwards
    pub async fn close(&self) -> Result<()> {
        self.substrate
            .close()
            .await
            .map_err(|e| LedgerError::SubstrateUnavailable(e.to_string()))
    }

    pub fn world_state(&self) -> &WorldState {
        &self.world_state
    }

    pub fn history_log(&self) -> &HistoryLog {
        &self.history
    }

    pub fn transaction_log(&self) -> &TransactionLog {
        &self.transactions
    }
}
