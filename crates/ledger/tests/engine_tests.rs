//! End-to-end engine tests: the submission pipeline against in-memory and
//! RocksDB stores, with acknowledging, refusing, and hanging substrate
//! clients.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracelink_config::LedgerConfig;
use tracelink_core::{AssetPayload, ErrorKind, TxStatus};
use tracelink_ledger::LedgerEngine;
use tracelink_persistence::{KvStore, MemoryStore, RocksDbStore};
use tracelink_substrate::{
    CommitAck, CommitClient, CommitRef, CommitRequest, HealthStatus, InProcessCommitClient,
    SubstrateError, SubstrateResult,
};

fn config(timeout_ms: u64) -> LedgerConfig {
    LedgerConfig {
        request_timeout_ms: timeout_ms,
        seed_demo_data: false,
    }
}

fn memory_engine() -> (Arc<MemoryStore>, LedgerEngine) {
    let store = Arc::new(MemoryStore::new());
    let engine = LedgerEngine::new(
        Arc::clone(&store) as Arc<dyn KvStore>,
        Arc::new(InProcessCommitClient::new()),
        &config(1_000),
    );
    (store, engine)
}

fn engine_on(store: Arc<dyn KvStore>, substrate: Arc<dyn CommitClient>, timeout_ms: u64) -> LedgerEngine {
    LedgerEngine::new(store, substrate, &config(timeout_ms))
}

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Substrate double whose transport always fails
struct RefusingCommitClient;

#[async_trait]
impl CommitClient for RefusingCommitClient {
    async fn submit(&self, _request: &CommitRequest) -> SubstrateResult<CommitAck> {
        Err(SubstrateError::Transport("connection refused".into()))
    }

    async fn health(&self) -> HealthStatus {
        HealthStatus::unhealthy("connection refused")
    }

    async fn commit_ref(&self, _block_number: u64) -> SubstrateResult<Option<CommitRef>> {
        Err(SubstrateError::Transport("connection refused".into()))
    }

    async fn close(&self) -> SubstrateResult<()> {
        Ok(())
    }
}

/// Substrate double that never answers within any reasonable bound
struct HangingCommitClient;

#[async_trait]
impl CommitClient for HangingCommitClient {
    async fn submit(&self, _request: &CommitRequest) -> SubstrateResult<CommitAck> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(SubstrateError::Transport("gave up".into()))
    }

    async fn health(&self) -> HealthStatus {
        HealthStatus::unhealthy("hanging")
    }

    async fn commit_ref(&self, _block_number: u64) -> SubstrateResult<Option<CommitRef>> {
        Ok(None)
    }

    async fn close(&self) -> SubstrateResult<()> {
        Ok(())
    }
}

fn current_stock(engine: &LedgerEngine, key: &str) -> i64 {
    match engine.get_asset(key).expect("asset present").payload {
        AssetPayload::Inventory(item) => item.current_stock,
        other => panic!("expected inventory payload, got {:?}", other),
    }
}

#[tokio::test]
async fn scenario_a_create_then_duplicate_create() {
    let (_, engine) = memory_engine();

    let receipt = engine
        .submit(
            "CreateAsset",
            &args(&["ITEM001", "Raw Materials", "100", "2024-01-01T00:00:00Z"]),
        )
        .await;
    assert!(receipt.success);
    assert_eq!(receipt.status, TxStatus::Confirmed);
    assert_eq!(current_stock(&engine, "ITEM001"), 100);

    // Same key again: must fail AlreadyExists and never overwrite
    let duplicate = engine
        .submit(
            "CreateAsset",
            &args(&["ITEM001", "Counterfeit", "999", "2024-01-05T00:00:00Z"]),
        )
        .await;
    assert!(!duplicate.success);
    assert_eq!(duplicate.error.as_ref().expect("error").kind, ErrorKind::AlreadyExists);
    assert_eq!(current_stock(&engine, "ITEM001"), 100);

    let record = engine.get_asset("ITEM001").expect("asset");
    assert_eq!(record.version, 1);
    match record.payload {
        AssetPayload::Inventory(item) => assert_eq!(item.name, "Raw Materials"),
        other => panic!("unexpected payload: {:?}", other),
    }
}

#[tokio::test]
async fn scenario_b_update_records_stock_movement_in_history() {
    let (_, engine) = memory_engine();
    engine
        .submit(
            "CreateAsset",
            &args(&["ITEM001", "Raw Materials", "100", "2024-01-01T00:00:00Z"]),
        )
        .await;
    let update = engine
        .submit(
            "UpdateAsset",
            &args(&["ITEM001", "150", "restock", "2024-01-02T00:00:00Z"]),
        )
        .await;
    assert!(update.success);

    let entries: Vec<_> = engine
        .get_history("ITEM001")
        .expect("replay")
        .map(|entry| entry.expect("entry"))
        .collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].sequence, 1);
    assert_eq!(entries[1].sequence, 2);
    assert_eq!(entries[1].transaction_id, update.transaction_id);

    let second = entries[1].snapshot().expect("snapshot");
    assert_eq!(second.version, 2);
    match &second.payload {
        AssetPayload::Inventory(item) => {
            let movement = item.last_change.as_ref().expect("movement");
            assert_eq!(movement.old_stock, 100);
            assert_eq!(movement.new_stock, 150);
            assert_eq!(movement.change, 50);
            assert_eq!(movement.reason, "restock");
        }
        other => panic!("unexpected payload: {:?}", other),
    }

    // Last non-delete snapshot equals the live value
    assert_eq!(second, &engine.get_asset("ITEM001").expect("asset"));
}

#[tokio::test]
async fn scenario_c_quality_record_confirms_with_payload() {
    let (_, engine) = memory_engine();
    let receipt = engine
        .submit(
            "RecordQuality",
            &args(&["BATCH1", "4.2", "0.015", "2024-03-01T12:00:00Z"]),
        )
        .await;
    assert!(receipt.success);
    assert_eq!(receipt.status, TxStatus::Confirmed);

    // The status record went pending → confirmed with a retrievable payload
    let record = engine.transaction(&receipt.transaction_id).expect("record");
    assert_eq!(record.status, TxStatus::Confirmed);
    assert_eq!(record.operation, "RecordQuality");
    let payload = record.result.expect("result payload");
    assert_eq!(payload["blockNumber"], 1);

    let key = payload["key"].as_str().expect("key");
    assert!(key.starts_with("QUALITY_BATCH1_"));
    let stored = engine.get_asset(key).expect("asset");
    match stored.payload {
        AssetPayload::Quality(quality) => {
            assert_eq!(quality.batch_id, "BATCH1");
            assert!((quality.sigma_level - 4.2).abs() < f64::EPSILON);
            assert!((quality.defect_rate - 0.015).abs() < f64::EPSILON);
        }
        other => panic!("unexpected payload: {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn scenario_d_substrate_timeout_leaves_state_unchanged() {
    let store = Arc::new(MemoryStore::new());
    let seeded = engine_on(
        Arc::clone(&store) as Arc<dyn KvStore>,
        Arc::new(InProcessCommitClient::new()),
        1_000,
    );
    seeded
        .submit(
            "CreateAsset",
            &args(&["ITEM001", "Raw Materials", "100", "2024-01-01T00:00:00Z"]),
        )
        .await;

    let hanging = engine_on(
        Arc::clone(&store) as Arc<dyn KvStore>,
        Arc::new(HangingCommitClient),
        50,
    );
    let receipt = hanging
        .submit(
            "UpdateAsset",
            &args(&["ITEM001", "150", "restock", "2024-01-02T00:00:00Z"]),
        )
        .await;

    assert!(!receipt.success);
    assert_eq!(receipt.status, TxStatus::Failed);
    let error = receipt.error.expect("error");
    assert_eq!(error.kind, ErrorKind::SubstrateUnavailable);
    assert!(error.message.contains("timed out"));

    // No partial mutation is visible anywhere
    assert_eq!(current_stock(&seeded, "ITEM001"), 100);
    assert_eq!(seeded.get_asset("ITEM001").expect("asset").version, 1);
    assert_eq!(seeded.get_history("ITEM001").expect("replay").count(), 1);

    // The failure itself is on the durable audit record
    let record = hanging.transaction(&receipt.transaction_id).expect("record");
    assert_eq!(record.status, TxStatus::Failed);
    assert_eq!(record.error.expect("error").kind, ErrorKind::SubstrateUnavailable);
}

#[tokio::test]
async fn substrate_refusal_is_retryable_with_fresh_id() {
    let store = Arc::new(MemoryStore::new());
    let refused = engine_on(
        Arc::clone(&store) as Arc<dyn KvStore>,
        Arc::new(RefusingCommitClient),
        1_000,
    );

    let create = args(&["ITEM001", "Raw Materials", "100", "2024-01-01T00:00:00Z"]);
    let first = refused.submit("CreateAsset", &create).await;
    let second = refused.submit("CreateAsset", &create).await;
    assert!(!first.success);
    assert!(!second.success);
    assert_eq!(first.error.expect("error").kind, ErrorKind::SubstrateUnavailable);
    // A retry is a fresh submission with a fresh id, never a resurrection
    assert_ne!(first.transaction_id, second.transaction_id);

    let recovered = engine_on(
        Arc::clone(&store) as Arc<dyn KvStore>,
        Arc::new(InProcessCommitClient::new()),
        1_000,
    );
    let third = recovered.submit("CreateAsset", &create).await;
    assert!(third.success);
    assert_eq!(current_stock(&recovered, "ITEM001"), 100);

    // All three attempts stay on the audit record
    let attempts = recovered.transactions_by_type("CreateAsset").expect("by_type");
    assert_eq!(attempts.len(), 3);
}

#[tokio::test]
async fn never_written_keys_read_as_absent() {
    let (_, engine) = memory_engine();
    assert!(!engine.asset_exists("GHOST001"));
    let err = engine.get_asset("GHOST001").expect_err("absent");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(engine.get_history("GHOST001").expect("replay").count(), 0);
}

#[tokio::test]
async fn validation_failures_are_recorded_not_applied() {
    let (_, engine) = memory_engine();

    let receipt = engine
        .submit(
            "CreateAsset",
            &args(&["ITEM001", "Raw Materials", "not-a-number", "2024-01-01T00:00:00Z"]),
        )
        .await;
    assert!(!receipt.success);
    assert_eq!(receipt.error.expect("error").kind, ErrorKind::Validation);

    let record = engine.transaction(&receipt.transaction_id).expect("record");
    assert_eq!(record.status, TxStatus::Failed);
    assert_eq!(record.error.expect("error").kind, ErrorKind::Validation);
    assert_eq!(engine.scan_all().count(), 0);

    let unknown = engine.submit("MintTokens", &args(&["1000"])).await;
    assert!(!unknown.success);
    assert_eq!(unknown.error.expect("error").kind, ErrorKind::Validation);
}

#[tokio::test]
async fn update_of_missing_asset_is_not_found() {
    let (_, engine) = memory_engine();
    let receipt = engine
        .submit(
            "UpdateAsset",
            &args(&["ITEM404", "10", "adjustment", "2024-01-01T00:00:00Z"]),
        )
        .await;
    assert!(!receipt.success);
    assert_eq!(receipt.error.expect("error").kind, ErrorKind::NotFound);
    assert!(!engine.asset_exists("ITEM404"));
}

#[tokio::test]
async fn no_submission_is_observable_as_pending() {
    let store = Arc::new(MemoryStore::new());
    let good = engine_on(
        Arc::clone(&store) as Arc<dyn KvStore>,
        Arc::new(InProcessCommitClient::new()),
        1_000,
    );
    let bad = engine_on(
        Arc::clone(&store) as Arc<dyn KvStore>,
        Arc::new(RefusingCommitClient),
        1_000,
    );

    good.submit(
        "CreateAsset",
        &args(&["ITEM001", "Raw Materials", "100", "2024-01-01T00:00:00Z"]),
    )
    .await;
    bad.submit(
        "UpdateAsset",
        &args(&["ITEM001", "150", "restock", "2024-01-02T00:00:00Z"]),
    )
    .await;
    good.submit("RecordQuality", &args(&["BATCH1", "4.2", "0.015", "2024-01-03T00:00:00Z"]))
        .await;
    good.submit("CreateAsset", &args(&["ITEM001", "Duplicate", "1", "2024-01-04T00:00:00Z"]))
        .await;

    let recent = good.recent_transactions(50).expect("recent");
    assert_eq!(recent.len(), 4);
    assert!(recent.iter().all(|record| record.status != TxStatus::Pending));
}

#[tokio::test]
async fn prefix_scan_equals_filtered_full_scan() {
    let (_, engine) = memory_engine();
    engine
        .submit("RecordQuality", &args(&["BATCH1", "4.2", "0.015", "2024-03-01T00:00:00Z"]))
        .await;
    engine
        .submit("RecordQuality", &args(&["BATCH2", "3.8", "0.031", "2024-03-02T00:00:00Z"]))
        .await;
    engine
        .submit(
            "RecordForecast",
            &args(&["P42", r#"{"nextMonth": 320}"#, "0.93", "2024-03-03T00:00:00Z"]),
        )
        .await;
    engine
        .submit(
            "CreateAsset",
            &args(&["QUALTIYPO_NOT_QUALITY", "Decoy", "5", "2024-03-04T00:00:00Z"]),
        )
        .await;

    let mut by_prefix: Vec<String> = engine
        .scan_by_prefix("QUALITY")
        .map(|entry| entry.expect("entry").key)
        .collect();
    let mut filtered: Vec<String> = engine
        .scan_all()
        .map(|entry| entry.expect("entry").key)
        .filter(|key| key.starts_with("QUALITY_"))
        .collect();
    by_prefix.sort();
    filtered.sort();
    assert_eq!(by_prefix, filtered);
    assert_eq!(by_prefix.len(), 2);
    assert_eq!(engine.scan_all().count(), 4);
}

#[tokio::test]
async fn recent_is_newest_first_and_by_type_filters() {
    let (_, engine) = memory_engine();
    engine
        .submit("CreateAsset", &args(&["ITEM001", "Raw Materials", "100", "2024-01-01T00:00:00Z"]))
        .await;
    engine
        .submit("UpdateAsset", &args(&["ITEM001", "90", "shipment", "2024-01-02T00:00:00Z"]))
        .await;
    let last = engine
        .submit("RecordSupplierEvent", &args(&["SUP9", r#"{"po":"PO-100"}"#, "2024-01-03T00:00:00Z"]))
        .await;

    let recent = engine.recent_transactions(2).expect("recent");
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].transaction_id, last.transaction_id);
    assert!(recent[0].submitted_at >= recent[1].submitted_at);

    let updates = engine.transactions_by_type("UpdateAsset").expect("by_type");
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].operation, "UpdateAsset");
}

#[tokio::test]
async fn bootstrap_seeds_once() {
    let (_, engine) = memory_engine();
    assert!(engine.bootstrap().await.expect("bootstrap"));
    assert!(!engine.bootstrap().await.expect("bootstrap again"));

    assert_eq!(current_stock(&engine, "ITEM001"), 100);
    assert_eq!(engine.get_history("ITEM001").expect("replay").count(), 1);

    // Seeded asset behaves like any other: duplicate create still fails
    let receipt = engine
        .submit("CreateAsset", &args(&["ITEM001", "Raw Materials", "100", "2024-01-01T00:00:00Z"]))
        .await;
    assert_eq!(receipt.error.expect("error").kind, ErrorKind::AlreadyExists);
}

#[tokio::test]
async fn rocksdb_engine_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    {
        let store: Arc<dyn KvStore> = Arc::new(RocksDbStore::open(dir.path()).expect("open"));
        let engine = engine_on(store, Arc::new(InProcessCommitClient::new()), 1_000);
        engine
            .submit("CreateAsset", &args(&["ITEM001", "Raw Materials", "100", "2024-01-01T00:00:00Z"]))
            .await;
        engine
            .submit("UpdateAsset", &args(&["ITEM001", "150", "restock", "2024-01-02T00:00:00Z"]))
            .await;
        engine.close().await.expect("close");
    }

    let store: Arc<dyn KvStore> = Arc::new(RocksDbStore::open(dir.path()).expect("reopen"));
    let engine = engine_on(store, Arc::new(InProcessCommitClient::new()), 1_000);
    assert_eq!(current_stock(&engine, "ITEM001"), 150);

    let entries: Vec<_> = engine
        .get_history("ITEM001")
        .expect("replay")
        .map(|entry| entry.expect("entry"))
        .collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].snapshot().expect("snapshot").version, 2);

    let recent = engine.recent_transactions(10).expect("recent");
    assert_eq!(recent.len(), 2);
}
