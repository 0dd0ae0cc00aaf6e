//! # TraceLink: Supply-Chain Ledger Engine in Rust
//!
//! A tamper-evident, append-only ledger for supply-chain records: inventory
//! changes, demand forecasts, quality metrics, and supplier transactions,
//! queryable by key, by type prefix, and by full change history.
//!
//! This facade re-exports the workspace crates:
//!
//! - [`core`]: asset keys, typed documents, transactions, errors
//! - [`config`]: node and engine configuration
//! - [`persistence`]: storage backends (RocksDB, in-memory)
//! - [`substrate`]: commit/ordering substrate clients
//! - [`ledger`]: the state-management engine itself
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tracelink_rs::config::LedgerConfig;
//! use tracelink_rs::ledger::LedgerEngine;
//! use tracelink_rs::persistence::{KvStore, MemoryStore};
//! use tracelink_rs::substrate::InProcessCommitClient;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
//! let engine = LedgerEngine::new(
//!     store,
//!     Arc::new(InProcessCommitClient::new()),
//!     &LedgerConfig::default(),
//! );
//!
//! let receipt = engine
//!     .submit(
//!         "CreateAsset",
//!         &[
//!             "ITEM001".to_string(),
//!             "Raw Materials".to_string(),
//!             "100".to_string(),
//!             "2024-01-01T00:00:00Z".to_string(),
//!         ],
//!     )
//!     .await;
//! assert!(receipt.success);
//! # }
//! ```

pub use tracelink_config as config;
pub use tracelink_core as core;
pub use tracelink_ledger as ledger;
pub use tracelink_persistence as persistence;
pub use tracelink_substrate as substrate;

/// Workspace version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
