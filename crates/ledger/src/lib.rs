//! # TraceLink Ledger Engine
//!
//! The ledger state-management engine: tamper-evident, append-only
//! supply-chain records with per-key history and prefix queries.
//!
//! ## Components
//!
//! - **WorldState**: durable key → latest-value map
//! - **HistoryLog**: append-only, per-key ordered log of every mutation
//! - **QueryEngine**: full and prefix/type scans over world state
//! - **TransactionLog**: durable mirror of every submission
//!   (pending/confirmed/failed)
//! - **Coordinator**: the submission pipeline from id assignment through
//!   validation, commit round trip, mutation, and status transition
//! - **LedgerEngine**: facade wiring the components to one store and one
//!   substrate client
//!
//! Mutations flow through [`Coordinator::submit`]; reads go straight to the
//! stores. Per-key write ordering is delegated to the commit substrate: the
//! engine is a client of an already-serializing substrate, not the
//! serializer itself.

/// Submission coordination and transaction ids
pub mod coordinator;
/// Engine facade and bootstrap
pub mod engine;
/// Per-key mutation history
pub mod history;
/// Storage key-space layout
pub mod keys;
/// World-state scans
pub mod query;
/// Durable transaction status log
pub mod status;
/// Latest-value store
pub mod world_state;

pub use coordinator::{transaction_id, Coordinator, SubmissionReceipt};
pub use engine::LedgerEngine;
pub use history::{HistoryLog, HistoryReplay};
pub use query::{QueryEngine, Scan, ScanEntry, ScanValue};
pub use status::TransactionLog;
pub use world_state::WorldState;

pub use tracelink_core::{ErrorKind, LedgerError, Result};

use tracelink_persistence::StorageError;

/// Storage failures are fatal to the enclosing operation; they surface as
/// the engine-wide `Storage` error kind
pub(crate) fn storage_error(err: StorageError) -> LedgerError {
    LedgerError::Storage(err.to_string())
}
