//! # TraceLink Core
//!
//! Core types for the TraceLink supply-chain ledger engine.
//!
//! This crate provides the fundamental types shared by every other crate in
//! the workspace: asset keys, the typed document model persisted in world
//! state, history entries, transaction records, the operation surface, and
//! the engine-wide error taxonomy.
//!
//! ## Components
//!
//! - **AssetKey**: validated `<TYPE>_<identifier>` keys with type tags
//! - **AssetRecord**: versioned envelope around the tagged document payload
//! - **HistoryEntry**: one immutable record of a past mutation to a key
//! - **TransactionRecord**: a submitted operation and its terminal outcome
//! - **Operation**: the named operation surface, parsed from string args
//! - **LedgerError**: the error taxonomy caught at the engine boundary

/// Tagged document payloads and the versioned record envelope
pub mod document;
/// Core error types and error handling
pub mod error;
/// Per-key mutation history entries
pub mod history;
/// Validated asset keys and type tags
pub mod key;
/// The named operation surface accepted by the coordinator
pub mod operation;
/// Transaction records and the status state machine
pub mod transaction;

pub use document::{
    AssetPayload, AssetRecord, DemandForecast, InventoryAsset, QualityRecord, StockMovement,
    SupplierEvent,
};
pub use error::{ErrorKind, LedgerError, Result};
pub use history::HistoryEntry;
pub use key::AssetKey;
pub use operation::Operation;
pub use transaction::{TransactionRecord, TxError, TxStatus};
