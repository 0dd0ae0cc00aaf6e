//! Storage key-space layout.
//!
//! All engine data shares one `KvStore` under disjoint single-byte column
//! prefixes. History entry keys append the big-endian sequence number after
//! a NUL separator, so lexicographic store order equals ascending sequence
//! order; the submission-time index inverts the timestamp so a forward scan
//! yields newest first.

use chrono::{DateTime, Utc};
use tracelink_core::AssetKey;

/// World state: latest value per asset key
pub const COL_STATE: u8 = 0x01;
/// History entries, keyed (asset key, sequence)
pub const COL_HISTORY: u8 = 0x02;
/// Per-key last-assigned history sequence
pub const COL_HISTORY_SEQ: u8 = 0x03;
/// Transaction records, keyed by transaction id
pub const COL_TX: u8 = 0x04;
/// Newest-first submission-time index over transactions
pub const COL_TX_TIME: u8 = 0x05;
/// Per-operation filter index over transactions
pub const COL_TX_TYPE: u8 = 0x06;
/// Engine metadata (bootstrap marker)
pub const COL_META: u8 = 0x0f;

const SEPARATOR: u8 = 0x00;

pub fn state(key: &AssetKey) -> Vec<u8> {
    compose(COL_STATE, key.as_bytes())
}

pub fn state_prefix() -> Vec<u8> {
    vec![COL_STATE]
}

/// Storage prefix covering every state key under a type tag (`^tag_.*`)
pub fn state_type_prefix(tag: &str) -> Vec<u8> {
    let mut composed = compose(COL_STATE, tag.as_bytes());
    composed.push(b'_');
    composed
}

/// Recovers the asset key string from a world-state storage key
pub fn asset_from_state(raw: &[u8]) -> String {
    String::from_utf8_lossy(&raw[1..]).into_owned()
}

pub fn history_prefix(key: &AssetKey) -> Vec<u8> {
    let mut composed = compose(COL_HISTORY, key.as_bytes());
    composed.push(SEPARATOR);
    composed
}

pub fn history(key: &AssetKey, sequence: u64) -> Vec<u8> {
    let mut composed = history_prefix(key);
    composed.extend_from_slice(&sequence.to_be_bytes());
    composed
}

pub fn history_sequence(key: &AssetKey) -> Vec<u8> {
    compose(COL_HISTORY_SEQ, key.as_bytes())
}

pub fn transaction(transaction_id: &str) -> Vec<u8> {
    compose(COL_TX, transaction_id.as_bytes())
}

pub fn tx_time_prefix() -> Vec<u8> {
    vec![COL_TX_TIME]
}

pub fn tx_time_index(submitted_at: DateTime<Utc>, transaction_id: &str) -> Vec<u8> {
    let nanos = submitted_at.timestamp_nanos_opt().unwrap_or(0).max(0) as u64;
    let mut composed = vec![COL_TX_TIME];
    composed.extend_from_slice(&(u64::MAX - nanos).to_be_bytes());
    composed.extend_from_slice(transaction_id.as_bytes());
    composed
}

pub fn tx_type_prefix(operation: &str) -> Vec<u8> {
    let mut composed = compose(COL_TX_TYPE, operation.as_bytes());
    composed.push(SEPARATOR);
    composed
}

pub fn tx_type_index(operation: &str, transaction_id: &str) -> Vec<u8> {
    let mut composed = tx_type_prefix(operation);
    composed.extend_from_slice(transaction_id.as_bytes());
    composed
}

pub fn meta(name: &[u8]) -> Vec<u8> {
    compose(COL_META, name)
}

fn compose(column: u8, key: &[u8]) -> Vec<u8> {
    let mut composed = Vec::with_capacity(1 + key.len());
    composed.push(column);
    composed.extend_from_slice(key);
    composed
}
