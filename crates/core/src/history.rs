//! Per-key mutation history entries.

use crate::document::AssetRecord;
use crate::key::AssetKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One immutable record of a past mutation to a key.
///
/// `sequence` starts at 1 and increases by exactly one per mutation of the
/// same key. `value` is the asset value after the mutation, absent when the
/// mutation was a delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub key: AssetKey,
    pub sequence: u64,
    pub transaction_id: String,
    pub timestamp: DateTime<Utc>,
    pub is_delete: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub value: Option<AssetRecord>,
}

impl HistoryEntry {
    /// Snapshot of the live value, unless this entry records a delete
    pub fn snapshot(&self) -> Option<&AssetRecord> {
        if self.is_delete {
            None
        } else {
            self.value.as_ref()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{AssetPayload, InventoryAsset};

    #[test]
    fn test_delete_entry_has_no_snapshot() {
        let key = AssetKey::new("ITEM001").expect("valid key");
        let entry = HistoryEntry {
            key: key.clone(),
            sequence: 3,
            transaction_id: "abc123".into(),
            timestamp: Utc::now(),
            is_delete: true,
            value: None,
        };
        assert!(entry.snapshot().is_none());

        let live = HistoryEntry {
            key: key.clone(),
            sequence: 4,
            transaction_id: "def456".into(),
            timestamp: Utc::now(),
            is_delete: false,
            value: Some(AssetRecord::new(
                key,
                AssetPayload::Inventory(InventoryAsset::new("Raw Materials", 10, Utc::now())),
            )),
        };
        assert!(live.snapshot().is_some());
    }
}
