//! The typed document model persisted in world state.
//!
//! Every live value is an [`AssetRecord`] envelope (key, version, payload)
//! around a tagged [`AssetPayload`] variant, one case per record type. The
//! persisted JSON keeps the camelCase field names of the original wire
//! documents so the store stays audit-readable.

use crate::key::AssetKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Versioned envelope around a typed payload.
///
/// `version` starts at 1 on creation and increases by exactly one on every
/// update to the same key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    pub key: AssetKey,
    pub version: u64,
    pub payload: AssetPayload,
}

impl AssetRecord {
    /// Creates a first-version record
    pub fn new(key: AssetKey, payload: AssetPayload) -> Self {
        Self {
            key,
            version: 1,
            payload,
        }
    }

    /// Builds the successor record carrying an updated payload
    pub fn next_version(&self, payload: AssetPayload) -> Self {
        Self {
            key: self.key.clone(),
            version: self.version + 1,
            payload,
        }
    }
}

/// Tagged document payload, one case per operation/record type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "docType", rename_all = "camelCase")]
pub enum AssetPayload {
    Inventory(InventoryAsset),
    Forecast(DemandForecast),
    Quality(QualityRecord),
    Supplier(SupplierEvent),
}

impl AssetPayload {
    /// Short tag used in logs and result payloads
    pub fn doc_type(&self) -> &'static str {
        match self {
            AssetPayload::Inventory(_) => "inventory",
            AssetPayload::Forecast(_) => "forecast",
            AssetPayload::Quality(_) => "quality",
            AssetPayload::Supplier(_) => "supplier",
        }
    }
}

/// An inventory item and its current stock position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryAsset {
    pub name: String,
    pub current_stock: i64,
    pub max_stock: i64,
    pub min_stock: i64,
    pub reorder_point: i64,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    /// The movement applied by the most recent stock update, if any
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub last_change: Option<StockMovement>,
}

impl InventoryAsset {
    /// Creates a freshly registered item; capacity fields start unset
    pub fn new(name: impl Into<String>, initial_stock: i64, timestamp: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            current_stock: initial_stock,
            max_stock: 0,
            min_stock: 0,
            reorder_point: 0,
            location: String::new(),
            created_at: timestamp,
            last_updated: timestamp,
            last_change: None,
        }
    }

    /// Applies a stock movement, recording old/new/delta and the reason
    pub fn with_stock(&self, new_stock: i64, reason: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        next.last_change = Some(StockMovement {
            old_stock: self.current_stock,
            new_stock,
            change: new_stock - self.current_stock,
            reason: reason.into(),
        });
        next.current_stock = new_stock;
        next.last_updated = timestamp;
        next
    }
}

/// One recorded stock movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub old_stock: i64,
    pub new_stock: i64,
    pub change: i64,
    pub reason: String,
}

/// A demand forecast snapshot for a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandForecast {
    pub product_id: String,
    pub forecast_data: serde_json::Value,
    pub accuracy: f64,
    pub recorded_at: DateTime<Utc>,
}

/// A quality measurement for a production batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityRecord {
    pub batch_id: String,
    pub sigma_level: f64,
    pub defect_rate: f64,
    pub recorded_at: DateTime<Utc>,
}

/// A supplier transaction event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierEvent {
    pub supplier_id: String,
    pub event_data: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}
